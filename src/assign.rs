//! Secret-role assignment.
//!
//! Picks a category, a majority and a minority item, and which roster
//! positions are imposters. All draws go through the supplied `Rng` so a
//! seeded generator makes a round reproducible.

use rand::seq::index;
use rand::Rng;

use crate::catalog::Catalog;
use crate::error::{GameError, GameResult};
use crate::types::{ItemPolicy, PlayerId, Reveal, SecretRole};

/// Server-held truth for one round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub category: String,
    pub majority_item: String,
    pub minority_item: String,
    /// In roster order
    pub imposter_ids: Vec<PlayerId>,
}

impl Assignment {
    pub fn is_imposter(&self, player_id: &str) -> bool {
        self.imposter_ids.iter().any(|id| id == player_id)
    }

    pub fn role_for(&self, player_id: &str) -> SecretRole {
        let is_imposter = self.is_imposter(player_id);
        SecretRole {
            category: self.category.clone(),
            item: if is_imposter {
                self.minority_item.clone()
            } else {
                self.majority_item.clone()
            },
            is_imposter,
        }
    }

    pub fn reveal(&self) -> Reveal {
        Reveal {
            category: self.category.clone(),
            majority_item: self.majority_item.clone(),
            minority_item: self.minority_item.clone(),
            imposter_ids: self.imposter_ids.clone(),
        }
    }
}

/// Clamp a requested imposter count into `[1, roster_len]`
pub fn clamp_imposter_count(requested: usize, roster_len: usize) -> usize {
    requested.clamp(1, roster_len.max(1))
}

/// Draw a fresh assignment for `roster`.
///
/// Every call is independent of any previous one; callers overwrite the old
/// assignment wholesale.
pub fn assign<R: Rng + ?Sized>(
    catalog: &Catalog,
    roster: &[PlayerId],
    imposter_count: usize,
    policy: ItemPolicy,
    rng: &mut R,
) -> GameResult<Assignment> {
    if roster.is_empty() {
        return Err(GameError::invalid("cannot assign roles to an empty roster"));
    }
    if catalog.is_empty() {
        return Err(GameError::invalid("catalog has no categories"));
    }

    let category = &catalog.categories()[rng.random_range(0..catalog.len())];
    let pool = &category.items;
    if pool.is_empty() {
        return Err(GameError::invalid(format!(
            "category '{}' has no items",
            category.name
        )));
    }

    let majority_idx = rng.random_range(0..pool.len());
    let minority_idx = match policy {
        ItemPolicy::Independent => rng.random_range(0..pool.len()),
        // Draw from the pool with the majority slot removed
        ItemPolicy::Distinct if pool.len() > 1 => {
            let pick = rng.random_range(0..pool.len() - 1);
            if pick >= majority_idx {
                pick + 1
            } else {
                pick
            }
        }
        ItemPolicy::Distinct => majority_idx,
    };

    let count = clamp_imposter_count(imposter_count, roster.len());
    let mut positions = index::sample(rng, roster.len(), count).into_vec();
    positions.sort_unstable();

    Ok(Assignment {
        category: category.name.clone(),
        majority_item: pool[majority_idx].clone(),
        minority_item: pool[minority_idx].clone(),
        imposter_ids: positions.into_iter().map(|i| roster[i].clone()).collect(),
    })
}
