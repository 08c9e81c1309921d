//! Ballot counting and win evaluation.
//!
//! Pure functions over the roster, the standing ballots and the imposter set;
//! the room decides when to call them.

use std::collections::HashMap;

use crate::types::{PlayerId, Winner};

/// What a completed tally decided
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Every target tied at the maximum count, in roster order
    pub eliminated: Vec<PlayerId>,
    /// None means the game continues with another round
    pub winner: Option<Winner>,
}

/// Count ballots per target
pub fn count_ballots(votes: &HashMap<PlayerId, PlayerId>) -> HashMap<PlayerId, u32> {
    let mut counts: HashMap<PlayerId, u32> = HashMap::new();
    for target in votes.values() {
        *counts.entry(target.clone()).or_insert(0) += 1;
    }
    counts
}

/// Targets tied at the highest count, ordered as they appear in `electorate`
pub fn eliminated_targets(
    electorate: &[PlayerId],
    votes: &HashMap<PlayerId, PlayerId>,
) -> Vec<PlayerId> {
    let counts = count_ballots(votes);
    let Some(max) = counts.values().copied().max() else {
        return Vec::new();
    };

    electorate
        .iter()
        .filter(|id| counts.get(*id) == Some(&max))
        .cloned()
        .collect()
}

/// True once every member of the electorate holds a ballot
pub fn is_complete(electorate: &[PlayerId], votes: &HashMap<PlayerId, PlayerId>) -> bool {
    electorate.iter().all(|id| votes.contains_key(id))
}

/// Resolve a completed tally.
///
/// `electorate` is the surviving roster (players not eliminated in an earlier
/// round). Imposters who left the room count as gone, so once no imposter
/// survives the tally the crewmates win outright. Otherwise, with a single
/// assigned imposter the game always ends with the imposter escaping. With
/// several imposters:
/// - an eliminated imposter ends the game in the imposters' favour while one
///   of them survives;
/// - otherwise imposters win once they match or outnumber the surviving
///   crewmates, and the game continues if they don't.
pub fn resolve(
    electorate: &[PlayerId],
    votes: &HashMap<PlayerId, PlayerId>,
    imposter_ids: &[PlayerId],
) -> Resolution {
    let eliminated = eliminated_targets(electorate, votes);
    let is_imposter = |id: &PlayerId| imposter_ids.contains(id);
    let imposter_hit = eliminated.iter().any(is_imposter);

    let survivors: Vec<&PlayerId> = electorate
        .iter()
        .filter(|id| !eliminated.contains(id))
        .collect();
    let remaining_imposters = survivors.iter().filter(|id| is_imposter(id)).count();
    let remaining_crewmates = survivors.len() - remaining_imposters;

    let winner = if remaining_imposters == 0 {
        Some(Winner::Crewmates)
    } else if imposter_ids.len() <= 1 || imposter_hit {
        Some(Winner::Imposters)
    } else if remaining_imposters >= remaining_crewmates {
        Some(Winner::Imposters)
    } else {
        None
    };

    Resolution { eliminated, winner }
}
