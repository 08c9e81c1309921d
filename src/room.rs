//! Per-room lifecycle: `waiting -> playing -> finished`, with "play again"
//! re-entering `playing` from `finished`.
//!
//! `Room` is plain data plus synchronous transitions. Locking and fan-out live
//! in `state` and `broadcast`; everything here runs to completion on a single
//! `&mut Room`.

use rand::Rng;
use std::collections::HashMap;

use crate::assign::{self, Assignment};
use crate::catalog::Catalog;
use crate::error::{GameError, GameResult};
use crate::tally;
use crate::types::*;

const DEFAULT_HOST_NAME: &str = "Host";
const MAX_NAME_CHARS: usize = 24;

#[derive(Debug, Clone)]
pub struct Room {
    pub code: RoomCode,
    /// Join order; the host is whoever sits first
    pub players: Vec<Player>,
    pub status: RoomStatus,
    pub round: u32,
    pub imposter_count: usize,
    pub assignment: Option<Assignment>,
    /// voter -> target
    pub votes: HashMap<PlayerId, PlayerId>,
    /// Players voted out in earlier rounds of the current game
    pub eliminated: Vec<PlayerId>,
    pub outcome: Option<Outcome>,
}

/// What happened when a player left
#[derive(Debug, Clone)]
pub struct Departure {
    pub player: Player,
    pub new_host: Option<PlayerId>,
    /// Set when the departure completed a pending tally
    pub outcome: Option<Outcome>,
}

/// Trim and bound a display name
pub fn normalize_name(name: &str) -> GameResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(GameError::invalid("player name must not be empty"));
    }
    Ok(trimmed.chars().take(MAX_NAME_CHARS).collect())
}

impl Room {
    pub fn new(code: RoomCode, host_id: PlayerId, host_name: Option<&str>) -> Self {
        let name = host_name
            .and_then(|n| normalize_name(n).ok())
            .unwrap_or_else(|| DEFAULT_HOST_NAME.to_string());

        Self {
            code,
            players: vec![Player {
                id: host_id,
                name,
                is_host: true,
                secret: None,
            }],
            status: RoomStatus::Waiting,
            round: 0,
            imposter_count: 1,
            assignment: None,
            votes: HashMap::new(),
            eliminated: Vec::new(),
            outcome: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn contains(&self, player_id: &str) -> bool {
        self.players.iter().any(|p| p.id == player_id)
    }

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn host_id(&self) -> Option<&PlayerId> {
        self.players.iter().find(|p| p.is_host).map(|p| &p.id)
    }

    /// Roster members still in the running this game, in join order
    pub fn electorate(&self) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|p| !self.eliminated.contains(&p.id))
            .map(|p| p.id.clone())
            .collect()
    }

    pub fn join(&mut self, player_id: PlayerId, name: &str, rules: &RoomRules) -> GameResult<()> {
        if self.status != RoomStatus::Waiting {
            return Err(GameError::GameInProgress);
        }
        if self.players.len() >= rules.max_players {
            return Err(GameError::RoomFull);
        }
        if self.contains(&player_id) {
            return Err(GameError::invalid("already in this room"));
        }
        let name = normalize_name(name)?;

        self.players.push(Player {
            id: player_id,
            name,
            is_host: false,
            secret: None,
        });
        Ok(())
    }

    /// Start (or restart) a game. Overwrites every trace of the previous one.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        requester: &str,
        imposter_count: Option<usize>,
        catalog: &Catalog,
        rules: &RoomRules,
        rng: &mut R,
    ) -> GameResult<()> {
        if self.status == RoomStatus::Playing {
            return Err(GameError::GameInProgress);
        }
        if self.host_id().map(String::as_str) != Some(requester) {
            return Err(GameError::NotHost);
        }
        if self.players.len() < rules.min_players {
            return Err(GameError::InsufficientPlayers {
                min: rules.min_players,
                have: self.players.len(),
            });
        }

        let roster: Vec<PlayerId> = self.players.iter().map(|p| p.id.clone()).collect();
        let count = assign::clamp_imposter_count(imposter_count.unwrap_or(1), roster.len());
        let assignment = assign::assign(catalog, &roster, count, rules.item_policy, rng)?;

        for player in &mut self.players {
            player.secret = Some(assignment.role_for(&player.id));
        }
        self.imposter_count = assignment.imposter_ids.len();
        self.assignment = Some(assignment);
        self.votes.clear();
        self.eliminated.clear();
        self.outcome = None;
        self.round = 1;
        self.status = RoomStatus::Playing;
        Ok(())
    }

    /// Record or overwrite a ballot. Returns the outcome if this ballot
    /// completed the tally.
    pub fn cast_vote(&mut self, voter: &str, target: &str) -> GameResult<Option<Outcome>> {
        if self.status != RoomStatus::Playing {
            return Err(GameError::GameNotInProgress);
        }
        let electorate = self.electorate();
        if !electorate.iter().any(|id| id == voter) {
            return Err(GameError::invalid("you cannot vote in this round"));
        }
        if !electorate.iter().any(|id| id == target) {
            return Err(GameError::invalid("vote target is not an active player"));
        }

        self.votes.insert(voter.to_string(), target.to_string());
        Ok(self.resolve_if_complete())
    }

    /// Run the tally once every surviving player holds a ballot
    pub fn resolve_if_complete(&mut self) -> Option<Outcome> {
        if self.status != RoomStatus::Playing {
            return None;
        }
        let electorate = self.electorate();
        if !tally::is_complete(&electorate, &self.votes) {
            return None;
        }
        let assignment = self.assignment.as_ref()?;

        let resolution = tally::resolve(&electorate, &self.votes, &assignment.imposter_ids);
        let outcome = Outcome {
            round: self.round,
            message: summary(&resolution, &assignment.imposter_ids),
            reveal: resolution.winner.map(|_| assignment.reveal()),
            eliminated: resolution.eliminated,
            winner: resolution.winner,
        };

        if outcome.winner.is_some() {
            self.status = RoomStatus::Finished;
        } else {
            self.eliminated.extend(outcome.eliminated.iter().cloned());
            self.votes.clear();
            self.round += 1;
        }
        self.outcome = Some(outcome.clone());
        Some(outcome)
    }

    /// Remove a player. Hands host to the earliest remaining joiner and
    /// re-checks a pending tally against the smaller electorate.
    pub fn remove_player(&mut self, player_id: &str) -> Option<Departure> {
        let idx = self.players.iter().position(|p| p.id == player_id)?;
        let player = self.players.remove(idx);

        self.votes.remove(player_id);
        self.votes.retain(|_, target| target.as_str() != player_id);

        let mut new_host = None;
        if player.is_host {
            if let Some(successor) = self.players.first_mut() {
                successor.is_host = true;
                new_host = Some(successor.id.clone());
            }
        }

        let outcome = if self.is_empty() {
            None
        } else {
            self.resolve_if_complete()
        };

        Some(Departure {
            player,
            new_host,
            outcome,
        })
    }
}

fn summary(resolution: &tally::Resolution, imposter_ids: &[PlayerId]) -> String {
    let caught = resolution
        .eliminated
        .iter()
        .any(|id| imposter_ids.contains(id));
    match (resolution.winner, imposter_ids.len()) {
        (Some(Winner::Crewmates), _) if !caught => {
            "The imposters left the game. The crewmates win!".to_string()
        }
        (Some(Winner::Crewmates), 1) => {
            "The players successfully identified and eliminated the imposter!".to_string()
        }
        (Some(Winner::Imposters), 1) => "The players failed to identify the imposter!".to_string(),
        (Some(Winner::Crewmates), _) => {
            "The crewmates successfully identified and eliminated the imposters!".to_string()
        }
        (Some(Winner::Imposters), _) => {
            "The imposters successfully blended in and survived!".to_string()
        }
        (None, _) => "No imposter was caught. The game goes on!".to_string(),
    }
}
