use serde::{Deserialize, Serialize};

/// Opaque ID types
pub type RoomCode = String;
/// Ephemeral connection identifier; a reconnect yields a new one
pub type PlayerId = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    #[default]
    Waiting,
    Playing,
    Finished,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Imposters,
    Crewmates,
}

/// Whether the minority item may coincide with the majority item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemPolicy {
    /// Both items drawn independently; they can be equal by chance
    #[default]
    Independent,
    /// Minority item drawn from the pool minus the majority item
    Distinct,
}

/// Secret attributes handed out at `start`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretRole {
    pub category: String,
    pub item: String,
    pub is_imposter: bool,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub is_host: bool,
    pub secret: Option<SecretRole>,
}

/// Per-process room limits
#[derive(Debug, Clone)]
pub struct RoomRules {
    pub min_players: usize,
    pub max_players: usize,
    pub item_policy: ItemPolicy,
}

impl Default for RoomRules {
    fn default() -> Self {
        Self {
            min_players: 3,
            max_players: 8,
            item_policy: ItemPolicy::Independent,
        }
    }
}

/// What gets revealed to everyone once a game is decided
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reveal {
    pub category: String,
    pub majority_item: String,
    pub minority_item: String,
    pub imposter_ids: Vec<PlayerId>,
}

/// Result of a completed tally
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Outcome {
    pub round: u32,
    pub eliminated: Vec<PlayerId>,
    /// None while the game continues into another round
    pub winner: Option<Winner>,
    pub message: String,
    /// Only present when `winner` is set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reveal: Option<Reveal>,
}
