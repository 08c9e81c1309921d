use crate::error::GameError;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const PROTOCOL_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    CreateRoom {
        #[serde(default)]
        player_name: Option<String>,
    },
    JoinRoom {
        room_code: RoomCode,
        player_name: String,
    },
    GetRoomState {
        room_code: RoomCode,
    },
    /// Host only; `imposter_count` defaults to 1
    StartGame {
        room_code: RoomCode,
        #[serde(default)]
        imposter_count: Option<usize>,
    },
    Vote {
        room_code: RoomCode,
        target_id: PlayerId,
    },
    LeaveRoom {
        room_code: RoomCode,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    /// First frame on every connection
    Welcome {
        protocol: String,
        player_id: PlayerId,
        server_now: String,
    },
    RoomCreated {
        room_code: RoomCode,
        player_id: PlayerId,
    },
    Joined {
        room_code: RoomCode,
        player_id: PlayerId,
    },
    /// Direct reply to `get_room_state` and the per-recipient broadcast
    /// after every room mutation
    RoomState {
        room: RoomView,
    },
    GameStarted {
        room_code: RoomCode,
        round: u32,
    },
    VoteAck {
        room_code: RoomCode,
        target_id: PlayerId,
    },
    Left {
        room_code: RoomCode,
    },
    /// Broadcast when a tally completes
    Outcome {
        room_code: RoomCode,
        #[serde(flatten)]
        outcome: Outcome,
    },
    Error {
        code: String,
        msg: String,
    },
}

impl From<GameError> for ServerMessage {
    fn from(err: GameError) -> Self {
        ServerMessage::Error {
            code: err.code().to_string(),
            msg: err.to_string(),
        }
    }
}

/// A room as seen by one recipient
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomView {
    pub room_code: RoomCode,
    pub status: RoomStatus,
    pub round: u32,
    pub imposter_count: usize,
    pub category: Option<String>,
    pub players: Vec<PlayerView>,
    /// Standing ballots, voter -> target
    pub votes: HashMap<PlayerId, PlayerId>,
    pub eliminated: Vec<PlayerId>,
    /// Other imposters, only sent to an imposter
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fellow_imposters: Vec<PlayerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<Winner>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reveal: Option<Reveal>,
}

/// Roster entry; `item` and `is_imposter` are filled for the recipient's own
/// entry, and for everyone once the game is finished
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub is_host: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_imposter: Option<bool>,
}
