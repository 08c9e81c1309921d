//! Turns room state into per-recipient messages.
//!
//! Secret attributes (own item, imposter flag) only ever go to the owning
//! connection while a game is running. Everything is revealed once the room
//! reaches `finished`.

use crate::protocol::{PlayerView, RoomView, ServerMessage};
use crate::room::Room;
use crate::state::{deliver, AppState};
use crate::types::{Outcome, RoomStatus};

/// Build the view of `room` that `recipient` is allowed to see
pub fn room_view(room: &Room, recipient: &str) -> RoomView {
    let finished = room.status == RoomStatus::Finished;

    let players = room
        .players
        .iter()
        .map(|p| {
            let secret = if finished || p.id == recipient {
                p.secret.as_ref()
            } else {
                None
            };
            PlayerView {
                id: p.id.clone(),
                name: p.name.clone(),
                is_host: p.is_host,
                item: secret.map(|s| s.item.clone()),
                is_imposter: secret.map(|s| s.is_imposter),
            }
        })
        .collect();

    let fellow_imposters = match &room.assignment {
        Some(a) if room.status == RoomStatus::Playing && a.is_imposter(recipient) => a
            .imposter_ids
            .iter()
            .filter(|id| id.as_str() != recipient)
            .cloned()
            .collect(),
        _ => Vec::new(),
    };

    RoomView {
        room_code: room.code.clone(),
        status: room.status,
        round: room.round,
        imposter_count: room.imposter_count,
        category: room.assignment.as_ref().map(|a| a.category.clone()),
        players,
        votes: room.votes.clone(),
        eliminated: room.eliminated.clone(),
        fellow_imposters,
        winner: if finished {
            room.outcome.as_ref().and_then(|o| o.winner)
        } else {
            None
        },
        reveal: if finished {
            room.assignment.as_ref().map(|a| a.reveal())
        } else {
            None
        },
    }
}

impl AppState {
    /// Push a filtered `RoomState` to every member of `room`
    pub async fn broadcast_room_state(&self, room: &Room) {
        let connections = self.connections.read().await;
        for player in &room.players {
            let Some(tx) = connections.get(&player.id) else {
                continue;
            };
            let msg = ServerMessage::RoomState {
                room: room_view(room, &player.id),
            };
            deliver(tx, &player.id, msg);
        }
    }

    /// Push a tally outcome to every member of `room`
    pub async fn broadcast_outcome(&self, room: &Room, outcome: &Outcome) {
        let connections = self.connections.read().await;
        for player in &room.players {
            let Some(tx) = connections.get(&player.id) else {
                continue;
            };
            let msg = ServerMessage::Outcome {
                room_code: room.code.clone(),
                outcome: outcome.clone(),
            };
            deliver(tx, &player.id, msg);
        }
    }
}
