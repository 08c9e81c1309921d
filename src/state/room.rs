use super::AppState;
use crate::broadcast::room_view;
use crate::error::{GameError, GameResult};
use crate::protocol::RoomView;
use crate::room::{Departure, Room};
use crate::types::*;
use rand::Rng;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Safe character set for room codes (excludes 0/O, 1/I/L to avoid confusion)
const CODE_CHARS: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
const CODE_LENGTH: usize = 5;

/// Generate a random upper-case room code
pub fn generate_room_code<R: Rng + ?Sized>(rng: &mut R) -> RoomCode {
    (0..CODE_LENGTH)
        .map(|_| CODE_CHARS[rng.random_range(0..CODE_CHARS.len())] as char)
        .collect()
}

/// Room codes are case-insensitive on input
pub fn normalize_code(code: &str) -> RoomCode {
    code.trim().to_ascii_uppercase()
}

impl AppState {
    /// Create a room with `creator` as its only member and host
    pub async fn create_room(&self, creator: &PlayerId, name: Option<&str>) -> RoomCode {
        let handle = {
            let mut rooms = self.rooms.write().await;
            // Collision - try again (rare with ~28M codes)
            let code = loop {
                let code = self.draw(|rng| generate_room_code(rng));
                if !rooms.contains_key(&code) {
                    break code;
                }
            };
            let handle = Arc::new(Mutex::new(Room::new(code.clone(), creator.clone(), name)));
            rooms.insert(code, handle.clone());
            handle
        };

        let room = handle.lock().await;
        tracing::info!(room_code = %room.code, creator = %creator, "Room created");
        self.broadcast_room_state(&room).await;
        room.code.clone()
    }

    /// Look up a live room
    pub async fn get_room(&self, code: &str) -> GameResult<Arc<Mutex<Room>>> {
        self.rooms
            .read()
            .await
            .get(&normalize_code(code))
            .cloned()
            .ok_or(GameError::RoomNotFound)
    }

    pub async fn delete_room(&self, code: &str) -> bool {
        let removed = self.rooms.write().await.remove(&normalize_code(code)).is_some();
        if removed {
            tracing::info!(room_code = %code, "Room destroyed");
        }
        removed
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    /// Drop `handle` from the store if it is still registered and empty
    async fn remove_if_empty(&self, handle: &Arc<Mutex<Room>>) {
        let mut rooms = self.rooms.write().await;
        let room = handle.lock().await;
        if !room.is_empty() {
            return;
        }
        if rooms
            .get(&room.code)
            .is_some_and(|entry| Arc::ptr_eq(entry, handle))
        {
            rooms.remove(&room.code);
            tracing::info!(room_code = %room.code, "Room destroyed");
        }
    }

    pub async fn join_room(&self, player: &PlayerId, code: &str, name: &str) -> GameResult<RoomCode> {
        let handle = self.get_room(code).await?;
        let mut room = handle.lock().await;
        // An emptied room is on its way out of the store
        if room.is_empty() {
            return Err(GameError::RoomNotFound);
        }

        room.join(player.clone(), name, &self.rules)?;
        tracing::info!(
            room_code = %room.code,
            player_id = %player,
            roster = room.players.len(),
            "Player joined"
        );
        self.broadcast_room_state(&room).await;
        Ok(room.code.clone())
    }

    /// Current room as seen by `player`
    pub async fn room_state(&self, player: &PlayerId, code: &str) -> GameResult<RoomView> {
        let handle = self.get_room(code).await?;
        let room = handle.lock().await;
        if room.is_empty() {
            return Err(GameError::RoomNotFound);
        }
        Ok(room_view(&room, player))
    }

    /// Start or restart a game. Returns the round number.
    pub async fn start_game(
        &self,
        player: &PlayerId,
        code: &str,
        imposter_count: Option<usize>,
    ) -> GameResult<u32> {
        let handle = self.get_room(code).await?;
        let mut room = handle.lock().await;
        if room.is_empty() {
            return Err(GameError::RoomNotFound);
        }

        self.draw(|rng| room.start(player, imposter_count, &self.catalog, &self.rules, rng))?;
        tracing::info!(
            room_code = %room.code,
            roster = room.players.len(),
            imposters = room.imposter_count,
            "Game started"
        );
        self.broadcast_room_state(&room).await;
        Ok(room.round)
    }

    pub async fn cast_vote(&self, player: &PlayerId, code: &str, target: &str) -> GameResult<()> {
        let handle = self.get_room(code).await?;
        let mut room = handle.lock().await;
        if room.is_empty() {
            return Err(GameError::RoomNotFound);
        }

        let outcome = room.cast_vote(player, target)?;
        tracing::debug!(room_code = %room.code, voter = %player, target_id = %target, "Ballot recorded");
        self.broadcast_room_state(&room).await;

        if let Some(outcome) = outcome {
            tracing::info!(
                room_code = %room.code,
                round = outcome.round,
                winner = ?outcome.winner,
                eliminated = outcome.eliminated.len(),
                "Tally resolved"
            );
            self.broadcast_outcome(&room, &outcome).await;
        }
        Ok(())
    }

    pub async fn leave_room(&self, player: &PlayerId, code: &str) -> GameResult<()> {
        let handle = self.get_room(code).await?;
        let emptied = {
            let mut room = handle.lock().await;
            let departure = room
                .remove_player(player)
                .ok_or_else(|| GameError::invalid("not a member of this room"))?;
            self.after_departure(&room, departure).await;
            room.is_empty()
        };

        if emptied {
            self.remove_if_empty(&handle).await;
        }
        Ok(())
    }

    /// Transport-level disconnect: drop the connection and remove the player
    /// from every room they occupy
    pub async fn disconnect(&self, player: &PlayerId) {
        self.unregister_connection(player).await;

        let handles: Vec<Arc<Mutex<Room>>> = self.rooms.read().await.values().cloned().collect();
        for handle in handles {
            let emptied = {
                let mut room = handle.lock().await;
                match room.remove_player(player) {
                    Some(departure) => {
                        self.after_departure(&room, departure).await;
                        room.is_empty()
                    }
                    None => false,
                }
            };
            if emptied {
                self.remove_if_empty(&handle).await;
            }
        }

        tracing::info!(player_id = %player, "Connection closed");
    }

    /// Log and fan out the consequences of a player leaving `room`
    async fn after_departure(&self, room: &Room, departure: Departure) {
        tracing::info!(
            room_code = %room.code,
            player_id = %departure.player.id,
            remaining = room.players.len(),
            "Player left"
        );
        if room.is_empty() {
            return;
        }
        if let Some(host) = &departure.new_host {
            tracing::info!(room_code = %room.code, new_host = %host, "Host reassigned");
        }
        self.broadcast_room_state(room).await;
        if let Some(outcome) = &departure.outcome {
            self.broadcast_outcome(room, outcome).await;
        }
    }
}
