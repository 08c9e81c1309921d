//! Session store: the authoritative registry of rooms and live connections.
//!
//! Each room sits behind its own `Mutex`, so a transition (join, start, vote,
//! leave) runs to completion, including the fan-out it triggers, before the
//! next transition on that room starts. Rooms never coordinate with each other.

mod connection;
mod room;

pub use connection::{ClientSender, OUTBOUND_QUEUE_CAPACITY};
pub(crate) use connection::deliver;
pub use room::{generate_room_code, normalize_code};

use crate::catalog::Catalog;
use crate::room::Room;
use crate::types::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError};
use tokio::sync::{Mutex, RwLock};

pub struct AppState {
    pub(crate) rooms: RwLock<HashMap<RoomCode, Arc<Mutex<Room>>>>,
    pub(crate) connections: RwLock<HashMap<PlayerId, ClientSender>>,
    pub catalog: Arc<Catalog>,
    pub rules: RoomRules,
    rng: std::sync::Mutex<StdRng>,
}

impl AppState {
    pub fn new(catalog: Catalog, rules: RoomRules) -> Self {
        Self::build(catalog, rules, StdRng::from_os_rng())
    }

    /// Deterministic instance for tests
    pub fn with_seed(catalog: Catalog, rules: RoomRules, seed: u64) -> Self {
        Self::build(catalog, rules, StdRng::seed_from_u64(seed))
    }

    fn build(catalog: Catalog, rules: RoomRules, rng: StdRng) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            connections: RwLock::new(HashMap::new()),
            catalog: Arc::new(catalog),
            rules,
            rng: std::sync::Mutex::new(rng),
        }
    }

    /// Run `f` with the shared random source. Never held across an await.
    pub(crate) fn draw<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Catalog::builtin(), RoomRules::default())
    }
}
