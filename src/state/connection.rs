use super::AppState;
use crate::protocol::ServerMessage;
use crate::types::PlayerId;
use tokio::sync::mpsc::{self, error::TrySendError};

/// Frames a connection may have queued before further sends are dropped
pub const OUTBOUND_QUEUE_CAPACITY: usize = 256;

/// Outbound queue for one WebSocket connection
pub type ClientSender = mpsc::Sender<ServerMessage>;

/// Queue `msg` without waiting. A full queue means the client has stalled;
/// the frame is dropped since the next room state supersedes it.
pub(crate) fn deliver(tx: &ClientSender, player_id: &str, msg: ServerMessage) -> bool {
    match tx.try_send(msg) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            tracing::warn!(player_id = %player_id, "Outbound queue full, dropping message");
            false
        }
        Err(TrySendError::Closed(_)) => {
            tracing::debug!(player_id = %player_id, "Dropped message for closed connection");
            false
        }
    }
}

impl AppState {
    /// Allocate a connection id and its outbound queue
    pub async fn register_connection(&self) -> (PlayerId, mpsc::Receiver<ServerMessage>) {
        let (tx, rx) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);
        let id = ulid::Ulid::new().to_string();
        self.connections.write().await.insert(id.clone(), tx);
        tracing::info!(player_id = %id, "Connection registered");
        (id, rx)
    }

    pub async fn unregister_connection(&self, player_id: &PlayerId) {
        self.connections.write().await.remove(player_id);
    }

    /// Queue a message for one connection. Returns false if the connection
    /// is gone or its queue is full.
    pub async fn send_to(&self, player_id: &PlayerId, msg: ServerMessage) -> bool {
        match self.connections.read().await.get(player_id) {
            Some(tx) => deliver(tx, player_id, msg),
            None => false,
        }
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }
}
