//! WebSocket message dispatch
//!
//! Every request gets exactly one direct reply: an acknowledgement or an
//! `Error`. Room broadcasts are queued separately by the state layer.

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;
use crate::types::PlayerId;
use std::sync::Arc;

/// Handle a client message and return the reply for the sender
pub async fn handle_message(
    msg: ClientMessage,
    player_id: &PlayerId,
    state: &Arc<AppState>,
) -> ServerMessage {
    let result = match msg {
        ClientMessage::CreateRoom { player_name } => {
            let room_code = state.create_room(player_id, player_name.as_deref()).await;
            Ok(ServerMessage::RoomCreated {
                room_code,
                player_id: player_id.clone(),
            })
        }

        ClientMessage::JoinRoom {
            room_code,
            player_name,
        } => state
            .join_room(player_id, &room_code, &player_name)
            .await
            .map(|room_code| ServerMessage::Joined {
                room_code,
                player_id: player_id.clone(),
            }),

        ClientMessage::GetRoomState { room_code } => state
            .room_state(player_id, &room_code)
            .await
            .map(|room| ServerMessage::RoomState { room }),

        ClientMessage::StartGame {
            room_code,
            imposter_count,
        } => state
            .start_game(player_id, &room_code, imposter_count)
            .await
            .map(|round| ServerMessage::GameStarted { room_code, round }),

        ClientMessage::Vote {
            room_code,
            target_id,
        } => state
            .cast_vote(player_id, &room_code, &target_id)
            .await
            .map(|()| ServerMessage::VoteAck {
                room_code,
                target_id,
            }),

        ClientMessage::LeaveRoom { room_code } => state
            .leave_room(player_id, &room_code)
            .await
            .map(|()| ServerMessage::Left { room_code }),
    };

    result.unwrap_or_else(|e| {
        tracing::warn!(player_id = %player_id, code = e.code(), "Request rejected: {}", e);
        e.into()
    })
}
