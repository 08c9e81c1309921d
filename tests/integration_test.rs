use imposter::catalog::Catalog;
use imposter::config::ServerConfig;
use imposter::protocol::{ClientMessage, RoomView, ServerMessage};
use imposter::state::AppState;
use imposter::types::{Outcome, PlayerId, RoomRules, RoomStatus, Winner};
use imposter::ws::handlers::handle_message;
use std::sync::Arc;
use tokio::sync::mpsc::Receiver;

struct Client {
    id: PlayerId,
    rx: Receiver<ServerMessage>,
}

impl Client {
    async fn connect(state: &Arc<AppState>) -> Self {
        let (id, rx) = state.register_connection().await;
        Self { id, rx }
    }

    async fn send(&self, state: &Arc<AppState>, msg: ClientMessage) -> ServerMessage {
        handle_message(msg, &self.id, state).await
    }

    fn drain(&mut self) -> Vec<ServerMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            out.push(msg);
        }
        out
    }

    /// Most recent room state pushed to this client
    fn last_view(&mut self) -> RoomView {
        self.drain()
            .into_iter()
            .rev()
            .find_map(|m| match m {
                ServerMessage::RoomState { room } => Some(room),
                _ => None,
            })
            .expect("Expected a RoomState broadcast")
    }

    fn outcomes(&mut self) -> Vec<Outcome> {
        self.drain()
            .into_iter()
            .filter_map(|m| match m {
                ServerMessage::Outcome { outcome, .. } => Some(outcome),
                _ => None,
            })
            .collect()
    }
}

fn seeded_state(seed: u64) -> Arc<AppState> {
    Arc::new(AppState::with_seed(
        Catalog::builtin(),
        RoomRules::default(),
        seed,
    ))
}

/// Create a room with `n` connected players; the first one is host
async fn setup_room(state: &Arc<AppState>, n: usize) -> (String, Vec<Client>) {
    let host = Client::connect(state).await;
    let room_code = match host
        .send(state, ClientMessage::CreateRoom {
            player_name: Some("Host".to_string()),
        })
        .await
    {
        ServerMessage::RoomCreated { room_code, .. } => room_code,
        other => panic!("Expected RoomCreated, got {:?}", other),
    };

    let mut clients = vec![host];
    for i in 1..n {
        let client = Client::connect(state).await;
        let reply = client
            .send(state, ClientMessage::JoinRoom {
                room_code: room_code.to_lowercase(),
                player_name: format!("Player {}", i),
            })
            .await;
        assert!(
            matches!(reply, ServerMessage::Joined { .. }),
            "join failed: {:?}",
            reply
        );
        clients.push(client);
    }
    (room_code, clients)
}

async fn start(state: &Arc<AppState>, code: &str, host: &Client, imposters: usize) {
    let reply = host
        .send(state, ClientMessage::StartGame {
            room_code: code.to_string(),
            imposter_count: Some(imposters),
        })
        .await;
    assert!(
        matches!(reply, ServerMessage::GameStarted { round: 1, .. }),
        "start failed: {:?}",
        reply
    );
}

/// Ids of the imposters, learned from each client's private view
fn imposters_of(clients: &mut [Client]) -> Vec<PlayerId> {
    let mut out = Vec::new();
    for client in clients.iter_mut() {
        let view = client.last_view();
        let me = view.players.iter().find(|p| p.id == client.id).unwrap();
        if me.is_imposter == Some(true) {
            out.push(client.id.clone());
        }
    }
    out
}

async fn vote(state: &Arc<AppState>, code: &str, voter: &Client, target: &PlayerId) -> ServerMessage {
    voter
        .send(state, ClientMessage::Vote {
            room_code: code.to_string(),
            target_id: target.clone(),
        })
        .await
}

#[tokio::test]
async fn test_three_player_game_crewmates_catch_imposter() {
    let state = seeded_state(1);
    let (code, mut clients) = setup_room(&state, 3).await;
    start(&state, &code, &clients[0], 1).await;

    let imposters = imposters_of(&mut clients);
    assert_eq!(imposters.len(), 1);
    let imposter = imposters[0].clone();
    let imposter_idx = clients.iter().position(|c| c.id == imposter).unwrap();
    let crew: Vec<usize> = (0..3).filter(|i| *i != imposter_idx).collect();

    // Both crewmates vote the imposter, the imposter votes a crewmate
    for &i in &crew {
        let reply = vote(&state, &code, &clients[i], &imposter).await;
        assert!(matches!(reply, ServerMessage::VoteAck { .. }));
    }
    let scapegoat = clients[crew[0]].id.clone();
    vote(&state, &code, &clients[imposter_idx], &scapegoat).await;

    for client in clients.iter_mut() {
        let outcomes = client.outcomes();
        assert_eq!(outcomes.len(), 1);
        let outcome = &outcomes[0];
        assert_eq!(outcome.eliminated, vec![imposter.clone()]);
        assert_eq!(outcome.winner, Some(Winner::Crewmates));
        let reveal = outcome.reveal.as_ref().unwrap();
        assert_eq!(reveal.imposter_ids, vec![imposter.clone()]);
    }

    let view = state.room_state(&clients[1].id, &code).await.unwrap();
    assert_eq!(view.status, RoomStatus::Finished);
    assert!(view.players.iter().all(|p| p.item.is_some()));
}

#[tokio::test]
async fn test_four_players_two_imposters_survivor_wins() {
    let state = seeded_state(2);
    let (code, mut clients) = setup_room(&state, 4).await;
    start(&state, &code, &clients[0], 2).await;

    let imposters = imposters_of(&mut clients);
    assert_eq!(imposters.len(), 2);
    let (a, b) = (imposters[0].clone(), imposters[1].clone());
    let crew: Vec<PlayerId> = clients
        .iter()
        .map(|c| c.id.clone())
        .filter(|id| !imposters.contains(id))
        .collect();
    let (c, d) = (crew[0].clone(), crew[1].clone());
    let by_id = |id: &PlayerId| clients.iter().position(|cl| cl.id == *id).unwrap();

    // C->A, D->A, A->C, B->C
    vote(&state, &code, &clients[by_id(&c)], &a).await;
    vote(&state, &code, &clients[by_id(&d)], &a).await;
    vote(&state, &code, &clients[by_id(&a)], &c).await;
    vote(&state, &code, &clients[by_id(&b)], &c).await;

    let outcomes = clients[0].outcomes();
    assert_eq!(outcomes.len(), 1);
    let outcome = &outcomes[0];
    // A and C tie on two ballots each
    assert!(outcome.eliminated.contains(&a));
    assert!(!outcome.eliminated.contains(&b));
    assert_eq!(outcome.winner, Some(Winner::Imposters));
}

#[tokio::test]
async fn test_room_capacity_is_eight() {
    let state = seeded_state(3);
    let (code, mut clients) = setup_room(&state, 8).await;
    clients[0].drain();

    let ninth = Client::connect(&state).await;
    let reply = ninth
        .send(&state, ClientMessage::JoinRoom {
            room_code: code.clone(),
            player_name: "Nine".to_string(),
        })
        .await;
    assert!(matches!(reply, ServerMessage::Error { ref code, .. } if code == "ROOM_FULL"));

    let view = state.room_state(&clients[0].id, &code).await.unwrap();
    assert_eq!(view.players.len(), 8);
    // No broadcast went out for the rejected join
    assert!(clients[0].drain().is_empty());
}

#[tokio::test]
async fn test_host_disconnect_promotes_earliest_joiner() {
    let state = seeded_state(4);
    let (code, mut clients) = setup_room(&state, 3).await;
    let host_id = clients[0].id.clone();

    state.disconnect(&host_id).await;

    let view = clients[1].last_view();
    assert_eq!(view.room_code, code);
    assert_eq!(view.players.len(), 2);
    let hosts: Vec<_> = view.players.iter().filter(|p| p.is_host).collect();
    assert_eq!(hosts.len(), 1);
    assert_eq!(hosts[0].id, clients[1].id);

    // The new host can start once the roster is big enough again
    let newcomer = Client::connect(&state).await;
    newcomer
        .send(&state, ClientMessage::JoinRoom {
            room_code: code.clone(),
            player_name: "New".to_string(),
        })
        .await;
    let reply = clients[1]
        .send(&state, ClientMessage::StartGame {
            room_code: code,
            imposter_count: None,
        })
        .await;
    assert!(matches!(reply, ServerMessage::GameStarted { .. }));
}

#[tokio::test]
async fn test_secrets_never_leak_while_playing() {
    let state = seeded_state(5);
    let (code, mut clients) = setup_room(&state, 6).await;
    start(&state, &code, &clients[0], 2).await;

    for client in clients.iter_mut() {
        let view = client.last_view();
        for p in &view.players {
            if p.id == client.id {
                assert!(p.item.is_some());
                assert!(p.is_imposter.is_some());
            } else {
                assert!(p.item.is_none(), "leaked item of {}", p.id);
                assert!(p.is_imposter.is_none(), "leaked role of {}", p.id);
            }
        }
        assert!(view.reveal.is_none());
    }

    // A fetch by a non-member shows nothing secret either
    let outsider = Client::connect(&state).await;
    match outsider
        .send(&state, ClientMessage::GetRoomState { room_code: code })
        .await
    {
        ServerMessage::RoomState { room } => {
            assert!(room.players.iter().all(|p| p.item.is_none()));
            assert!(room.fellow_imposters.is_empty());
        }
        other => panic!("Expected RoomState, got {:?}", other),
    }
}

#[tokio::test]
async fn test_play_again_replaces_previous_round() {
    let state = seeded_state(6);
    let (code, mut clients) = setup_room(&state, 4).await;
    start(&state, &code, &clients[0], 1).await;

    let first_imposters = imposters_of(&mut clients);
    let target = first_imposters[0].clone();
    for client in &clients {
        vote(&state, &code, client, &target).await;
    }
    let finished = state.room_state(&clients[0].id, &code).await.unwrap();
    assert_eq!(finished.status, RoomStatus::Finished);
    let first_reveal = finished.reveal.unwrap();

    // Joining a finished room is refused
    let late = Client::connect(&state).await;
    let reply = late
        .send(&state, ClientMessage::JoinRoom {
            room_code: code.clone(),
            player_name: "Late".to_string(),
        })
        .await;
    assert!(matches!(reply, ServerMessage::Error { ref code, .. } if code == "GAME_IN_PROGRESS"));

    let mut changed = false;
    for _ in 0..10 {
        start(&state, &code, &clients[0], 1).await;
        for client in clients.iter_mut() {
            let view = client.last_view();
            assert_eq!(view.status, RoomStatus::Playing);
            assert_eq!(view.round, 1);
            assert!(view.votes.is_empty());
            assert!(view.winner.is_none());
            assert!(view.reveal.is_none());
            let others_with_items = view
                .players
                .iter()
                .filter(|p| p.id != client.id && p.item.is_some())
                .count();
            assert_eq!(others_with_items, 0);
        }

        let room = state.get_room(&code).await.unwrap();
        let reveal = room.lock().await.assignment.as_ref().unwrap().reveal();
        if reveal != first_reveal {
            changed = true;
        }

        // Finish again so the next start is legal
        let target = reveal.imposter_ids[0].clone();
        for client in &clients {
            vote(&state, &code, client, &target).await;
        }
    }
    assert!(changed, "ten restarts never produced a new assignment");
}

#[tokio::test]
async fn test_disconnect_during_voting_completes_tally() {
    let state = seeded_state(7);
    let (code, mut clients) = setup_room(&state, 4).await;
    start(&state, &code, &clients[0], 1).await;

    let imposters = imposters_of(&mut clients);
    let imposter = imposters[0].clone();
    let mut voters: Vec<usize> = Vec::new();
    let mut quitter = None;
    for (i, c) in clients.iter().enumerate() {
        if c.id != imposter && quitter.is_none() {
            quitter = Some(i);
        } else {
            voters.push(i);
        }
    }
    let quitter = quitter.unwrap();

    for &i in &voters {
        vote(&state, &code, &clients[i], &imposter).await;
    }
    assert!(clients[voters[0]].outcomes().is_empty());

    let quitter_id = clients[quitter].id.clone();
    state.disconnect(&quitter_id).await;

    let outcomes = clients[voters[0]].outcomes();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].winner, Some(Winner::Crewmates));
}

#[tokio::test]
async fn test_last_disconnect_destroys_room() {
    let state = seeded_state(8);
    let (code, clients) = setup_room(&state, 2).await;
    for client in &clients {
        state.disconnect(&client.id).await;
    }
    assert_eq!(state.room_count().await, 0);

    let stranger = Client::connect(&state).await;
    let reply = stranger
        .send(&state, ClientMessage::GetRoomState { room_code: code })
        .await;
    assert!(matches!(reply, ServerMessage::Error { ref code, .. } if code == "ROOM_NOT_FOUND"));
}

#[tokio::test]
async fn test_static_fallback_serves_index() {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<html>imposter</html>").unwrap();

    let config = ServerConfig {
        static_dir: dir.path().to_path_buf(),
        ..ServerConfig::default()
    };
    let app = imposter::app(seeded_state(9), &config);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/game/ABCDE")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"<html>imposter</html>");
}
