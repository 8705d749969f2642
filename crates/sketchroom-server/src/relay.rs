//! Per-connection relay loop.
//!
//! Each WebSocket gets one task that reads client frames and drains the
//! connection's outbox. Malformed frames are dropped and the connection
//! stays open.

use crate::auth::Identity;
use crate::state::{AppState, ConnectionId};
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use sketchroom_core::{ClientMessage, ServerMessage, ShapeMessage};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Run a connection until the client goes away.
pub async fn handle_socket(socket: WebSocket, state: Arc<AppState>, identity: Identity) {
    let (id, mut outbox) = state.register(identity.clone());
    info!("New connection {} ({})", id, identity.name);

    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        handle_text(&state, id, text.as_str()).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    // Binary frames are not part of the protocol.
                    Some(Ok(Message::Binary(_))) => {
                        debug!("Ignoring binary frame from {}", id);
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("WebSocket error for {}: {}", id, e);
                        break;
                    }
                }
            }

            out = outbox.recv() => {
                let Some(text) = out else { break };
                if sender.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
        }
    }

    for room in state.remove(id) {
        state.broadcast_roster(&room);
    }
    info!("Connection closed: {}", id);
}

/// Dispatch one client text frame.
pub async fn handle_text(state: &AppState, id: ConnectionId, text: &str) {
    let message = match ClientMessage::from_json(text) {
        Ok(message) => message,
        Err(e) => {
            debug!("Dropping malformed frame from {}: {}", id, e);
            return;
        }
    };

    match message {
        ClientMessage::JoinRoom { room_id } => {
            if state.join(id, &room_id) {
                info!("{} joined room {}", id, room_id);
            }
            state.broadcast_roster(&room_id);
        }
        ClientMessage::LeaveRoom { room_id } => {
            if state.leave(id, &room_id) {
                info!("{} left room {}", id, room_id);
                state.broadcast_roster(&room_id);
            }
        }
        ClientMessage::CursorMove { room_id, x, y } => {
            if !state.is_member(id, &room_id) {
                return;
            }
            let Some(identity) = state.identity(id) else {
                return;
            };
            let message = ServerMessage::CursorMove {
                user_id: identity.user_id,
                name: identity.name,
                x,
                y,
            };
            state.broadcast(&room_id, Some(id), &message);
        }
        ClientMessage::Chat { room_id, message } => {
            if !state.is_member(id, &room_id) {
                debug!("Dropping chat from {} for unjoined room {}", id, room_id);
                return;
            }
            let envelope = match ShapeMessage::decode(&message) {
                Ok(envelope) => envelope,
                Err(e) => {
                    debug!("Dropping invalid envelope from {}: {}", id, e);
                    return;
                }
            };
            if let Err(e) = state.storage.apply(&room_id, &envelope).await {
                error!(
                    "Failed to persist {} in room {}: {}",
                    envelope.kind(),
                    room_id,
                    e
                );
            }
            let chat = ServerMessage::Chat {
                room_id: room_id.clone(),
                message,
            };
            state.broadcast(&room_id, Some(id), &chat);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticTokenVerifier;
    use kurbo::Point;
    use sketchroom_core::shapes::{Rectangle, Shape};
    use sketchroom_core::storage::MemoryStorage;
    use sketchroom_core::Storage;
    use tokio::sync::mpsc::Receiver;

    fn state() -> (AppState, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let state = AppState::new(
            storage.clone(),
            Arc::new(StaticTokenVerifier::new(Default::default(), true)),
        );
        (state, storage)
    }

    fn connect(state: &AppState, name: &str) -> (ConnectionId, Receiver<String>) {
        state.register(Identity {
            user_id: name.to_lowercase(),
            name: name.to_string(),
        })
    }

    async fn send(state: &AppState, id: ConnectionId, message: ClientMessage) {
        handle_text(state, id, &message.to_json().unwrap()).await;
    }

    fn drain(rx: &mut Receiver<String>) -> Vec<ServerMessage> {
        let mut out = Vec::new();
        while let Ok(text) = rx.try_recv() {
            out.push(ServerMessage::from_json(&text).unwrap());
        }
        out
    }

    fn join(room: &str) -> ClientMessage {
        ClientMessage::JoinRoom {
            room_id: room.to_string(),
        }
    }

    #[tokio::test]
    async fn test_join_broadcasts_roster() {
        let (state, _) = state();
        let (a, mut ra) = connect(&state, "Ada");
        let (b, mut rb) = connect(&state, "Bob");

        send(&state, a, join("room")).await;
        send(&state, b, join("room")).await;

        let to_a = drain(&mut ra);
        assert_eq!(to_a.len(), 2);
        let ServerMessage::UserList { users } = &to_a[1] else {
            panic!("expected user_list, got {:?}", to_a[1]);
        };
        assert_eq!(users.len(), 2);
        assert_eq!(drain(&mut rb).len(), 1);
    }

    #[tokio::test]
    async fn test_cursor_goes_to_others_only() {
        let (state, _) = state();
        let (a, mut ra) = connect(&state, "Ada");
        let (b, mut rb) = connect(&state, "Bob");
        send(&state, a, join("room")).await;
        send(&state, b, join("room")).await;
        drain(&mut ra);
        drain(&mut rb);

        let cursor = ClientMessage::CursorMove {
            room_id: "room".to_string(),
            x: 5.0,
            y: 6.0,
        };
        send(&state, a, cursor).await;

        assert!(drain(&mut ra).is_empty());
        assert_eq!(
            drain(&mut rb),
            vec![ServerMessage::CursorMove {
                user_id: "ada".to_string(),
                name: "Ada".to_string(),
                x: 5.0,
                y: 6.0,
            }]
        );
    }

    #[tokio::test]
    async fn test_chat_persists_and_fans_out() {
        let (state, storage) = state();
        let (a, mut ra) = connect(&state, "Ada");
        let (b, mut rb) = connect(&state, "Bob");
        send(&state, a, join("room")).await;
        send(&state, b, join("room")).await;
        drain(&mut ra);
        drain(&mut rb);

        let shape = Shape::Rectangle(Rectangle::new(Point::new(1.0, 2.0), 3.0, 4.0));
        let message = ShapeMessage::Create(shape.clone()).encode().unwrap();
        let chat = ClientMessage::Chat {
            room_id: "room".to_string(),
            message: message.clone(),
        };
        send(&state, a, chat).await;

        assert!(drain(&mut ra).is_empty());
        assert_eq!(
            drain(&mut rb),
            vec![ServerMessage::Chat {
                room_id: "room".to_string(),
                message,
            }]
        );
        assert_eq!(storage.load_shapes("room").await.unwrap(), vec![shape]);
    }

    #[tokio::test]
    async fn test_malformed_frames_are_dropped() {
        let (state, storage) = state();
        let (a, mut ra) = connect(&state, "Ada");
        let (b, mut rb) = connect(&state, "Bob");
        send(&state, a, join("room")).await;
        send(&state, b, join("room")).await;
        drain(&mut ra);
        drain(&mut rb);

        handle_text(&state, a, "not json").await;
        handle_text(&state, a, r#"{"type":"dance"}"#).await;
        let bad_envelope = ClientMessage::Chat {
            room_id: "room".to_string(),
            message: r#"{"type":"explode"}"#.to_string(),
        };
        send(&state, a, bad_envelope).await;

        assert!(drain(&mut rb).is_empty());
        assert!(storage.load_shapes("room").await.unwrap().is_empty());
        assert!(state.is_member(a, "room"));
    }

    #[tokio::test]
    async fn test_chat_requires_membership() {
        let (state, storage) = state();
        let (a, _ra) = connect(&state, "Ada");
        let chat = ClientMessage::Chat {
            room_id: "room".to_string(),
            message: r#"{"type":"clear"}"#.to_string(),
        };
        send(&state, a, chat).await;
        assert!(storage.list_rooms().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_leave_updates_remaining() {
        let (state, _) = state();
        let (a, mut ra) = connect(&state, "Ada");
        let (b, mut rb) = connect(&state, "Bob");
        send(&state, a, join("room")).await;
        send(&state, b, join("room")).await;
        drain(&mut ra);
        drain(&mut rb);

        send(
            &state,
            b,
            ClientMessage::LeaveRoom {
                room_id: "room".to_string(),
            },
        )
        .await;

        let to_a = drain(&mut ra);
        let ServerMessage::UserList { users } = &to_a[0] else {
            panic!("expected user_list");
        };
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].name, "Ada");
        assert!(drain(&mut rb).is_empty());
    }
}
