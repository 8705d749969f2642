//! Shared relay state: the connection table and room membership.

use crate::auth::{Identity, TokenVerifier};
use dashmap::DashMap;
use sketchroom_core::{RosterEntry, ServerMessage, Storage};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, warn};
use uuid::Uuid;

/// Capacity of each connection's outbox.
pub const OUTBOX_CAPACITY: usize = 256;

pub type ConnectionId = Uuid;

/// One live WebSocket connection.
pub struct Connection {
    /// Outbox drained by the connection task.
    pub sender: mpsc::Sender<String>,
    /// Rooms this connection has joined.
    pub rooms: HashSet<String>,
    pub user_id: String,
    pub name: String,
}

/// Shared application state.
pub struct AppState {
    connections: DashMap<ConnectionId, Connection>,
    pub storage: Arc<dyn Storage>,
    pub verifier: Arc<dyn TokenVerifier>,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self {
            connections: DashMap::new(),
            storage,
            verifier,
        }
    }

    /// Add a connection and return its id with the receiving end of its outbox.
    pub fn register(&self, identity: Identity) -> (ConnectionId, mpsc::Receiver<String>) {
        let (sender, receiver) = mpsc::channel(OUTBOX_CAPACITY);
        let id = Uuid::new_v4();
        self.connections.insert(
            id,
            Connection {
                sender,
                rooms: HashSet::new(),
                user_id: identity.user_id,
                name: identity.name,
            },
        );
        (id, receiver)
    }

    /// Drop a connection, returning the rooms it was in.
    pub fn remove(&self, id: ConnectionId) -> Vec<String> {
        self.connections
            .remove(&id)
            .map(|(_, conn)| conn.rooms.into_iter().collect())
            .unwrap_or_default()
    }

    /// Add a connection to a room. Returns false if it was already a member.
    pub fn join(&self, id: ConnectionId, room: &str) -> bool {
        self.connections
            .get_mut(&id)
            .is_some_and(|mut conn| conn.rooms.insert(room.to_string()))
    }

    /// Remove a connection from a room. Returns false if it was not a member.
    pub fn leave(&self, id: ConnectionId, room: &str) -> bool {
        self.connections
            .get_mut(&id)
            .is_some_and(|mut conn| conn.rooms.remove(room))
    }

    pub fn is_member(&self, id: ConnectionId, room: &str) -> bool {
        self.connections
            .get(&id)
            .is_some_and(|conn| conn.rooms.contains(room))
    }

    pub fn identity(&self, id: ConnectionId) -> Option<Identity> {
        self.connections.get(&id).map(|conn| Identity {
            user_id: conn.user_id.clone(),
            name: conn.name.clone(),
        })
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Users connected to a room, ordered by name then user id.
    pub fn roster(&self, room: &str) -> Vec<RosterEntry> {
        let mut users: Vec<RosterEntry> = self
            .connections
            .iter()
            .filter(|entry| entry.rooms.contains(room))
            .map(|entry| RosterEntry {
                user_id: entry.user_id.clone(),
                name: entry.name.clone(),
            })
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.user_id.cmp(&b.user_id)));
        users
    }

    /// Send the current roster to every member of a room.
    pub fn broadcast_roster(&self, room: &str) {
        let message = ServerMessage::UserList {
            users: self.roster(room),
        };
        self.broadcast(room, None, &message);
    }

    /// Queue a message for every member of `room` except `except`.
    /// Full outboxes drop the message.
    pub fn broadcast(&self, room: &str, except: Option<ConnectionId>, message: &ServerMessage) {
        let text = match message.to_json() {
            Ok(text) => text,
            Err(e) => {
                error!("Failed to encode message: {}", e);
                return;
            }
        };

        let targets: Vec<(ConnectionId, mpsc::Sender<String>)> = self
            .connections
            .iter()
            .filter(|entry| Some(*entry.key()) != except && entry.rooms.contains(room))
            .map(|entry| (*entry.key(), entry.sender.clone()))
            .collect();

        for (id, sender) in targets {
            if let Err(e) = sender.try_send(text.clone()) {
                match e {
                    mpsc::error::TrySendError::Full(_) => {
                        warn!("Outbox full for {}, dropping message", id)
                    }
                    mpsc::error::TrySendError::Closed(_) => {}
                }
            }
        }
    }
}
