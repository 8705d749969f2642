//! Collaboration session: one editor joined to one relay room.
//!
//! The session glues the [`Editor`] to a [`SyncChannel`]: committed local
//! mutations are broadcast as `chat` envelopes, pointer moves as
//! `cursor_move`, and relay messages are applied to the editor or to
//! [`Presence`]. Hosts call [`CollaborationSession::pump`] once per frame.

use crate::editor::{Editor, Prompts};
use crate::input::{KeyEvent, PointerEvent};
use crate::presence::Presence;
use crate::protocol::{ClientMessage, ServerMessage, ShapeMessage};
use crate::shapes::Shape;
use crate::storage::{Storage, StorageResult};
use crate::sync::{SyncChannel, SyncEvent, Transport};

/// An editor collaborating in a single room.
pub struct CollaborationSession<T: Transport> {
    editor: Editor,
    channel: SyncChannel<T>,
    presence: Presence,
    room_id: String,
    joined: bool,
}

impl<T: Transport> CollaborationSession<T> {
    pub fn new(room_id: impl Into<String>, transport: T) -> Self {
        Self::with_editor(room_id, transport, Editor::new())
    }

    pub fn with_editor(room_id: impl Into<String>, transport: T, editor: Editor) -> Self {
        Self {
            editor,
            channel: SyncChannel::new(transport),
            presence: Presence::new(),
            room_id: room_id.into(),
            joined: false,
        }
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut Editor {
        &mut self.editor
    }

    pub fn presence(&self) -> &Presence {
        &self.presence
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn channel(&self) -> &SyncChannel<T> {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut SyncChannel<T> {
        &mut self.channel
    }

    /// Whether `join_room` has been sent on the current connection.
    pub fn is_joined(&self) -> bool {
        self.joined
    }

    /// Process pending channel events. Returns how many were handled.
    pub fn pump(&mut self) -> usize {
        let events = self.channel.poll();
        let count = events.len();
        for event in events {
            match event {
                SyncEvent::Opened => self.on_open(),
                SyncEvent::Message(message) => self.on_message(message),
                SyncEvent::Closed => self.on_close(),
            }
        }
        count
    }

    fn on_open(&mut self) {
        log::info!("Connected, joining room {}", self.room_id);
        self.channel.send(&ClientMessage::JoinRoom {
            room_id: self.room_id.clone(),
        });
        self.joined = true;
    }

    fn on_message(&mut self, message: ServerMessage) {
        match message {
            ServerMessage::Chat { room_id, message } => {
                if room_id != self.room_id {
                    log::debug!("Ignoring chat for room {}", room_id);
                    return;
                }
                match ShapeMessage::decode(&message) {
                    Ok(mutation) => self.editor.apply_remote(mutation),
                    Err(e) => log::debug!("Dropping malformed envelope: {}", e),
                }
            }
            ServerMessage::CursorMove { user_id, name, x, y } => {
                self.presence
                    .update_cursor(user_id, name, kurbo::Point::new(x, y));
            }
            ServerMessage::UserList { users } => self.presence.set_roster(users),
        }
    }

    fn on_close(&mut self) {
        log::info!("Disconnected from room {}", self.room_id);
        self.joined = false;
        self.presence.clear();
    }

    /// Leave the room. The connection stays open.
    pub fn leave(&mut self) {
        if self.joined {
            self.channel.send(&ClientMessage::LeaveRoom {
                room_id: self.room_id.clone(),
            });
            self.joined = false;
        }
    }

    /// Feed a pointer event to the editor, broadcasting any committed
    /// mutation and the pointer position.
    pub fn handle_pointer_event(
        &mut self,
        event: &PointerEvent,
        prompts: &mut dyn Prompts,
    ) -> Option<ShapeMessage> {
        let committed = self.editor.handle_pointer_event(event, prompts);
        if let PointerEvent::Move { position } = event {
            let world = self.editor.camera().screen_to_world(*position);
            self.channel.send(&ClientMessage::CursorMove {
                room_id: self.room_id.clone(),
                x: world.x,
                y: world.y,
            });
        }
        if let Some(message) = &committed {
            self.broadcast(message);
        }
        committed
    }

    pub fn handle_key_event(&mut self, event: &KeyEvent) -> bool {
        self.editor.handle_key_event(event)
    }

    /// Send a shape mutation to the room. Dropped while disconnected.
    pub fn broadcast(&mut self, message: &ShapeMessage) {
        match message.encode() {
            Ok(encoded) => self.channel.send(&ClientMessage::Chat {
                room_id: self.room_id.clone(),
                message: encoded,
            }),
            Err(e) => log::error!("Failed to encode {} envelope: {}", message.kind(), e),
        }
    }

    /// Seed the editor from a load result. A failed load seeds nothing.
    pub fn seed(&mut self, loaded: StorageResult<Vec<Shape>>) {
        match loaded {
            Ok(shapes) => {
                log::info!("Loaded {} shapes for room {}", shapes.len(), self.room_id);
                self.editor.seed(shapes);
            }
            Err(e) => {
                log::warn!("Failed to load room {}: {}; starting empty", self.room_id, e);
            }
        }
    }

    /// Load persisted shapes for the room and seed the editor.
    pub async fn load<S: Storage + ?Sized>(&mut self, storage: &S) {
        let loaded = storage.load_shapes(&self.room_id).await;
        self.seed(loaded);
    }
}
