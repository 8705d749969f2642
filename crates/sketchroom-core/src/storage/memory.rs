//! In-memory storage implementation.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::protocol::ShapeMessage;
use crate::shapes::Shape;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral relays.
#[derive(Default)]
pub struct MemoryStorage {
    rooms: RwLock<HashMap<String, Vec<Shape>>>,
}

fn lock_error<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn load_shapes(&self, room: &str) -> BoxFuture<'_, StorageResult<Vec<Shape>>> {
        let room = room.to_string();
        Box::pin(async move {
            let rooms = self.rooms.read().map_err(lock_error)?;
            Ok(rooms.get(&room).cloned().unwrap_or_default())
        })
    }

    fn save_shapes(&self, room: &str, shapes: &[Shape]) -> BoxFuture<'_, StorageResult<()>> {
        let room = room.to_string();
        let shapes = shapes.to_vec();
        Box::pin(async move {
            let mut rooms = self.rooms.write().map_err(lock_error)?;
            rooms.insert(room, shapes);
            Ok(())
        })
    }

    fn apply(&self, room: &str, message: &ShapeMessage) -> BoxFuture<'_, StorageResult<()>> {
        let room = room.to_string();
        let message = message.clone();
        Box::pin(async move {
            let mut rooms = self.rooms.write().map_err(lock_error)?;
            message.apply_to(rooms.entry(room).or_default());
            Ok(())
        })
    }

    fn list_rooms(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let rooms = self.rooms.read().map_err(lock_error)?;
            Ok(rooms.keys().cloned().collect())
        })
    }

    fn delete_room(&self, room: &str) -> BoxFuture<'_, StorageResult<()>> {
        let room = room.to_string();
        Box::pin(async move {
            let mut rooms = self.rooms.write().map_err(lock_error)?;
            rooms.remove(&room);
            Ok(())
        })
    }
}
