//! File-based storage implementation for native platforms.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::protocol::ShapeMessage;
use crate::shapes::Shape;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// File-based storage for native platforms.
///
/// Each room is one JSON file holding the shape list. Writes to a room are
/// serialized by a per-room lock and land through a rename, so concurrent
/// `apply` calls never lose each other's changes and readers never see a
/// half-written file.
pub struct FileStorage {
    /// Base directory for room files.
    base_path: PathBuf,
    room_locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl FileStorage {
    /// Create a new file storage with the given base directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self {
            base_path,
            room_locks: Mutex::new(HashMap::new()),
        })
    }

    /// Create file storage in the default location.
    ///
    /// On Unix: `~/.local/share/sketchroom/rooms/`
    /// On Windows: `%LOCALAPPDATA%\sketchroom\rooms\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;

        Self::new(base.join("sketchroom").join("rooms"))
    }

    /// Get the file path for a room id.
    fn room_path(&self, room: &str) -> PathBuf {
        let safe_id: String = room
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{}.json", safe_id))
    }

    /// Get the base path.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn room_lock(&self, path: &Path) -> Arc<Mutex<()>> {
        let mut locks = self
            .room_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        locks.entry(path.to_path_buf()).or_default().clone()
    }

    /// Run `f` while holding the lock for the room file at `path`.
    fn with_room<T>(&self, path: &Path, f: impl FnOnce() -> StorageResult<T>) -> StorageResult<T> {
        let lock = self.room_lock(path);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }
}

fn read_room(path: &Path) -> StorageResult<Vec<Shape>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let json = fs::read_to_string(path)
        .map_err(|e| StorageError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&json).map_err(|e| {
        StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
    })
}

/// Write through a sibling temp file and rename it over the room file.
fn write_room(path: &Path, shapes: &[Shape]) -> StorageResult<()> {
    let json =
        serde_json::to_string(shapes).map_err(|e| StorageError::Serialization(e.to_string()))?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)
        .map_err(|e| StorageError::Io(format!("Failed to write {}: {}", tmp.display(), e)))?;
    fs::rename(&tmp, path)
        .map_err(|e| StorageError::Io(format!("Failed to replace {}: {}", path.display(), e)))
}

impl Storage for FileStorage {
    fn load_shapes(&self, room: &str) -> BoxFuture<'_, StorageResult<Vec<Shape>>> {
        let path = self.room_path(room);
        Box::pin(async move { read_room(&path) })
    }

    fn save_shapes(&self, room: &str, shapes: &[Shape]) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.room_path(room);
        let shapes = shapes.to_vec();
        Box::pin(async move { self.with_room(&path, || write_room(&path, &shapes)) })
    }

    fn apply(&self, room: &str, message: &ShapeMessage) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.room_path(room);
        let message = message.clone();
        Box::pin(async move {
            self.with_room(&path, || {
                let mut shapes = read_room(&path)?;
                message.apply_to(&mut shapes);
                write_room(&path, &shapes)
            })
        })
    }

    fn list_rooms(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        let base = self.base_path.clone();

        Box::pin(async move {
            if !base.exists() {
                return Ok(vec![]);
            }

            let entries = fs::read_dir(&base)
                .map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;

            let mut ids = Vec::new();
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|e| e == "json") {
                    if let Some(name) = path.file_stem().and_then(|n| n.to_str()) {
                        ids.push(name.to_string());
                    }
                }
            }
            Ok(ids)
        })
    }

    fn delete_room(&self, room: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.room_path(room);

        Box::pin(async move {
            self.with_room(&path, || {
                if path.exists() {
                    fs::remove_file(&path).map_err(|e| {
                        StorageError::Io(format!("Failed to delete {}: {}", path.display(), e))
                    })?;
                }
                Ok(())
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Rectangle, Text};
    use crate::storage::block_on;
    use kurbo::Point;
    use tempfile::tempdir;

    #[test]
    fn test_file_storage_apply_and_load() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        let rect = Shape::Rectangle(Rectangle::new(Point::new(10.0, 10.0), 40.0, 30.0));
        let text = Shape::Text(Text::new(Point::new(0.0, 20.0), "hi".to_string()));
        block_on(storage.apply("room", &ShapeMessage::Create(rect.clone()))).unwrap();
        block_on(storage.apply("room", &ShapeMessage::Create(text.clone()))).unwrap();

        let reopened = FileStorage::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(block_on(reopened.load_shapes("room")).unwrap(), vec![rect, text]);
    }

    #[test]
    fn test_file_storage_missing_room_is_empty() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        assert!(block_on(storage.load_shapes("nonexistent")).unwrap().is_empty());
    }

    #[test]
    fn test_file_storage_corrupt_file() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        fs::write(dir.path().join("bad.json"), "{not json").unwrap();
        assert!(matches!(
            block_on(storage.load_shapes("bad")),
            Err(StorageError::Serialization(_))
        ));
    }

    #[test]
    fn test_file_storage_list_and_delete() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        block_on(storage.save_shapes("room1", &[])).unwrap();
        block_on(storage.save_shapes("room2", &[])).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let list = block_on(storage.list_rooms()).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.contains(&"room1".to_string()));
        assert!(list.contains(&"room2".to_string()));

        block_on(storage.delete_room("room1")).unwrap();
        assert_eq!(block_on(storage.list_rooms()).unwrap(), vec!["room2".to_string()]);
        block_on(storage.delete_room("room1")).unwrap();
    }

    #[test]
    fn test_file_storage_sanitizes_id() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        let rect = Shape::Rectangle(Rectangle::new(Point::ZERO, 1.0, 1.0));
        block_on(storage.save_shapes("../room:with*special", &[rect.clone()])).unwrap();

        assert!(dir.path().join("___room_with_special.json").exists());
        assert_eq!(
            block_on(storage.load_shapes("../room:with*special")).unwrap(),
            vec![rect]
        );
    }

    #[test]
    fn test_file_storage_concurrent_apply_keeps_every_write() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        std::thread::scope(|scope| {
            for t in 0..8 {
                let storage = &storage;
                scope.spawn(move || {
                    for i in 0..25 {
                        let at = Point::new(t as f64 * 100.0, i as f64 * 10.0);
                        let rect = Shape::Rectangle(Rectangle::new(at, 5.0, 5.0));
                        block_on(storage.apply("room", &ShapeMessage::Create(rect))).unwrap();
                    }
                });
            }
        });

        assert_eq!(block_on(storage.load_shapes("room")).unwrap().len(), 200);
        assert_eq!(block_on(storage.list_rooms()).unwrap(), vec!["room".to_string()]);
    }
}
