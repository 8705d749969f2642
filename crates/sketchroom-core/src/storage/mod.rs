//! Storage abstraction for persisted room shapes.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use crate::protocol::ShapeMessage;
use crate::shapes::Shape;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations. `Send` on native so the relay can hold
/// storage across tasks.
#[cfg(not(target_arch = "wasm32"))]
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Boxed future for async operations (WASM is single-threaded).
#[cfg(target_arch = "wasm32")]
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Trait for room storage backends.
///
/// A room that was never written loads as empty. Writes are best-effort;
/// there are no transaction guarantees across calls.
#[cfg(not(target_arch = "wasm32"))]
pub trait Storage: Send + Sync {
    /// Persisted shapes of a room, in paint order.
    fn load_shapes(&self, room: &str) -> BoxFuture<'_, StorageResult<Vec<Shape>>>;

    /// Replace the persisted shapes of a room.
    fn save_shapes(&self, room: &str, shapes: &[Shape]) -> BoxFuture<'_, StorageResult<()>>;

    /// Apply one shape mutation to a room.
    fn apply(&self, room: &str, message: &ShapeMessage) -> BoxFuture<'_, StorageResult<()>>;

    /// All rooms with persisted state.
    fn list_rooms(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    /// Drop a room's persisted state.
    fn delete_room(&self, room: &str) -> BoxFuture<'_, StorageResult<()>>;
}

/// Trait for room storage backends (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait Storage {
    /// Persisted shapes of a room, in paint order.
    fn load_shapes(&self, room: &str) -> BoxFuture<'_, StorageResult<Vec<Shape>>>;

    /// Replace the persisted shapes of a room.
    fn save_shapes(&self, room: &str, shapes: &[Shape]) -> BoxFuture<'_, StorageResult<()>>;

    /// Apply one shape mutation to a room.
    fn apply(&self, room: &str, message: &ShapeMessage) -> BoxFuture<'_, StorageResult<()>>;

    /// All rooms with persisted state.
    fn list_rooms(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    /// Drop a room's persisted state.
    fn delete_room(&self, room: &str) -> BoxFuture<'_, StorageResult<()>>;
}

/// Simple blocking executor for tests; storage futures never pend.
#[cfg(test)]
pub(crate) fn block_on<F: Future>(f: F) -> F::Output {
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        if let Poll::Ready(result) = f.as_mut().poll(&mut cx) {
            return result;
        }
    }
}
