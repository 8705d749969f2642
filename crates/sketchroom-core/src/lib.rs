//! Sketchroom Core Library
//!
//! Platform-agnostic shape model, editing state machine and sync protocol for
//! the sketchroom collaborative canvas.

pub mod camera;
pub mod collaboration;
pub mod editor;
pub mod input;
pub mod presence;
pub mod protocol;
pub mod selection;
pub mod shapes;
pub mod storage;
pub mod store;
pub mod sync;
pub mod tools;

pub use camera::Camera;
pub use collaboration::CollaborationSession;
pub use editor::{Editor, Interaction, Prompts};
pub use input::{KeyEvent, Modifiers, MouseButton, PointerEvent};
pub use presence::{Presence, RemoteCursor};
pub use protocol::{ClientMessage, ProtocolError, RosterEntry, ServerMessage, ShapeMessage};
pub use selection::{Handle, HandleKind, ManipulationState};
pub use shapes::{Shape, ShapeId, ShapeStyle, ShapeTrait};
pub use storage::{Storage, StorageError, StorageResult};
pub use store::ShapeStore;
pub use sync::{
    ConnectionState, PlatformWebSocket, SyncChannel, SyncEvent, Transport, TransportError,
    TransportEvent,
};
pub use tools::{ToolKind, ToolManager};
