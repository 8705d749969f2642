//! WebSocket sync channel for collaboration.
//!
//! [`SyncChannel`] wraps a platform [`Transport`] and speaks the relay
//! protocol. Sends never fail to the caller: while the socket is not open the
//! message is dropped. Incoming frames that do not parse are dropped too.

use crate::protocol::{ClientMessage, ServerMessage};
use thiserror::Error;

/// Transport failures.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("already connected")]
    AlreadyConnected,
    #[error("not connected")]
    NotConnected,
    #[error("connect failed: {0}")]
    Connect(String),
    #[error("send failed: {0}")]
    Send(String),
}

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error,
}

/// Raw events from a transport.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    Opened,
    Message(String),
    Closed,
    Error(String),
}

impl ConnectionState {
    /// State after observing `event`.
    fn after(self, event: &TransportEvent) -> Self {
        match event {
            TransportEvent::Opened => ConnectionState::Connected,
            TransportEvent::Closed => ConnectionState::Disconnected,
            TransportEvent::Error(_) => ConnectionState::Error,
            TransportEvent::Message(_) => self,
        }
    }
}

/// A text-frame socket that is polled for events.
pub trait Transport {
    /// Queue a text frame.
    fn send_text(&mut self, text: &str) -> Result<(), TransportError>;

    /// Drain events received since the last poll (non-blocking).
    fn poll_events(&mut self) -> Vec<TransportEvent>;

    /// Current connection state.
    fn state(&self) -> ConnectionState;
}

/// Protocol-level events surfaced by [`SyncChannel::poll`].
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    Opened,
    Message(ServerMessage),
    Closed,
}

/// Relay connection speaking the JSON protocol over a [`Transport`].
pub struct SyncChannel<T: Transport> {
    transport: T,
    state: ConnectionState,
}

impl<T: Transport> SyncChannel<T> {
    pub fn new(transport: T) -> Self {
        let state = transport.state();
        Self { transport, state }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Send a message. Dropped (with a debug log) while the channel is not
    /// open or if the transport refuses it.
    pub fn send(&mut self, message: &ClientMessage) {
        if !self.is_open() {
            log::debug!("Sync channel not open, dropping {:?}", message);
            return;
        }
        let text = match message.to_json() {
            Ok(text) => text,
            Err(e) => {
                log::error!("Failed to encode client message: {}", e);
                return;
            }
        };
        if let Err(e) = self.transport.send_text(&text) {
            log::debug!("Send dropped: {}", e);
        }
    }

    /// Drain transport events, decoding relay messages. Malformed frames are
    /// dropped.
    pub fn poll(&mut self) -> Vec<SyncEvent> {
        let mut out = Vec::new();
        for event in self.transport.poll_events() {
            self.state = self.state.after(&event);
            match event {
                TransportEvent::Opened => out.push(SyncEvent::Opened),
                TransportEvent::Closed => out.push(SyncEvent::Closed),
                TransportEvent::Error(message) => {
                    log::warn!("Sync transport error: {}", message);
                    out.push(SyncEvent::Closed);
                }
                TransportEvent::Message(text) => match ServerMessage::from_json(&text) {
                    Ok(message) => out.push(SyncEvent::Message(message)),
                    Err(e) => log::debug!("Dropping malformed frame ({}): {}", e, text),
                },
            }
        }
        out
    }
}

#[cfg(target_arch = "wasm32")]
mod wasm;
#[cfg(target_arch = "wasm32")]
pub use wasm::WasmWebSocket;

#[cfg(not(target_arch = "wasm32"))]
mod native;
#[cfg(not(target_arch = "wasm32"))]
pub use native::NativeWebSocket;

/// Platform-specific WebSocket client type.
#[cfg(target_arch = "wasm32")]
pub type PlatformWebSocket = WasmWebSocket;

#[cfg(not(target_arch = "wasm32"))]
pub type PlatformWebSocket = NativeWebSocket;
