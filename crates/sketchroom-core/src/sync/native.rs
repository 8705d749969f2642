//! Blocking tungstenite client driven from a background thread.

use super::{ConnectionState, Transport, TransportError, TransportEvent};
use std::io::ErrorKind;
use std::net::TcpStream;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};
use url::Url;

/// How long a read may block before outgoing frames are serviced.
const READ_TIMEOUT: Duration = Duration::from_millis(50);
const WRITE_TIMEOUT: Duration = Duration::from_secs(5);

enum Outgoing {
    Text(String),
    Close,
}

/// Endpoints of a running socket thread.
struct Link {
    outgoing: Sender<Outgoing>,
    events: Receiver<TransportEvent>,
}

/// WebSocket client for native platforms.
///
/// The socket lives on its own thread; frames and events cross over std
/// channels, so `send_text` and `poll_events` never block.
#[derive(Default)]
pub struct NativeWebSocket {
    link: Option<Link>,
    state: ConnectionState,
}

impl NativeWebSocket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start connecting to a `ws://` url. This build has no TLS, so `wss://`
    /// is refused up front.
    pub fn connect(&mut self, url: &str) -> Result<(), TransportError> {
        if self.link.is_some() {
            return Err(TransportError::AlreadyConnected);
        }
        let url = Url::parse(url).map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
        match url.scheme() {
            "ws" => {}
            "wss" => {
                return Err(TransportError::InvalidUrl(
                    "wss:// needs TLS, which the native client is built without".to_string(),
                ));
            }
            other => {
                return Err(TransportError::InvalidUrl(format!(
                    "unsupported scheme: {other}"
                )));
            }
        }

        let (outgoing, outgoing_rx) = mpsc::channel();
        let (events_tx, events) = mpsc::channel();
        thread::Builder::new()
            .name("sketchroom-ws".to_string())
            .spawn(move || SocketWorker::run(url, outgoing_rx, events_tx))
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        self.link = Some(Link { outgoing, events });
        self.state = ConnectionState::Connecting;
        Ok(())
    }

    /// Ask the socket thread to close and forget it.
    pub fn disconnect(&mut self) {
        if let Some(link) = self.link.take() {
            let _ = link.outgoing.send(Outgoing::Close);
        }
        self.state = ConnectionState::Disconnected;
    }
}

impl Transport for NativeWebSocket {
    fn send_text(&mut self, text: &str) -> Result<(), TransportError> {
        let link = self.link.as_ref().ok_or(TransportError::NotConnected)?;
        link.outgoing
            .send(Outgoing::Text(text.to_string()))
            .map_err(|e| TransportError::Send(e.to_string()))
    }

    fn poll_events(&mut self) -> Vec<TransportEvent> {
        let Some(link) = &self.link else {
            return Vec::new();
        };
        let events: Vec<TransportEvent> = link.events.try_iter().collect();
        for event in &events {
            self.state = self.state.after(event);
        }
        events
    }

    fn state(&self) -> ConnectionState {
        self.state
    }
}

impl Drop for NativeWebSocket {
    fn drop(&mut self) {
        self.disconnect();
    }
}

struct SocketWorker {
    socket: WebSocket<MaybeTlsStream<TcpStream>>,
    outgoing: Receiver<Outgoing>,
    events: Sender<TransportEvent>,
}

impl SocketWorker {
    fn run(url: Url, outgoing: Receiver<Outgoing>, events: Sender<TransportEvent>) {
        log::info!("Connecting to {}", url);
        let socket = match tungstenite::connect(url.as_str()) {
            Ok((socket, response)) => {
                log::info!("Connected to {} ({})", url, response.status());
                socket
            }
            Err(e) => {
                log::error!("Connection to {} failed: {}", url, e);
                let _ = events.send(TransportEvent::Error(format!("connection failed: {e}")));
                return;
            }
        };

        let mut worker = Self {
            socket,
            outgoing,
            events,
        };
        worker.set_timeouts();
        let _ = worker.events.send(TransportEvent::Opened);
        worker.pump();
        let _ = worker.events.send(TransportEvent::Closed);
        log::info!("Socket thread for {} finished", url);
    }

    fn set_timeouts(&mut self) {
        // Only plain streams are ever opened; see `connect`.
        if let MaybeTlsStream::Plain(tcp) = self.socket.get_mut() {
            let _ = tcp.set_read_timeout(Some(READ_TIMEOUT));
            let _ = tcp.set_write_timeout(Some(WRITE_TIMEOUT));
        }
    }

    /// Alternate between flushing queued frames and reading, until either
    /// side closes.
    fn pump(&mut self) {
        loop {
            if !self.flush_outgoing() {
                return;
            }
            match self.socket.read() {
                Ok(Message::Text(text)) => {
                    let _ = self.events.send(TransportEvent::Message(text));
                }
                Ok(Message::Close(_)) => return,
                // Pings are answered by tungstenite on the next write.
                Ok(_) => {}
                Err(tungstenite::Error::Io(e))
                    if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {}
                Err(e) => {
                    log::warn!("Socket read failed: {}", e);
                    return;
                }
            }
        }
    }

    /// Send everything queued. Returns false once the socket should stop.
    fn flush_outgoing(&mut self) -> bool {
        loop {
            match self.outgoing.try_recv() {
                Ok(Outgoing::Text(text)) => {
                    if let Err(e) = self.socket.send(Message::Text(text)) {
                        log::warn!("Socket send failed: {}", e);
                        return false;
                    }
                }
                Ok(Outgoing::Close) | Err(TryRecvError::Disconnected) => {
                    let _ = self.socket.close(None);
                    return false;
                }
                Err(TryRecvError::Empty) => return true,
            }
        }
    }
}
