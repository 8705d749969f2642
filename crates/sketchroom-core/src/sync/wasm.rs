//! Browser `WebSocket` transport.

use super::{ConnectionState, Transport, TransportError, TransportEvent};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CloseEvent, ErrorEvent, MessageEvent, WebSocket};

type EventQueue = Rc<RefCell<Vec<TransportEvent>>>;

/// JS callbacks registered on the socket. Must outlive it.
struct Callbacks {
    _open: Closure<dyn Fn()>,
    _message: Closure<dyn Fn(MessageEvent)>,
    _close: Closure<dyn Fn(CloseEvent)>,
    _error: Closure<dyn Fn(ErrorEvent)>,
}

impl Callbacks {
    fn attach(ws: &WebSocket, queue: &EventQueue) -> Self {
        let q = queue.clone();
        let open = Closure::<dyn Fn()>::new(move || q.borrow_mut().push(TransportEvent::Opened));
        ws.set_onopen(Some(open.as_ref().unchecked_ref()));

        let q = queue.clone();
        let message = Closure::<dyn Fn(MessageEvent)>::new(move |e: MessageEvent| {
            if let Some(text) = e.data().as_string() {
                q.borrow_mut().push(TransportEvent::Message(text));
            }
        });
        ws.set_onmessage(Some(message.as_ref().unchecked_ref()));

        let q = queue.clone();
        let close = Closure::<dyn Fn(CloseEvent)>::new(move |_e: CloseEvent| {
            q.borrow_mut().push(TransportEvent::Closed)
        });
        ws.set_onclose(Some(close.as_ref().unchecked_ref()));

        let q = queue.clone();
        let error = Closure::<dyn Fn(ErrorEvent)>::new(move |e: ErrorEvent| {
            q.borrow_mut().push(TransportEvent::Error(e.message()))
        });
        ws.set_onerror(Some(error.as_ref().unchecked_ref()));

        Self {
            _open: open,
            _message: message,
            _close: close,
            _error: error,
        }
    }
}

/// WebSocket client for WASM.
///
/// Browser callbacks push into a shared queue drained by `poll_events()`.
#[derive(Default)]
pub struct WasmWebSocket {
    socket: Option<(WebSocket, Callbacks)>,
    queue: EventQueue,
    state: ConnectionState,
}

impl WasmWebSocket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a socket to `url`.
    pub fn connect(&mut self, url: &str) -> Result<(), TransportError> {
        if self.socket.is_some() {
            return Err(TransportError::AlreadyConnected);
        }
        let ws = WebSocket::new(url).map_err(|e| TransportError::Connect(format!("{:?}", e)))?;
        let callbacks = Callbacks::attach(&ws, &self.queue);
        self.socket = Some((ws, callbacks));
        self.state = ConnectionState::Connecting;
        Ok(())
    }

    pub fn disconnect(&mut self) {
        if let Some((ws, _callbacks)) = self.socket.take() {
            ws.set_onopen(None);
            ws.set_onmessage(None);
            ws.set_onclose(None);
            ws.set_onerror(None);
            let _ = ws.close();
        }
        self.state = ConnectionState::Disconnected;
    }
}

impl Transport for WasmWebSocket {
    fn send_text(&mut self, text: &str) -> Result<(), TransportError> {
        let (ws, _) = self.socket.as_ref().ok_or(TransportError::NotConnected)?;
        ws.send_with_str(text)
            .map_err(|e| TransportError::Send(format!("{:?}", e)))
    }

    fn poll_events(&mut self) -> Vec<TransportEvent> {
        let events = std::mem::take(&mut *self.queue.borrow_mut());
        for event in &events {
            self.state = self.state.after(event);
        }
        events
    }

    fn state(&self) -> ConnectionState {
        self.state
    }
}
