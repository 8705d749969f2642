//! Sketchroom WebSocket Relay Server
//!
//! Relays shape mutations and cursor positions between clients in the same
//! room, keeps a best-effort copy of each room's shapes, and serves it for
//! clients joining later.
//!
//! ## Protocol
//!
//! Messages are JSON text frames tagged by `type`:
//! ```json
//! { "type": "join_room", "roomId": "room-id" }
//! { "type": "cursor_move", "roomId": "room-id", "x": 100, "y": 200 }
//! { "type": "chat", "roomId": "room-id", "message": "{\"type\":\"clear\"}" }
//! ```

pub mod auth;
pub mod config;
pub mod relay;
pub mod state;

use axum::{
    Json, Router,
    extract::{Path, Query, State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use sketchroom_core::shapes::Shape;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, warn};

pub use auth::{Identity, StaticTokenVerifier, TokenVerifier};
pub use config::{ConfigError, ServerConfig};
pub use state::AppState;

/// Build the relay router.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/ws", get(ws_handler))
        .route("/shapes/{room_id}", get(load_shapes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Index page
async fn index() -> &'static str {
    "Sketchroom Relay Server - Connect via WebSocket at /ws"
}

/// Health check
async fn health() -> &'static str {
    "ok"
}

#[derive(Debug, Deserialize)]
struct WsParams {
    token: Option<String>,
}

/// WebSocket upgrade handler
async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsParams>,
    State(state): State<Arc<AppState>>,
) -> Response {
    match state.verifier.verify(params.token.as_deref()) {
        Some(identity) => ws
            .on_upgrade(move |socket| relay::handle_socket(socket, state, identity))
            .into_response(),
        None => {
            warn!("Rejected WebSocket upgrade with unknown token");
            (StatusCode::UNAUTHORIZED, "invalid token").into_response()
        }
    }
}

#[derive(Debug, Serialize)]
struct ShapesResponse {
    shapes: Vec<Shape>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    message: String,
}

/// Persisted shapes of a room.
async fn load_shapes(
    Path(room_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Response {
    match state.storage.load_shapes(&room_id).await {
        Ok(shapes) => Json(ShapesResponse { shapes }).into_response(),
        Err(e) => {
            error!("Failed to load room {}: {}", room_id, e);
            let body = ErrorResponse {
                message: e.to_string(),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}
