use sketchroom_core::Storage;
use sketchroom_core::storage::{FileStorage, MemoryStorage};
use sketchroom_server::{AppState, ServerConfig, StaticTokenVerifier};
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let dotenv = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sketchroom_server=info,tower_http=info".into()),
        )
        .init();

    if let Err(e) = dotenv {
        if !e.not_found() {
            warn!("Failed to load .env: {}", e);
        }
    }

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };

    let storage: Arc<dyn Storage> = match &config.data_dir {
        Some(dir) => match FileStorage::new(dir.clone()) {
            Ok(storage) => {
                info!("Persisting rooms to {}", storage.base_path().display());
                Arc::new(storage)
            }
            Err(e) => {
                error!("Failed to open data directory: {}", e);
                return;
            }
        },
        None => {
            info!("No SKETCHROOM_DATA_DIR set, rooms are kept in memory");
            Arc::new(MemoryStorage::new())
        }
    };
    if config.tokens.is_empty() && !config.allow_anonymous {
        warn!("No tokens configured and anonymous access disabled; every connection will be rejected");
    }

    let verifier = Arc::new(StaticTokenVerifier::from_config(&config));
    let state = Arc::new(AppState::new(storage, verifier));

    let listener = match tokio::net::TcpListener::bind(config.addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", config.addr, e);
            return;
        }
    };
    info!("Sketchroom relay server listening on {}", config.addr);
    info!("WebSocket endpoint: ws://{}/ws", config.addr);

    if let Err(e) = axum::serve(listener, sketchroom_server::app(state)).await {
        error!("Server error: {}", e);
    }
}
