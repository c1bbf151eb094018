//! HTTP server implementation using Axum.

use crate::handler::{
    handle_constellation, handle_health, handle_not_found, handle_region, handle_shortcuts,
    handle_system, handle_type,
};
use axum::{routing::get, Router};
use eve_guess::Guesser;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Application state shared across handlers.
pub struct AppState {
    pub guesser: Guesser,
}

/// Build the router over an already constructed guesser.
pub fn router(guesser: Guesser) -> Router {
    let state = Arc::new(AppState { guesser });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/shortcuts", get(handle_shortcuts))
        .route("/type", get(handle_type))
        .route("/item", get(handle_type))
        .route("/system", get(handle_system))
        .route("/constellation", get(handle_constellation))
        .route("/region", get(handle_region))
        .fallback(handle_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server.
///
/// Returns the actual address the server is bound to (useful when port=0).
pub async fn start_server(guesser: Guesser, host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    let app = router(guesser);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!("Server listening on {}", actual_addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Server error: {}", e);
        }
    });

    Ok(actual_addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_server_starts() {
        let temp_dir = TempDir::new().unwrap();
        let guesser = Guesser::builder().data_dir(temp_dir.path()).build().unwrap();

        let addr = start_server(guesser, "127.0.0.1", 0).await.unwrap();
        assert!(addr.port() > 0);
    }

    #[tokio::test]
    async fn test_bad_host_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let guesser = Guesser::builder().data_dir(temp_dir.path()).build().unwrap();

        assert!(start_server(guesser, "not a host", 0).await.is_err());
    }
}
