//! Scoring service — Axum HTTP server.
//!
//! Exposes `/predict`, `/health` and `/model/reload`.
//! CORS enabled so browser dashboards can call it directly.

pub mod error;
pub mod routes;

use anyhow::{Context, Result};
use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

pub use error::ApiError;
pub use routes::{AppState, ServiceState};

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/predict", post(routes::predict))
        .route("/health", get(routes::health))
        .route("/model/reload", post(routes::reload))
        .layer(cors)
        .with_state(state)
}

/// Serve until Ctrl+C.
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "Scoring service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Scoring server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received.");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
