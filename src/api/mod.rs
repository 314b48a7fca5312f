//! REST API for one-shot sizing calculations.
//!
//! Provides three endpoints:
//! - `POST /calculate` — per-scenario sizing and financial analysis
//! - `POST /combined` — multi-module combined evaluation
//! - `GET /scenarios` — supported scenario types

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use crate::config::EngineConfig;

/// Immutable application state shared across all request handlers.
///
/// The engine is pure, so the state is just the configuration — wrapped in
/// `Arc` with no locks, since nothing mutates after startup.
pub struct AppState {
    /// Engine configuration used for every request.
    pub config: EngineConfig,
}

/// Builds the axum router with all API routes.
///
/// # Arguments
///
/// * `state` - Shared application state
///
/// # Returns
///
/// Configured `Router` ready to serve.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/calculate", post(handlers::post_calculate))
        .route("/combined", post(handlers::post_combined))
        .route("/scenarios", get(handlers::get_scenarios))
        .with_state(state)
}

/// Binds to the given address and serves the API.
///
/// # Arguments
///
/// * `state` - Shared application state
/// * `addr` - Socket address to bind to
///
/// # Panics
///
/// Panics if the TCP listener cannot bind to `addr`.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind to {addr}: {e}"));
    eprintln!("API server listening on http://{addr}");
    axum::serve(listener, app)
        .await
        .unwrap_or_else(|e| panic!("server error: {e}"));
}
