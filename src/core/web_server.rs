//! Health-check web server.
//!
//! Hosting platforms probe `/` (or `/health`) to decide whether the service is
//! alive; the keep-alive pinger hits the same routes from outside.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::download::cookies::CookieProvider;
use crate::download::pool::WorkerPool;
use crate::download::token_store::TokenStore;

/// Shared state for the web server.
#[derive(Clone)]
pub struct HealthState {
    pub tokens: Arc<dyn TokenStore>,
    pub pool: WorkerPool,
    pub cookies: CookieProvider,
}

#[derive(Debug, Serialize)]
struct HealthReport {
    status: &'static str,
    pending_tokens: usize,
    free_workers: usize,
    cookies: bool,
}

/// Builds the router; split out so tests can drive it without a socket.
pub fn router(state: HealthState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Start the health-check web server.
pub async fn start_web_server(port: u16, state: HealthState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    log::info!("Starting web server on http://{}", addr);
    log::info!("  /        - Liveness (text)");
    log::info!("  /health  - Health check (JSON)");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}

/// GET / answers with plain text.
async fn root_handler() -> impl IntoResponse {
    (StatusCode::OK, "tubegrab is running")
}

/// GET /health returns a JSON snapshot of the workflow state.
async fn health_handler(State(state): State<HealthState>) -> impl IntoResponse {
    let report = HealthReport {
        status: "ok",
        pending_tokens: state.tokens.len(),
        free_workers: state.pool.available(),
        cookies: state.cookies.global_available(),
    };
    (StatusCode::OK, Json(report))
}
