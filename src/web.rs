use std::{sync::Arc, time::Duration};

use axum::{Json, Router, extract::State, routing::get};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::checker::run_check;
use crate::parser::ConnectionTarget;
use crate::probe_result::Summary;

/// Per-process state. The target is parsed once at startup; every check
/// request builds a fresh summary from it, nothing is cached between requests.
#[derive(Clone)]
pub struct AppState {
    pub target: Arc<ConnectionTarget>,
    pub timeout: Duration,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/check", get(check_handler))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(state)
}

pub async fn serve(port: u16, state: AppState) -> anyhow::Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    info!("web service listening on http://0.0.0.0:{port}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn root_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "service": "vlessprobe",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "target": state.target.endpoint(),
    }))
}

/// Liveness only. Never runs probes, so it answers immediately even when the
/// configured target is unreachable.
async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now(),
    }))
}

/// Runs the full probe sequence, fresh on every invocation.
async fn check_handler(State(state): State<AppState>) -> Json<Summary> {
    Json(run_check(&state.target, state.timeout).await)
}
