use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::domain::{DetectError, DetectionRequest, DetectionResponse};

use super::AppState;

pub fn detect_routes() -> Router<Arc<AppState>> {
    Router::new().route("/detect", post(detect))
}

pub fn health_routes() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}

async fn detect(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DetectionRequest>,
) -> Result<Json<DetectionResponse>, DetectError> {
    let response = state.normalizer.detect(req).await?;
    Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    started_at: String,
    uptime_secs: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let now = chrono::Utc::now();
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        started_at: state.started_at.to_rfc3339(),
        uptime_secs: (now - state.started_at).num_seconds().max(0),
    })
}
