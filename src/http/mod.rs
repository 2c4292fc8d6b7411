mod error;
mod routes;

use std::sync::Arc;

use axum::Router;
use chrono::{DateTime, Utc};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::normalizer::RequestNormalizer;

/// Shared across handlers; immutable after startup.
pub struct AppState {
    pub normalizer: RequestNormalizer,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(normalizer: RequestNormalizer) -> Self {
        Self {
            normalizer,
            started_at: Utc::now(),
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::detect_routes())
        .merge(routes::health_routes())
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
