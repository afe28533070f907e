pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::recommend::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Endpoint A: heuristic
        .route("/api/v1/recommend", post(handlers::handle_recommend))
        // Endpoint B: generator-backed
        .route("/api/v1/recommend/generate", post(handlers::handle_generate))
        .route("/api/recommand", post(handlers::handle_generate))
        // Share links
        .route("/api/v1/share", get(handlers::handle_share))
        .with_state(state)
}
