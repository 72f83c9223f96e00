//! Router construction

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::api::handlers::{handle_skill, AppState};

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/chatgpt", post(handle_skill))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
