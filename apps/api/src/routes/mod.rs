pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::notes::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Notes API
        .route("/api/notes", post(handlers::handle_generate_notes))
        .route("/api/notes/markdown", post(handlers::handle_markdown))
        // Insights API
        .route("/api/guidance", post(handlers::handle_guidance))
        .route("/api/insights", post(handlers::handle_insights))
        .with_state(state)
}
