/// Application routes configuration
use crate::handlers::{health, identifiers, summary, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Build the application router with all routes
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health))
        // Catalog queries
        .route("/summary", post(summary))
        .route("/identifiers", post(identifiers))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
