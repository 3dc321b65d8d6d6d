use super::handlers;
use super::state::AppState;
use axum::{routing::get, Router};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState, assets_path: &str) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Peer connections
        .route("/ws", get(handlers::ws_upgrade))
        // Static viewer assets
        .fallback_service(ServeDir::new(assets_path))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
