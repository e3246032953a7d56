// Presentation layer - Renderer board and JSON read API
pub mod app_state;
pub mod handlers;
pub mod snapshot_board;
pub mod views;

use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{feed_snapshot, health_check, list_feeds};
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Read API routes over the snapshot board.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/feeds", get(list_feeds))
        .route("/feeds/:name", get(feed_snapshot))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
