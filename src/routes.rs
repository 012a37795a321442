use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::handlers::{health_check, index, status, submit};
use crate::state::AppState;

pub fn create_routes() -> Router<AppState> {
    Router::new()
        // Form page
        .route("/", get(index).post(submit))

        // Health check
        .route("/api/health", get(health_check))
        .route("/api/status", get(status))

        .layer(TraceLayer::new_for_http())
}
