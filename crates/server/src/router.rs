//! HTTP router construction.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api;
use crate::state::AppState;

/// Build the application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(api::root))
        .route("/api/stock", get(api::stock))
        .route("/api/consume", get(api::consume))
        .route("/api/historico", get(api::historico))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
