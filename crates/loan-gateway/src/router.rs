use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::state::AppState;

/// Build the axum router with all gateway endpoints.
pub fn build_router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route("/v1/info", get(handler::info_handler))
        .route("/v1/operations", get(handler::operations_handler))
        .route("/v1/invoke", post(handler::invoke_handler))
        .route(
            "/api/:function",
            get(handler::named_query_handler).post(handler::named_body_handler),
        )
        .route("/api/:app/:view", get(handler::join_handler))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
