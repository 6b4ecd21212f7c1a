use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/status", get(handlers::health::status_handler))
        .route(
            "/webhook/badge-obtained",
            post(handlers::badges::badge_obtained_handler),
        )
        .route(
            "/interactions",
            post(handlers::interactions::interactions_handler),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
