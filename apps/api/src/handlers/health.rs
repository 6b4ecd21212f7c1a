use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::Utc;

use crate::dto::{HealthResponse, StatusResponse};
use crate::state::AppState;

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn status_handler(State(state): State<AppState>) -> (StatusCode, Json<StatusResponse>) {
    let directory_ready = state.directory.is_ready().await;
    let (http_status, status) = if directory_ready {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        http_status,
        Json(StatusResponse {
            status,
            directory_ready,
            directory_provider: state.directory_provider.to_owned(),
            guild_id: state.guild_id.clone(),
            guild_name: state.directory.community_name().await,
            mapped_badges: state
                .badge_sync_service
                .mapping()
                .badge_codes()
                .map(|badge| badge.as_str().to_owned())
                .collect(),
            link_account_enabled: state.interaction_verifier.is_some()
                && state.link_account_service.is_configured(),
            started_at: state.started_at.to_rfc3339(),
            uptime_seconds: (Utc::now() - state.started_at).num_seconds().max(0),
        }),
    )
}
