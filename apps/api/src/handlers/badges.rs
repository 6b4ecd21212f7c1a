use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, StatusCode};
use badgebridge_core::AppError;
use subtle::ConstantTimeEq;
use tracing::{error, warn};

use crate::dto::{BadgeObtainedRequest, SyncResponse};
use crate::error::status_code;
use crate::state::AppState;

/// Header carrying the shared secret of the badge platform.
pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

const UNEXPECTED_FAILURE_MESSAGE: &str = "unexpected failure while syncing badges";

/// Grants the roles owed for a badge-earned event.
///
/// Every outcome, including rejected payloads, is answered with a
/// `SyncResponse` body.
pub async fn badge_obtained_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<BadgeObtainedRequest>, JsonRejection>,
) -> (StatusCode, Json<SyncResponse>) {
    if let Err(error) = check_webhook_secret(state.webhook_secret.as_deref(), &headers) {
        warn!("badge event rejected: webhook secret mismatch");
        return failure(error);
    }

    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!(reason = %rejection.body_text(), "badge event rejected: malformed payload");
            return failure(AppError::Validation(format!(
                "malformed badge event: {}",
                rejection.body_text()
            )));
        }
    };

    match state
        .badge_sync_service
        .sync_badges(payload.into_sync_request())
        .await
    {
        Ok(summary) => (StatusCode::OK, Json(SyncResponse::from(&summary))),
        Err(AppError::Internal(detail)) => {
            error!(%detail, "badge sync failed unexpectedly");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SyncResponse::failure(UNEXPECTED_FAILURE_MESSAGE)),
            )
        }
        Err(error) => {
            warn!(error = %error, "badge sync failed");
            failure(error)
        }
    }
}

fn check_webhook_secret(expected: Option<&str>, headers: &HeaderMap) -> Result<(), AppError> {
    let Some(expected) = expected else {
        return Ok(());
    };

    let provided = headers
        .get(WEBHOOK_SECRET_HEADER)
        .map(|value| value.as_bytes())
        .unwrap_or_default();
    if bool::from(provided.ct_eq(expected.as_bytes())) {
        return Ok(());
    }

    Err(AppError::Unauthorized(
        "missing or invalid webhook secret".to_owned(),
    ))
}

fn failure(error: AppError) -> (StatusCode, Json<SyncResponse>) {
    (
        status_code(&error),
        Json(SyncResponse::failure(error.to_string())),
    )
}
