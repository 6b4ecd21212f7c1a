use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use badgebridge_application::LinkAccountInput;
use badgebridge_core::AppError;
use tracing::{info, warn};

use crate::dto::{
    INTERACTION_APPLICATION_COMMAND, INTERACTION_PING, InteractionRequest, InteractionResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub const SIGNATURE_HEADER: &str = "x-signature-ed25519";
pub const TIMESTAMP_HEADER: &str = "x-signature-timestamp";

const LINK_ACCOUNT_COMMAND: &str = "link-account";
const CODE_OPTION: &str = "code";
const UNKNOWN_COMMAND_MESSAGE: &str = "Unknown command.";
const NO_USER_MESSAGE: &str = "Could not identify your account. Please try again.";

/// Signed interactions endpoint for Discord slash commands.
pub async fn interactions_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<InteractionResponse>> {
    let Some(verifier) = state.interaction_verifier.as_ref() else {
        return Err(AppError::NotFound("interactions endpoint is not configured".to_owned()).into());
    };

    let signature = header_value(&headers, SIGNATURE_HEADER)?;
    let timestamp = header_value(&headers, TIMESTAMP_HEADER)?;
    verifier.verify(signature, timestamp, &body)?;

    let interaction: InteractionRequest = serde_json::from_slice(&body)
        .map_err(|error| AppError::Validation(format!("invalid interaction payload: {error}")))?;

    match interaction.kind {
        INTERACTION_PING => Ok(Json(InteractionResponse::pong())),
        INTERACTION_APPLICATION_COMMAND => Ok(Json(handle_command(&state, &interaction).await)),
        other => Err(AppError::Validation(format!("unsupported interaction type {other}")).into()),
    }
}

async fn handle_command(state: &AppState, interaction: &InteractionRequest) -> InteractionResponse {
    let Some(data) = interaction.data.as_ref() else {
        return InteractionResponse::ephemeral(UNKNOWN_COMMAND_MESSAGE);
    };

    if data.name != LINK_ACCOUNT_COMMAND {
        info!(command = %data.name, "unknown slash command");
        return InteractionResponse::ephemeral(UNKNOWN_COMMAND_MESSAGE);
    }

    let Some(user) = interaction.invoking_user() else {
        warn!("link-account interaction without an invoking user");
        return InteractionResponse::ephemeral(NO_USER_MESSAGE);
    };

    let reply = state
        .link_account_service
        .link_account(LinkAccountInput {
            code: data.string_option(CODE_OPTION).unwrap_or_default().to_owned(),
            member_id: user.id.clone(),
            username: user.username.clone(),
        })
        .await;

    InteractionResponse::ephemeral(reply.message)
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, AppError> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized(format!("missing {name} header")))
}
