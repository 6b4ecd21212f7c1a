use std::sync::Arc;
use std::time::Duration;

use badgebridge_application::{
    BadgeSyncService, LinkAccountService, MemberDirectory, VerificationApi,
};
use badgebridge_core::AppError;
use badgebridge_infrastructure::HttpVerificationClient;
use chrono::Utc;
use tracing::info;

use crate::api_config::ApiConfig;
use crate::interaction_signature::InteractionVerifier;
use crate::state::AppState;

use super::build_http_client;

/// Interaction replies are due within three seconds.
const VERIFICATION_TIMEOUT: Duration = Duration::from_millis(2500);

pub fn build_app_state(
    config: &ApiConfig,
    directory: Arc<dyn MemberDirectory>,
) -> Result<AppState, AppError> {
    let verification_api = config
        .verification
        .as_ref()
        .map(|verification| {
            build_http_client(VERIFICATION_TIMEOUT).map(|http_client| {
                Arc::new(HttpVerificationClient::new(
                    http_client,
                    verification.endpoint.clone(),
                    verification.api_key.clone(),
                )) as Arc<dyn VerificationApi>
            })
        })
        .transpose()?;

    let interaction_verifier = config
        .discord_public_key
        .as_deref()
        .map(InteractionVerifier::from_hex)
        .transpose()?
        .map(Arc::new);

    info!(
        mapped_badges = config.badge_role_mapping.len(),
        verification_api = verification_api.is_some(),
        interactions = interaction_verifier.is_some(),
        webhook_secret = config.webhook_secret.is_some(),
        "api services configured"
    );

    Ok(AppState {
        badge_sync_service: BadgeSyncService::new(
            directory.clone(),
            Arc::new(config.badge_role_mapping.clone()),
        ),
        link_account_service: LinkAccountService::new(verification_api),
        directory,
        interaction_verifier,
        webhook_secret: config.webhook_secret.clone(),
        guild_id: config.guild_id.clone(),
        directory_provider: config.directory_provider.as_str(),
        started_at: Utc::now(),
    })
}
