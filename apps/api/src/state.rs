use std::sync::Arc;

use badgebridge_application::{BadgeSyncService, LinkAccountService, MemberDirectory};
use chrono::{DateTime, Utc};

use crate::interaction_signature::InteractionVerifier;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub badge_sync_service: BadgeSyncService,
    pub link_account_service: LinkAccountService,
    pub directory: Arc<dyn MemberDirectory>,
    pub interaction_verifier: Option<Arc<InteractionVerifier>>,
    pub webhook_secret: Option<String>,
    pub guild_id: String,
    pub directory_provider: &'static str,
    pub started_at: DateTime<Utc>,
}
