use std::sync::Arc;

use badgebridge_application::{BadgeSyncService, LinkAccountService, VerificationApi};
use badgebridge_domain::{Member, MemberId, RoleId, RoleMapping};
use badgebridge_infrastructure::InMemoryMemberDirectory;
use chrono::Utc;

use crate::interaction_signature::InteractionVerifier;
use crate::state::AppState;

pub(crate) const BADGE_ROLE: &str = "500";

pub(crate) fn role(value: &str) -> RoleId {
    RoleId::new(value).unwrap_or_else(|_| panic!("role id '{value}' should be valid"))
}

pub(crate) fn member(id: &str, username: &str) -> Member {
    let Ok(member_id) = MemberId::new(id) else {
        panic!("member id '{id}' should be valid");
    };
    Member::new(member_id, username, username)
}

pub(crate) fn directory(members: Vec<Member>) -> Arc<InMemoryMemberDirectory> {
    Arc::new(InMemoryMemberDirectory::new(members, [role(BADGE_ROLE)]))
}

pub(crate) fn app_state(
    directory: Arc<InMemoryMemberDirectory>,
    verification_api: Option<Arc<dyn VerificationApi>>,
    interaction_verifier: Option<InteractionVerifier>,
    webhook_secret: Option<&str>,
) -> AppState {
    let mapping = Arc::new(RoleMapping::new([("L1".into(), role(BADGE_ROLE))]));

    AppState {
        badge_sync_service: BadgeSyncService::new(directory.clone(), mapping),
        link_account_service: LinkAccountService::new(verification_api),
        directory,
        interaction_verifier: interaction_verifier.map(Arc::new),
        webhook_secret: webhook_secret.map(str::to_owned),
        guild_id: "local".to_owned(),
        directory_provider: "memory",
        started_at: Utc::now(),
    }
}
