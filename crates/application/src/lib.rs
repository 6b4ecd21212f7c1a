//! Application services and ports.

#![forbid(unsafe_code)]

mod badge_sync_service;
mod directory_ports;
mod link_account_service;
mod member_resolver;
mod role_reconciler;
mod verification_ports;

#[cfg(test)]
mod fake_directory;

pub use badge_sync_service::{BadgeSyncRequest, BadgeSyncService};
pub use directory_ports::MemberDirectory;
pub use link_account_service::{
    LINK_CODE_MAX_LENGTH, LinkAccountInput, LinkAccountReply, LinkAccountService,
};
pub use member_resolver::{MemberResolver, Resolution, ResolutionStrategy};
pub use role_reconciler::RoleReconciler;
pub use verification_ports::{VerificationApi, VerificationRequest, VerificationResult};
