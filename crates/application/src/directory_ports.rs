use std::sync::Arc;

use async_trait::async_trait;
use badgebridge_core::AppResult;
use badgebridge_domain::{Member, MemberId, RoleId};

/// Port over the remote community membership directory.
///
/// The directory is the source of truth for members and roles; callers never
/// keep member state beyond one request.
#[async_trait]
pub trait MemberDirectory: Send + Sync {
    /// Confirms the handle is connected and the community is reachable.
    ///
    /// Returns `AppError::Unavailable` when requests cannot be served.
    async fn ensure_ready(&self) -> AppResult<()>;

    /// Reports readiness without attempting to connect.
    async fn is_ready(&self) -> bool;

    /// Name of the connected community, when the directory knows it.
    async fn community_name(&self) -> Option<String> {
        None
    }

    /// Fetches one member by stable identifier. `Ok(None)` when the member is unknown.
    async fn fetch_member(&self, member_id: &MemberId) -> AppResult<Option<Member>>;

    /// Returns the full member listing in directory order.
    ///
    /// Implementations may serve a shared snapshot; a stale snapshot is
    /// replaced by a full re-fetch, never patched.
    async fn list_members(&self) -> AppResult<Arc<[Member]>>;

    /// Returns whether the role exists in the community.
    async fn role_exists(&self, role_id: &RoleId) -> AppResult<bool>;

    /// Grants one role to one member. Granting a held role is not an error.
    async fn grant_role(&self, member_id: &MemberId, role_id: &RoleId) -> AppResult<()>;

    /// Releases the connection and any cached roster.
    async fn shutdown(&self) {}
}
