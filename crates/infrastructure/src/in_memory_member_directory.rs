use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use badgebridge_application::MemberDirectory;
use badgebridge_core::{AppError, AppResult};
use badgebridge_domain::{Member, MemberId, RoleId};
use tokio::sync::RwLock;
use tracing::info;

/// In-memory member directory for local development and tests.
pub struct InMemoryMemberDirectory {
    members: RwLock<Vec<Member>>,
    roles: RwLock<BTreeSet<RoleId>>,
    ready: AtomicBool,
}

impl InMemoryMemberDirectory {
    /// Creates a ready directory with the given members and roles.
    #[must_use]
    pub fn new(members: Vec<Member>, roles: impl IntoIterator<Item = RoleId>) -> Self {
        Self {
            members: RwLock::new(members),
            roles: RwLock::new(roles.into_iter().collect()),
            ready: AtomicBool::new(true),
        }
    }

    /// Marks the directory ready or offline.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Returns the current copy of one member.
    pub async fn member(&self, member_id: &str) -> Option<Member> {
        self.members
            .read()
            .await
            .iter()
            .find(|member| member.id().as_str() == member_id)
            .cloned()
    }
}

#[async_trait]
impl MemberDirectory for InMemoryMemberDirectory {
    async fn ensure_ready(&self) -> AppResult<()> {
        if self.ready.load(Ordering::SeqCst) {
            return Ok(());
        }

        Err(AppError::Unavailable(
            "in-memory directory is offline".to_owned(),
        ))
    }

    async fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn fetch_member(&self, member_id: &MemberId) -> AppResult<Option<Member>> {
        Ok(self.member(member_id.as_str()).await)
    }

    async fn list_members(&self) -> AppResult<Arc<[Member]>> {
        Ok(self.members.read().await.clone().into())
    }

    async fn role_exists(&self, role_id: &RoleId) -> AppResult<bool> {
        Ok(self.roles.read().await.contains(role_id))
    }

    async fn grant_role(&self, member_id: &MemberId, role_id: &RoleId) -> AppResult<()> {
        if !self.roles.read().await.contains(role_id) {
            return Err(AppError::NotFound(format!("role '{role_id}' does not exist")));
        }

        let mut members = self.members.write().await;
        let member = members
            .iter_mut()
            .find(|member| member.id() == member_id)
            .ok_or_else(|| AppError::NotFound(format!("member '{member_id}' does not exist")))?;

        let mut roles = member.roles().clone();
        roles.insert(role_id.clone());
        *member = member.clone().with_roles(roles);

        info!(member_id = %member_id, role_id = %role_id, "role granted in memory");
        Ok(())
    }

    async fn shutdown(&self) {
        self.set_ready(false);
    }
}
