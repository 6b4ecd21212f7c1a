use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use badgebridge_core::{AppError, AppResult};
use badgebridge_domain::{Member, MemberId, RoleId};
use tokio::sync::Mutex;

use crate::MemberDirectory;

pub(crate) fn member(id: &str, username: &str, display_name: &str) -> Member {
    let Ok(member_id) = MemberId::new(id) else {
        panic!("fixture member id '{id}' should be valid");
    };
    Member::new(member_id, username, display_name)
}

pub(crate) fn role(id: &str) -> RoleId {
    let Ok(role_id) = RoleId::new(id) else {
        panic!("fixture role id '{id}' should be valid");
    };
    role_id
}

pub(crate) struct FakeMemberDirectory {
    members: Mutex<Vec<Member>>,
    frozen_listing: Mutex<Option<Vec<Member>>>,
    roles: Mutex<BTreeSet<RoleId>>,
    failing_fetches: Mutex<HashSet<String>>,
    failing_grants: Mutex<HashSet<String>>,
    ready: Mutex<bool>,
    failing_listing: Mutex<bool>,
    grant_calls: Mutex<Vec<(String, String)>>,
    list_calls: Mutex<usize>,
}

impl FakeMemberDirectory {
    pub(crate) fn with_members(members: Vec<Member>) -> Self {
        Self {
            members: Mutex::new(members),
            frozen_listing: Mutex::new(None),
            roles: Mutex::new(BTreeSet::new()),
            failing_fetches: Mutex::new(HashSet::new()),
            failing_grants: Mutex::new(HashSet::new()),
            ready: Mutex::new(true),
            failing_listing: Mutex::new(false),
            grant_calls: Mutex::new(Vec::new()),
            list_calls: Mutex::new(0),
        }
    }

    pub(crate) async fn add_role(&self, role_id: &str) {
        self.roles.lock().await.insert(role(role_id));
    }

    pub(crate) async fn fail_fetch_for(&self, member_id: &str) {
        self.failing_fetches
            .lock()
            .await
            .insert(member_id.to_owned());
    }

    pub(crate) async fn fail_grant_for(&self, role_id: &str) {
        self.failing_grants.lock().await.insert(role_id.to_owned());
    }

    /// Makes the listing fail the way Discord answers a revoked bot token.
    pub(crate) async fn fail_listing(&self) {
        *self.failing_listing.lock().await = true;
    }

    pub(crate) async fn set_ready(&self, ready: bool) {
        *self.ready.lock().await = ready;
    }

    /// Freezes the listing so later role changes only show up through fetches.
    pub(crate) async fn stale_listing(&self) {
        let members = self.members.lock().await.clone();
        *self.frozen_listing.lock().await = Some(members);
    }

    pub(crate) async fn grant_directly(&self, member_id: &str, role_id: &str) -> bool {
        let mut members = self.members.lock().await;
        let Some(position) = members
            .iter()
            .position(|member| member.id().as_str() == member_id)
        else {
            return false;
        };

        let mut roles: Vec<RoleId> = members[position].roles().iter().cloned().collect();
        roles.push(role(role_id));
        members[position] = members[position].clone().with_roles(roles);
        true
    }

    pub(crate) async fn grant_calls(&self) -> Vec<(String, String)> {
        self.grant_calls.lock().await.clone()
    }

    pub(crate) async fn list_calls(&self) -> usize {
        *self.list_calls.lock().await
    }
}

#[async_trait]
impl MemberDirectory for FakeMemberDirectory {
    async fn ensure_ready(&self) -> AppResult<()> {
        if *self.ready.lock().await {
            return Ok(());
        }

        Err(AppError::Unavailable("fake directory is offline".to_owned()))
    }

    async fn is_ready(&self) -> bool {
        *self.ready.lock().await
    }

    async fn fetch_member(&self, member_id: &MemberId) -> AppResult<Option<Member>> {
        if self
            .failing_fetches
            .lock()
            .await
            .contains(member_id.as_str())
        {
            return Err(AppError::Internal(format!(
                "fetch of member '{member_id}' failed"
            )));
        }

        Ok(self
            .members
            .lock()
            .await
            .iter()
            .find(|member| member.id() == member_id)
            .cloned())
    }

    async fn list_members(&self) -> AppResult<Arc<[Member]>> {
        *self.list_calls.lock().await += 1;

        if *self.failing_listing.lock().await {
            return Err(AppError::Unauthorized(
                "list members failed with status 401 Unauthorized".to_owned(),
            ));
        }

        if let Some(frozen) = self.frozen_listing.lock().await.clone() {
            return Ok(frozen.into());
        }

        Ok(self.members.lock().await.clone().into())
    }

    async fn role_exists(&self, role_id: &RoleId) -> AppResult<bool> {
        Ok(self.roles.lock().await.contains(role_id))
    }

    async fn grant_role(&self, member_id: &MemberId, role_id: &RoleId) -> AppResult<()> {
        self.grant_calls
            .lock()
            .await
            .push((member_id.as_str().to_owned(), role_id.as_str().to_owned()));

        if self.failing_grants.lock().await.contains(role_id.as_str()) {
            return Err(AppError::Forbidden(format!(
                "missing permission to grant role '{role_id}'"
            )));
        }

        if self
            .grant_directly(member_id.as_str(), role_id.as_str())
            .await
        {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("member '{member_id}' left")))
        }
    }
}
