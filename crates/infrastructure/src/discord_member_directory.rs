use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use badgebridge_application::MemberDirectory;
use badgebridge_core::{AppError, AppResult};
use badgebridge_domain::{Member, MemberId, RoleId};
use reqwest::header::CONTENT_LENGTH;
use reqwest::{Method, StatusCode};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::discord_rest_client::status_error;
use crate::snapshot_cache::SnapshotCache;
use crate::DiscordRestClient;

use self::payloads::{DiscordGuildPayload, DiscordMemberPayload, DiscordRolePayload};

mod payloads;

const MEMBER_PAGE_SIZE: usize = 1000;
const GRANT_AUDIT_REASON: &str = "Badge earned on the badge platform";

/// Settings for the guild the directory serves.
#[derive(Debug, Clone)]
pub struct DiscordDirectoryConfig {
    /// The single guild served by this deployment.
    pub guild_id: String,
    /// Lifetime of the roster and role snapshots. Zero disables caching.
    pub roster_ttl: Duration,
}

#[derive(Debug, Clone)]
struct ConnectedGuild {
    name: String,
}

/// Member directory backed by the Discord guild REST API.
///
/// Lifecycle: `connect` → ready → serve → `shutdown`. `ensure_ready`
/// connects lazily when the handle is not ready yet.
pub struct DiscordMemberDirectory {
    rest: DiscordRestClient,
    guild_id: String,
    connection: RwLock<Option<ConnectedGuild>>,
    roster: SnapshotCache<[Member]>,
    roles: SnapshotCache<BTreeSet<RoleId>>,
}

impl DiscordMemberDirectory {
    /// Creates a disconnected directory handle.
    #[must_use]
    pub fn new(rest: DiscordRestClient, config: DiscordDirectoryConfig) -> Self {
        Self {
            rest,
            guild_id: config.guild_id,
            connection: RwLock::new(None),
            roster: SnapshotCache::new(config.roster_ttl),
            roles: SnapshotCache::new(config.roster_ttl),
        }
    }

    /// Verifies the token and guild, then marks the handle ready.
    pub async fn connect(&self) -> AppResult<()> {
        let path = format!("/guilds/{}", self.guild_id);
        let response = self
            .rest
            .send("fetch guild", |rest| rest.request(Method::GET, path.as_str()))
            .await?;

        if !response.status().is_success() {
            let error = status_error("fetch guild", response).await;
            return Err(AppError::Unavailable(format!(
                "guild '{}' is not reachable: {error}",
                self.guild_id
            )));
        }

        let guild = response
            .json::<DiscordGuildPayload>()
            .await
            .map_err(|error| AppError::Internal(format!("invalid guild payload: {error}")))?;

        info!(guild_id = %guild.id, guild_name = %guild.name, "discord directory ready");
        *self.connection.write().await = Some(ConnectedGuild { name: guild.name });
        Ok(())
    }

    async fn fetch_roster(&self) -> AppResult<Arc<[Member]>> {
        let mut members = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let mut path = format!(
                "/guilds/{}/members?limit={MEMBER_PAGE_SIZE}",
                self.guild_id
            );
            if let Some(after) = &after {
                path.push_str("&after=");
                path.push_str(after);
            }

            let response = self
                .rest
                .send("list members", |rest| rest.request(Method::GET, path.as_str()))
                .await?;
            if !response.status().is_success() {
                return Err(status_error("list members", response).await);
            }

            let page = response
                .json::<Vec<DiscordMemberPayload>>()
                .await
                .map_err(|error| {
                    AppError::Internal(format!("invalid member listing payload: {error}"))
                })?;
            let page_len = page.len();
            after = page.last().and_then(DiscordMemberPayload::user_id);
            members.extend(page.into_iter().filter_map(DiscordMemberPayload::into_member));

            if page_len < MEMBER_PAGE_SIZE || after.is_none() {
                break;
            }
        }

        info!(
            guild_id = %self.guild_id,
            member_count = members.len(),
            "guild roster fetched"
        );
        Ok(members.into())
    }

    async fn fetch_roles(&self) -> AppResult<Arc<BTreeSet<RoleId>>> {
        let path = format!("/guilds/{}/roles", self.guild_id);
        let response = self
            .rest
            .send("list roles", |rest| rest.request(Method::GET, path.as_str()))
            .await?;
        if !response.status().is_success() {
            return Err(status_error("list roles", response).await);
        }

        let roles = response
            .json::<Vec<DiscordRolePayload>>()
            .await
            .map_err(|error| AppError::Internal(format!("invalid role payload: {error}")))?;

        Ok(Arc::new(
            roles
                .into_iter()
                .filter_map(|role| RoleId::new(role.id).ok())
                .collect(),
        ))
    }
}

#[async_trait]
impl MemberDirectory for DiscordMemberDirectory {
    async fn ensure_ready(&self) -> AppResult<()> {
        if self.connection.read().await.is_some() {
            return Ok(());
        }

        self.connect().await.map_err(|error| match error {
            AppError::Unavailable(_) => error,
            other => AppError::Unavailable(other.to_string()),
        })
    }

    async fn is_ready(&self) -> bool {
        self.connection.read().await.is_some()
    }

    async fn community_name(&self) -> Option<String> {
        self.connection
            .read()
            .await
            .as_ref()
            .map(|guild| guild.name.clone())
    }

    async fn fetch_member(&self, member_id: &MemberId) -> AppResult<Option<Member>> {
        let Some(member_id) = snowflake(member_id.as_str()) else {
            debug!(member_id = %member_id, "member id is not a discord snowflake");
            return Ok(None);
        };

        let path = format!("/guilds/{}/members/{member_id}", self.guild_id);
        let response = self
            .rest
            .send("fetch member", |rest| rest.request(Method::GET, path.as_str()))
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let member = response
                    .json::<DiscordMemberPayload>()
                    .await
                    .map_err(|error| {
                        AppError::Internal(format!("invalid member payload: {error}"))
                    })?;
                Ok(member.into_member())
            }
            _ => Err(status_error("fetch member", response).await),
        }
    }

    async fn list_members(&self) -> AppResult<Arc<[Member]>> {
        self.roster.get_or_refresh(|| self.fetch_roster()).await
    }

    async fn role_exists(&self, role_id: &RoleId) -> AppResult<bool> {
        let roles = self.roles.get_or_refresh(|| self.fetch_roles()).await?;
        if roles.contains(role_id) {
            return Ok(true);
        }

        // A miss may be a role created after the snapshot was taken.
        let roles = self.roles.refresh(|| self.fetch_roles()).await?;
        Ok(roles.contains(role_id))
    }

    async fn grant_role(&self, member_id: &MemberId, role_id: &RoleId) -> AppResult<()> {
        let (Some(member_snowflake), Some(role_snowflake)) =
            (snowflake(member_id.as_str()), snowflake(role_id.as_str()))
        else {
            return Err(AppError::Validation(format!(
                "cannot grant role '{role_id}' to member '{member_id}': ids must be discord snowflakes"
            )));
        };

        let path = format!(
            "/guilds/{}/members/{member_snowflake}/roles/{role_snowflake}",
            self.guild_id
        );
        let response = self
            .rest
            .send("grant role", |rest| {
                rest.request(Method::PUT, path.as_str())
                    .header(CONTENT_LENGTH, "0")
                    .header("X-Audit-Log-Reason", GRANT_AUDIT_REASON)
            })
            .await?;

        if response.status().is_success() {
            info!(member_id = %member_id, role_id = %role_id, "role granted");
            return Ok(());
        }

        let error = status_error("grant role", response).await;
        warn!(
            member_id = %member_id,
            role_id = %role_id,
            error = %error,
            "role grant rejected"
        );
        Err(error)
    }

    async fn shutdown(&self) {
        self.connection.write().await.take();
        self.roster.clear().await;
        self.roles.clear().await;
        info!(guild_id = %self.guild_id, "discord directory shut down");
    }
}

/// Discord ids are decimal snowflakes; nothing else is placed in a URL path.
fn snowflake(id: &str) -> Option<&str> {
    (!id.is_empty() && id.bytes().all(|byte| byte.is_ascii_digit())).then_some(id)
}
