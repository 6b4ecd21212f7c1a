use std::sync::Arc;

use badgebridge_core::{AppError, AppResult};
use badgebridge_domain::{BadgeCode, IdentityHint, RoleMapping, SyncSummary};
use tracing::{info, warn};

use crate::{MemberDirectory, MemberResolver, RoleReconciler};

/// Inbound request to grant the roles owed for earned badges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BadgeSyncRequest {
    /// Who earned the badges.
    pub hint: IdentityHint,
    /// Badge codes in the order received. Duplicates are kept.
    pub badges: Vec<BadgeCode>,
}

/// Runs resolve, reconcile and summarize as one sequential pipeline.
#[derive(Clone)]
pub struct BadgeSyncService {
    directory: Arc<dyn MemberDirectory>,
    resolver: MemberResolver,
    reconciler: RoleReconciler,
    mapping: Arc<RoleMapping>,
}

impl BadgeSyncService {
    /// Creates the sync pipeline over one directory handle and mapping table.
    #[must_use]
    pub fn new(directory: Arc<dyn MemberDirectory>, mapping: Arc<RoleMapping>) -> Self {
        Self {
            resolver: MemberResolver::new(directory.clone()),
            reconciler: RoleReconciler::new(directory.clone()),
            directory,
            mapping,
        }
    }

    /// Returns the badge to role mapping in use.
    #[must_use]
    pub fn mapping(&self) -> &RoleMapping {
        self.mapping.as_ref()
    }

    /// Grants the roles owed for the request's badges.
    ///
    /// Fails with `Unavailable` before any lookup when the directory is not
    /// ready, and with `NotFound` when no member matches the hint. Per-badge
    /// failures are reported inside the summary.
    pub async fn sync_badges(&self, request: BadgeSyncRequest) -> AppResult<SyncSummary> {
        self.directory
            .ensure_ready()
            .await
            .map_err(|error| match error {
                AppError::Unavailable(_) => error,
                other => AppError::Unavailable(other.to_string()),
            })?;

        let Some(resolution) = self.resolver.resolve(&request.hint).await? else {
            return Err(AppError::NotFound(describe_unresolved_hint(&request.hint)));
        };

        info!(
            member_id = %resolution.member.id(),
            strategy = resolution.strategy.as_str(),
            badge_count = request.badges.len(),
            "member resolved for badge sync"
        );

        let summary = self
            .reconciler
            .reconcile(&resolution.member, &request.badges, &self.mapping)
            .await;

        for outcome in summary
            .outcomes()
            .iter()
            .filter(|outcome| outcome.kind().is_missing_or_failed())
        {
            warn!(
                member_id = %resolution.member.id(),
                badge = %outcome.badge(),
                role_id = outcome.role().map(|role| role.as_str()).unwrap_or_default(),
                outcome = outcome.kind().as_str(),
                reason = outcome.reason().unwrap_or_default(),
                "badge role not applied"
            );
        }

        let counts = summary.counts();
        info!(
            member_id = %resolution.member.id(),
            added = counts.added,
            already_present = counts.already_present,
            missing_or_failed = counts.missing_or_failed,
            total_badges = counts.total_badges,
            complete = summary.is_complete(),
            "badge sync finished"
        );

        Ok(summary)
    }
}

fn describe_unresolved_hint(hint: &IdentityHint) -> String {
    if hint.is_empty() {
        return "identity hint carries no stable id or name variant".to_owned();
    }

    let stable_id = hint
        .stable_id()
        .map(|member_id| format!("stable id '{member_id}'"))
        .unwrap_or_else(|| "no stable id".to_owned());

    format!(
        "no member matches {stable_id} or name variants [{}]",
        hint.name_variants().join(", ")
    )
}

#[cfg(test)]
mod tests;
