use std::collections::BTreeSet;
use std::sync::Arc;

use badgebridge_domain::{BadgeCode, Member, RoleGrantOutcome, RoleId, RoleMapping, SyncSummary};
use tracing::debug;

use crate::MemberDirectory;

/// Computes and applies the role grants a member is owed for a set of badges.
#[derive(Clone)]
pub struct RoleReconciler {
    directory: Arc<dyn MemberDirectory>,
}

impl RoleReconciler {
    /// Creates a reconciler over the directory handle.
    #[must_use]
    pub fn new(directory: Arc<dyn MemberDirectory>) -> Self {
        Self { directory }
    }

    /// Produces exactly one outcome per submitted badge, in submission order.
    ///
    /// Failures stay isolated to their badge and nothing is rolled back. A
    /// role granted earlier in the same pass counts as held, so a repeated
    /// badge code reports `AlreadyPresent` instead of granting twice.
    pub async fn reconcile(
        &self,
        member: &Member,
        badges: &[BadgeCode],
        mapping: &RoleMapping,
    ) -> SyncSummary {
        let mut held_roles: BTreeSet<RoleId> = member.roles().clone();
        let mut outcomes = Vec::with_capacity(badges.len());

        for badge in badges {
            let outcome = self
                .reconcile_badge(member, badge, mapping, &mut held_roles)
                .await;
            debug!(
                member_id = %member.id(),
                badge = %badge,
                outcome = outcome.kind().as_str(),
                "badge reconciled"
            );
            outcomes.push(outcome);
        }

        SyncSummary::summarize(member, outcomes)
    }

    async fn reconcile_badge(
        &self,
        member: &Member,
        badge: &BadgeCode,
        mapping: &RoleMapping,
        held_roles: &mut BTreeSet<RoleId>,
    ) -> RoleGrantOutcome {
        let badge = badge.clone();
        let Some(role) = mapping.lookup(&badge).cloned() else {
            return RoleGrantOutcome::Unmapped { badge };
        };

        match self.directory.role_exists(&role).await {
            Ok(true) => {}
            Ok(false) => return RoleGrantOutcome::RoleNotFound { badge, role },
            Err(error) => {
                return RoleGrantOutcome::GrantFailed {
                    badge,
                    role,
                    reason: format!("role lookup failed: {error}"),
                };
            }
        }

        if held_roles.contains(&role) {
            return RoleGrantOutcome::AlreadyPresent { badge, role };
        }

        match self.directory.grant_role(member.id(), &role).await {
            Ok(()) => {
                held_roles.insert(role.clone());
                RoleGrantOutcome::Granted { badge, role }
            }
            Err(error) => RoleGrantOutcome::GrantFailed {
                badge,
                role,
                reason: error.to_string(),
            },
        }
    }
}
