//! Per-badge grant outcomes and their aggregation into a sync summary.

use serde::{Deserialize, Serialize};

use crate::{BadgeCode, Member, RoleId};

/// Kind of result produced for one submitted badge code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// The role was granted during this request.
    Granted,
    /// The member already held the role.
    AlreadyPresent,
    /// No role is mapped to the badge code.
    Unmapped,
    /// The mapped role does not exist in the directory.
    RoleNotFound,
    /// The directory rejected or failed the grant.
    GrantFailed,
}

impl OutcomeKind {
    /// Returns a stable transport value for this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Granted => "granted",
            Self::AlreadyPresent => "already_present",
            Self::Unmapped => "unmapped",
            Self::RoleNotFound => "role_not_found",
            Self::GrantFailed => "grant_failed",
        }
    }

    /// Returns whether the kind counts toward `missing_or_failed`.
    #[must_use]
    pub fn is_missing_or_failed(&self) -> bool {
        matches!(self, Self::Unmapped | Self::RoleNotFound | Self::GrantFailed)
    }
}

/// Result of reconciling one badge code against a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleGrantOutcome {
    /// The mapped role was granted.
    Granted {
        /// Submitted badge code.
        badge: BadgeCode,
        /// Role that was granted.
        role: RoleId,
    },
    /// The member already held the mapped role; no grant was issued.
    AlreadyPresent {
        /// Submitted badge code.
        badge: BadgeCode,
        /// Role already held.
        role: RoleId,
    },
    /// The badge code has no mapped role; no grant was issued.
    Unmapped {
        /// Submitted badge code.
        badge: BadgeCode,
    },
    /// The mapped role is missing from the directory; no grant was issued.
    RoleNotFound {
        /// Submitted badge code.
        badge: BadgeCode,
        /// Role that could not be found.
        role: RoleId,
    },
    /// The directory call failed.
    GrantFailed {
        /// Submitted badge code.
        badge: BadgeCode,
        /// Role that could not be granted.
        role: RoleId,
        /// Diagnostic detail from the failing call.
        reason: String,
    },
}

impl RoleGrantOutcome {
    /// Returns the outcome kind.
    #[must_use]
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::Granted { .. } => OutcomeKind::Granted,
            Self::AlreadyPresent { .. } => OutcomeKind::AlreadyPresent,
            Self::Unmapped { .. } => OutcomeKind::Unmapped,
            Self::RoleNotFound { .. } => OutcomeKind::RoleNotFound,
            Self::GrantFailed { .. } => OutcomeKind::GrantFailed,
        }
    }

    /// Returns the submitted badge code.
    #[must_use]
    pub fn badge(&self) -> &BadgeCode {
        match self {
            Self::Granted { badge, .. }
            | Self::AlreadyPresent { badge, .. }
            | Self::Unmapped { badge }
            | Self::RoleNotFound { badge, .. }
            | Self::GrantFailed { badge, .. } => badge,
        }
    }

    /// Returns the mapped role, absent for unmapped badges.
    #[must_use]
    pub fn role(&self) -> Option<&RoleId> {
        match self {
            Self::Granted { role, .. }
            | Self::AlreadyPresent { role, .. }
            | Self::RoleNotFound { role, .. }
            | Self::GrantFailed { role, .. } => Some(role),
            Self::Unmapped { .. } => None,
        }
    }

    /// Returns the failure detail for failed grants.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::GrantFailed { reason, .. } => Some(reason.as_str()),
            _ => None,
        }
    }
}

/// Identity of the member a summary was built for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSummary {
    /// Stable member identifier.
    pub id: String,
    /// Primary username.
    pub username: String,
    /// Name shown in the community.
    pub display_name: String,
}

impl From<&Member> for MemberSummary {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id().as_str().to_owned(),
            username: member.username().to_owned(),
            display_name: member.display_name().to_owned(),
        }
    }
}

/// Outcome counts; they always partition the submitted badges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCounts {
    /// Roles granted during the request.
    pub added: usize,
    /// Roles the member already held.
    pub already_present: usize,
    /// Unmapped badges, missing roles and failed grants.
    pub missing_or_failed: usize,
    /// Number of submitted badge codes, duplicates included.
    pub total_badges: usize,
}

impl RoleCounts {
    /// Counts each outcome exactly once.
    #[must_use]
    pub fn tally(outcomes: &[RoleGrantOutcome]) -> Self {
        outcomes.iter().fold(
            Self {
                total_badges: outcomes.len(),
                ..Self::default()
            },
            |mut counts, outcome| {
                match outcome.kind() {
                    OutcomeKind::Granted => counts.added += 1,
                    OutcomeKind::AlreadyPresent => counts.already_present += 1,
                    kind if kind.is_missing_or_failed() => counts.missing_or_failed += 1,
                    _ => {}
                }
                counts
            },
        )
    }
}

/// Aggregated result of one sync request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSummary {
    member: MemberSummary,
    counts: RoleCounts,
    outcomes: Vec<RoleGrantOutcome>,
}

impl SyncSummary {
    /// Aggregates per-badge outcomes for the resolved member. Performs no I/O.
    #[must_use]
    pub fn summarize(member: &Member, outcomes: Vec<RoleGrantOutcome>) -> Self {
        Self {
            member: MemberSummary::from(member),
            counts: RoleCounts::tally(&outcomes),
            outcomes,
        }
    }

    /// Returns the resolved member identity.
    #[must_use]
    pub fn member(&self) -> &MemberSummary {
        &self.member
    }

    /// Returns the outcome counts.
    #[must_use]
    pub fn counts(&self) -> RoleCounts {
        self.counts
    }

    /// Returns every outcome in submission order.
    #[must_use]
    pub fn outcomes(&self) -> &[RoleGrantOutcome] {
        self.outcomes.as_slice()
    }

    /// Returns whether every submitted badge ended with the role held.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.counts.missing_or_failed == 0
    }
}
