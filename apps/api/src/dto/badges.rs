use badgebridge_application::BadgeSyncRequest;
use badgebridge_domain::{BadgeCode, IdentityHint, RoleGrantOutcome, SyncSummary};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Stable member id sent either as a JSON string or a JSON number.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, TS)]
#[serde(untagged)]
#[ts(export, export_to = "../../../bindings/stable-id-value.ts")]
pub enum StableIdValue {
    Text(String),
    Number(u64),
}

impl StableIdValue {
    fn into_string(self) -> String {
        match self {
            Self::Text(value) => value,
            Self::Number(value) => value.to_string(),
        }
    }
}

/// Badge-earned event delivered by the badge platform.
///
/// Every field is optional; missing or null fields count as empty.
#[derive(Debug, Default, Deserialize, TS)]
#[serde(default)]
#[ts(export, export_to = "../../../bindings/badge-obtained-request.ts")]
pub struct BadgeObtainedRequest {
    #[serde(alias = "stableId", alias = "discordId", alias = "discord_id")]
    pub stable_id: Option<StableIdValue>,
    #[serde(alias = "usernameVariants")]
    pub username_variants: Option<Vec<String>>,
    #[serde(alias = "discordUsername")]
    pub username: Option<String>,
    #[serde(alias = "displayName")]
    pub display_name: Option<String>,
    #[serde(alias = "discordTag")]
    pub tag: Option<String>,
    pub badges: Option<Vec<String>>,
}

impl BadgeObtainedRequest {
    /// Builds the sync request; explicit variants come before single-name fields.
    pub fn into_sync_request(self) -> BadgeSyncRequest {
        let name_variants = self
            .username_variants
            .unwrap_or_default()
            .into_iter()
            .chain(self.username)
            .chain(self.display_name)
            .chain(self.tag);

        BadgeSyncRequest {
            hint: IdentityHint::new(
                self.stable_id.map(StableIdValue::into_string),
                name_variants,
            ),
            badges: self
                .badges
                .unwrap_or_default()
                .into_iter()
                .map(BadgeCode::from)
                .collect(),
        }
    }
}

/// Resolved member identity in a sync response.
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../../../bindings/sync-member-response.ts")]
pub struct SyncMemberResponse {
    pub id: String,
    pub username: String,
    #[serde(rename = "displayName")]
    #[ts(rename = "displayName")]
    pub display_name: String,
}

/// Outcome counts in a sync response.
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../../../bindings/sync-role-counts-response.ts")]
pub struct SyncRoleCountsResponse {
    pub added: usize,
    pub already_present: usize,
    pub missing_or_failed: usize,
    pub total_badges: usize,
}

/// One badge outcome in a sync response.
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../../../bindings/badge-outcome-response.ts")]
pub struct BadgeOutcomeResponse {
    pub badge: String,
    pub role_id: Option<String>,
    pub outcome: String,
    pub reason: Option<String>,
}

impl From<&RoleGrantOutcome> for BadgeOutcomeResponse {
    fn from(outcome: &RoleGrantOutcome) -> Self {
        Self {
            badge: outcome.badge().as_str().to_owned(),
            role_id: outcome.role().map(|role| role.as_str().to_owned()),
            outcome: outcome.kind().as_str().to_owned(),
            reason: outcome.reason().map(str::to_owned),
        }
    }
}

/// Structured answer to every badge-earned event.
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../../../bindings/sync-response.ts")]
pub struct SyncResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub member: Option<SyncMemberResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub roles: Option<SyncRoleCountsResponse>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<BadgeOutcomeResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub error: Option<String>,
}

impl SyncResponse {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            member: None,
            roles: None,
            details: Vec::new(),
            error: Some(message.into()),
        }
    }
}

impl From<&SyncSummary> for SyncResponse {
    fn from(summary: &SyncSummary) -> Self {
        let member = summary.member();
        let counts = summary.counts();

        Self {
            success: true,
            member: Some(SyncMemberResponse {
                id: member.id.clone(),
                username: member.username.clone(),
                display_name: member.display_name.clone(),
            }),
            roles: Some(SyncRoleCountsResponse {
                added: counts.added,
                already_present: counts.already_present,
                missing_or_failed: counts.missing_or_failed,
                total_badges: counts.total_badges,
            }),
            details: summary
                .outcomes()
                .iter()
                .map(BadgeOutcomeResponse::from)
                .collect(),
            error: None,
        }
    }
}
