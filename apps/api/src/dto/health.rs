use serde::Serialize;
use ts_rs::TS;

/// Liveness response payload.
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../../../bindings/health-response.ts")]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Readiness and deployment details.
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../../../bindings/status-response.ts")]
pub struct StatusResponse {
    pub status: &'static str,
    pub directory_ready: bool,
    pub directory_provider: String,
    pub guild_id: String,
    pub guild_name: Option<String>,
    pub mapped_badges: Vec<String>,
    pub link_account_enabled: bool,
    pub started_at: String,
    pub uptime_seconds: i64,
}
