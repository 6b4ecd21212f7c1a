use async_trait::async_trait;
use badgebridge_core::AppResult;

/// Account-link verification request sent to the badge platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationRequest {
    /// Short-lived code displayed to the user by the platform.
    pub code: String,
    /// Stable community member identifier of the caller.
    pub member_id: String,
    /// Community username of the caller.
    pub username: String,
}

/// Verdict returned by the verification API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    /// Whether the platform accepted the code and linked the account.
    pub success: bool,
    /// Human-readable reason when the platform rejected the code.
    pub error: Option<String>,
}

/// Port for the platform's verification-code API.
#[async_trait]
pub trait VerificationApi: Send + Sync {
    /// Submits a code for the given member.
    async fn verify(&self, request: VerificationRequest) -> AppResult<VerificationResult>;
}
