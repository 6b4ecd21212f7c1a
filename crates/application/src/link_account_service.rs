use std::sync::Arc;

use badgebridge_core::NonEmptyString;
use tracing::{info, warn};

use crate::{VerificationApi, VerificationRequest};

/// Longest verification code accepted before calling the platform.
pub const LINK_CODE_MAX_LENGTH: usize = 64;

const MAX_REPORTED_ERROR_CHARS: usize = 200;

const LINKED_MESSAGE: &str =
    "Your account is now linked. Badge roles will be granted as you earn them.";
const MISSING_CODE_MESSAGE: &str = "Please provide the verification code shown on the platform.";
const INVALID_CODE_MESSAGE: &str = "That verification code is not valid.";
const REJECTED_MESSAGE: &str = "Verification failed. Check the code and try again.";
const FALLBACK_MESSAGE: &str =
    "Account linking is temporarily unavailable. Please try again later.";

/// Slash-command input for linking a community member to a platform account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkAccountInput {
    /// Code typed by the member.
    pub code: String,
    /// Stable identifier of the invoking member.
    pub member_id: String,
    /// Username of the invoking member.
    pub username: String,
}

/// Short human-readable answer for the invoking member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkAccountReply {
    /// Whether the account is now linked.
    pub success: bool,
    /// Message shown to the member.
    pub message: String,
}

impl LinkAccountReply {
    fn success() -> Self {
        Self {
            success: true,
            message: LINKED_MESSAGE.to_owned(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Links community members to platform accounts via verification codes.
#[derive(Clone)]
pub struct LinkAccountService {
    verification_api: Option<Arc<dyn VerificationApi>>,
}

impl LinkAccountService {
    /// Creates the service. Without a verification API every attempt gets the fallback reply.
    #[must_use]
    pub fn new(verification_api: Option<Arc<dyn VerificationApi>>) -> Self {
        Self { verification_api }
    }

    /// Returns whether a verification API is configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.verification_api.is_some()
    }

    /// Verifies the code and always returns a reply, even on technical failure.
    pub async fn link_account(&self, input: LinkAccountInput) -> LinkAccountReply {
        let Ok(code) = NonEmptyString::new(input.code.trim()) else {
            return LinkAccountReply::failure(MISSING_CODE_MESSAGE);
        };
        if code.as_str().chars().count() > LINK_CODE_MAX_LENGTH {
            return LinkAccountReply::failure(INVALID_CODE_MESSAGE);
        }

        let Some(verification_api) = &self.verification_api else {
            warn!(
                member_id = %input.member_id,
                "link-account invoked without a configured verification API"
            );
            return LinkAccountReply::failure(FALLBACK_MESSAGE);
        };

        let request = VerificationRequest {
            code: code.into(),
            member_id: input.member_id.clone(),
            username: input.username,
        };

        match verification_api.verify(request).await {
            Ok(result) if result.success => {
                info!(member_id = %input.member_id, "account linked");
                LinkAccountReply::success()
            }
            Ok(result) => {
                info!(
                    member_id = %input.member_id,
                    error = result.error.as_deref().unwrap_or_default(),
                    "verification code rejected"
                );
                match result.error.filter(|error| !error.trim().is_empty()) {
                    Some(error) => LinkAccountReply::failure(format!(
                        "Verification failed: {}",
                        truncate_chars(error.trim(), MAX_REPORTED_ERROR_CHARS)
                    )),
                    None => LinkAccountReply::failure(REJECTED_MESSAGE),
                }
            }
            Err(error) => {
                warn!(
                    member_id = %input.member_id,
                    error = %error,
                    "verification API call failed"
                );
                LinkAccountReply::failure(FALLBACK_MESSAGE)
            }
        }
    }
}

fn truncate_chars(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((index, _)) => format!("{}…", &value[..index]),
        None => value.to_owned(),
    }
}
