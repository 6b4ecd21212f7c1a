use async_trait::async_trait;
use badgebridge_application::{VerificationApi, VerificationRequest, VerificationResult};
use badgebridge_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyCodeBody<'a> {
    code: &'a str,
    discord_id: &'a str,
    discord_username: &'a str,
}

#[derive(Debug, Deserialize)]
struct VerifyCodeResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl From<VerifyCodeResponse> for VerificationResult {
    fn from(value: VerifyCodeResponse) -> Self {
        Self {
            success: value.success,
            error: value.error.or(if value.success { None } else { value.message }),
        }
    }
}

/// HTTP client for the badge platform's verification-code endpoint.
pub struct HttpVerificationClient {
    http_client: reqwest::Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl HttpVerificationClient {
    /// Creates a client posting to `endpoint`, optionally with a bearer key.
    #[must_use]
    pub fn new(http_client: reqwest::Client, endpoint: Url, api_key: Option<String>) -> Self {
        Self {
            http_client,
            endpoint,
            api_key,
        }
    }
}

#[async_trait]
impl VerificationApi for HttpVerificationClient {
    async fn verify(&self, request: VerificationRequest) -> AppResult<VerificationResult> {
        let mut builder = self
            .http_client
            .post(self.endpoint.clone())
            .json(&VerifyCodeBody {
                code: request.code.as_str(),
                discord_id: request.member_id.as_str(),
                discord_username: request.username.as_str(),
            });
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder.send().await.map_err(|error| {
            AppError::Unavailable(format!("verification API transport error: {error}"))
        })?;
        let status = response.status();
        let body = response.text().await.map_err(|error| {
            AppError::Unavailable(format!("verification API body unavailable: {error}"))
        })?;

        // Rejected codes come back as 4xx with a JSON verdict.
        match serde_json::from_str::<VerifyCodeResponse>(body.as_str()) {
            Ok(verdict) if status.is_success() || status.is_client_error() => Ok(verdict.into()),
            _ if status.is_server_error() => Err(AppError::Unavailable(format!(
                "verification API failed with status {status}"
            ))),
            _ => Err(AppError::Internal(format!(
                "verification API returned status {status} with unexpected body"
            ))),
        }
    }
}
