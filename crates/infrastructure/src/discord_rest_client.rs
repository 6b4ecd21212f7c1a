use std::time::Duration;

use badgebridge_core::{AppError, AppResult};
use reqwest::header::{AUTHORIZATION, RETRY_AFTER};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use tracing::warn;

const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(1);
const MAX_RETRY_AFTER: Duration = Duration::from_secs(5);

/// Connection settings for the Discord REST API.
#[derive(Debug, Clone)]
pub struct DiscordRestConfig {
    /// Versioned API base, e.g. `https://discord.com/api/v10`.
    pub api_base_url: String,
    /// Bot token sent as `Authorization: Bot <token>`.
    pub bot_token: String,
    /// Attempts per call when the API answers 429.
    pub max_attempts: u8,
}

/// Authenticated Discord REST client shared by the directory and command adapters.
#[derive(Clone)]
pub struct DiscordRestClient {
    http_client: reqwest::Client,
    api_base_url: String,
    bot_token: String,
    max_attempts: u8,
}

impl DiscordRestClient {
    /// Creates a client. The HTTP client carries the per-call timeout.
    #[must_use]
    pub fn new(http_client: reqwest::Client, config: DiscordRestConfig) -> Self {
        Self {
            http_client,
            api_base_url: config.api_base_url.trim_end_matches('/').to_owned(),
            bot_token: config.bot_token,
            max_attempts: config.max_attempts.max(1),
        }
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.http_client
            .request(method, format!("{}{path}", self.api_base_url))
            .header(AUTHORIZATION, format!("Bot {}", self.bot_token))
    }

    /// Sends a request, waiting out 429 answers up to `max_attempts`.
    ///
    /// Any other status is handed back to the caller. Transport failures and
    /// timeouts surface as `Unavailable`.
    pub(crate) async fn send<F>(&self, operation: &str, build: F) -> AppResult<reqwest::Response>
    where
        F: Fn(&Self) -> reqwest::RequestBuilder,
    {
        let mut attempt = 0_u8;

        loop {
            attempt = attempt.saturating_add(1);
            let response = build(self).send().await.map_err(|error| {
                AppError::Unavailable(format!("{operation}: transport error: {error}"))
            })?;

            if response.status() != StatusCode::TOO_MANY_REQUESTS {
                return Ok(response);
            }

            let delay = retry_after(response).await;
            if attempt >= self.max_attempts {
                return Err(AppError::Unavailable(format!(
                    "{operation}: rate limited after {attempt} attempts"
                )));
            }

            warn!(
                operation,
                attempt,
                retry_after_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "discord rate limit hit, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

/// Converts an unexpected response status into an application error.
pub(crate) async fn status_error(operation: &str, response: reqwest::Response) -> AppError {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<response body unavailable>".to_owned());
    let message = format!("{operation} failed with status {status}: {body}");

    match status {
        StatusCode::UNAUTHORIZED => AppError::Unauthorized(message),
        StatusCode::FORBIDDEN => AppError::Forbidden(message),
        StatusCode::NOT_FOUND => AppError::NotFound(message),
        status if status.is_server_error() => AppError::Unavailable(message),
        _ => AppError::Internal(message),
    }
}

#[derive(Debug, Deserialize)]
struct RateLimitPayload {
    retry_after: Option<f64>,
}

async fn retry_after(response: reqwest::Response) -> Duration {
    let header = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let body = response.text().await.unwrap_or_default();

    parse_retry_after(header.as_deref(), body.as_str())
}

fn parse_retry_after(header: Option<&str>, body: &str) -> Duration {
    let seconds = serde_json::from_str::<RateLimitPayload>(body)
        .ok()
        .and_then(|payload| payload.retry_after)
        .or_else(|| header.and_then(|value| value.trim().parse::<f64>().ok()));

    match seconds {
        Some(seconds) if seconds.is_finite() && seconds >= 0.0 => {
            Duration::from_secs_f64(seconds).min(MAX_RETRY_AFTER)
        }
        _ => DEFAULT_RETRY_AFTER,
    }
}
