//! HTTP plumbing shared by the hosted backends

use crate::LlmError;
use lucid_domain::ProviderConfig;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Provider error bodies are cut to this many characters before logging
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Build a client whose own timeout matches the configured attempt timeout
pub(crate) fn build_client(config: &ProviderConfig) -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(config.timeout())
        .build()
        .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))
}

/// Send a request and decode a JSON success body
///
/// Non-success statuses are mapped through [`error_for_status`].
pub(crate) async fn send_json<R: DeserializeOwned>(
    request: RequestBuilder,
    model: &str,
) -> Result<R, LlmError> {
    let response = request.send().await.map_err(LlmError::from)?;

    let status = response.status();
    if !status.is_success() {
        let retry_after = parse_retry_after(response.headers());
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(error_for_status(status, retry_after, &body, model));
    }

    response
        .json::<R>()
        .await
        .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))
}

/// Map a non-success HTTP status to an error
pub(crate) fn error_for_status(
    status: StatusCode,
    retry_after: Option<Duration>,
    body: &str,
    model: &str,
) -> LlmError {
    let message = truncate(body);
    match status {
        StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimitExceeded { retry_after },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::Auth(message),
        StatusCode::NOT_FOUND => LlmError::ModelNotAvailable(model.to_string()),
        StatusCode::REQUEST_TIMEOUT => LlmError::Timeout,
        s if s.is_client_error() => LlmError::Rejected {
            status: s.as_u16(),
            message,
        },
        s if s.is_server_error() => LlmError::Server {
            status: s.as_u16(),
            message,
            retry_after,
        },
        s => LlmError::Communication(format!("Unexpected HTTP {}: {}", s, message)),
    }
}

/// Read an integer-seconds `Retry-After` header
pub(crate) fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Join `base` and `path` with exactly one slash
pub(crate) fn endpoint(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn truncate(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= MAX_ERROR_BODY_CHARS {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect();
    format!("{}...", cut)
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else if e.is_decode() {
            LlmError::InvalidResponse(e.to_string())
        } else {
            LlmError::Communication(format!("Request failed: {}", e))
        }
    }
}
