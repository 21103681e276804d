//! Error classification for chat-completion calls.

use std::time::Duration;

use thiserror::Error;

/// Failure classes of a model endpoint call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// Missing or rejected bearer token (HTTP 401). Never retried.
    InvalidCredentials,
    /// Endpoint URL or request body could not be built.
    InvalidRequest,
    /// The endpoint answered, but the body could not be decoded.
    InvalidResponse,
    /// HTTP 429.
    RateLimited,
    /// HTTP 5xx.
    ServerError,
    /// Connection, TLS or timeout failure before a status was received.
    Transport,
    /// Any status code not covered above.
    UnknownStatus,
}

impl LlmErrorKind {
    /// Whether the retry loop may issue another attempt for this failure.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::RateLimited | Self::ServerError | Self::Transport)
    }
}

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct LlmError {
    pub kind: LlmErrorKind,
    pub status: Option<u16>,
    pub message: String,
}

impl LlmError {
    pub fn new(kind: LlmErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
        }
    }

    /// Build an error for a non-success HTTP response.
    pub fn from_status(status: u16, body: &str) -> Self {
        let kind = classify_http_status(status).unwrap_or(LlmErrorKind::UnknownStatus);
        let message = match kind {
            LlmErrorKind::InvalidCredentials => "model endpoint rejected the API key".to_string(),
            LlmErrorKind::RateLimited => "model endpoint is rate limiting requests".to_string(),
            LlmErrorKind::ServerError => format!("model endpoint server error ({})", status),
            _ => format!("model endpoint returned unexpected status {}", status),
        };
        let snippet: String = body.chars().take(200).collect();
        Self {
            kind,
            status: Some(status),
            message: if snippet.trim().is_empty() {
                message
            } else {
                format!("{}: {}", message, snippet.trim())
            },
        }
    }

    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::InvalidCredentials, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::InvalidRequest, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::InvalidResponse, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Transport, message)
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

/// Map an HTTP status to a failure class. `None` means success.
pub fn classify_http_status(status: u16) -> Option<LlmErrorKind> {
    match status {
        200..=299 => None,
        401 => Some(LlmErrorKind::InvalidCredentials),
        429 => Some(LlmErrorKind::RateLimited),
        500..=599 => Some(LlmErrorKind::ServerError),
        _ => Some(LlmErrorKind::UnknownStatus),
    }
}

/// Bounded exponential backoff: `base_delay * 2^attempt`, attempt counted from 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retries after the first attempt; total attempts is `max_retries + 1`.
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryConfig {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}
