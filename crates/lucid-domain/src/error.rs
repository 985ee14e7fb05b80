//! Error taxonomy
//!
//! Every failure in the pipeline ends up as a [`ClassifiedError`]: one of
//! three kinds, a stable code and a user-safe message. Each [`ErrorCode`]
//! fixes its own kind, HTTP status and message, so nothing a provider sends
//! back can reach the caller through an error. Technical detail travels in
//! [`ClassifiedError::detail`], which is skipped during serialization and is
//! only meant for logs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Who is at fault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The caller sent unusable input
    Validation,

    /// The generative-AI provider failed or answered badly
    AiService,

    /// Local misconfiguration or resource failure
    System,
}

impl ErrorKind {
    /// Get the kind name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::AiService => "ai_service",
            ErrorKind::System => "system",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable machine-readable error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Input was empty after trimming
    EmptyInput,
    /// Input exceeded the length limit
    TooLong,
    /// Mode was not beginner, summary or quiz
    InvalidMode,
    /// Topic type was not concept or code
    InvalidTopicType,
    /// Input matched the content screen
    UnsafeContent,
    /// Request body could not be read
    InvalidRequest,

    /// Provider did not answer within the timeout
    Timeout,
    /// Provider rate limit hit
    RateLimited,
    /// Provider rejected our credentials
    AuthFailed,
    /// Provider rejected the request as invalid
    ProviderRejected,
    /// Configured model does not exist at the provider
    ModelUnavailable,
    /// Network failure or provider-side 5xx
    ProviderUnavailable,
    /// Every allowed attempt failed transiently
    ExhaustedRetries,
    /// Provider output could not be turned into the requested format
    MalformedResponse,

    /// Provider credentials are missing
    MissingCredentials,
    /// Configuration value is invalid
    InvalidConfig,
    /// Unexpected local failure
    Internal,
}

impl ErrorCode {
    /// Get the code as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::EmptyInput => "empty_input",
            ErrorCode::TooLong => "too_long",
            ErrorCode::InvalidMode => "invalid_mode",
            ErrorCode::InvalidTopicType => "invalid_topic_type",
            ErrorCode::UnsafeContent => "unsafe_content",
            ErrorCode::InvalidRequest => "invalid_request",
            ErrorCode::Timeout => "timeout",
            ErrorCode::RateLimited => "rate_limited",
            ErrorCode::AuthFailed => "auth_failed",
            ErrorCode::ProviderRejected => "provider_rejected",
            ErrorCode::ModelUnavailable => "model_unavailable",
            ErrorCode::ProviderUnavailable => "provider_unavailable",
            ErrorCode::ExhaustedRetries => "exhausted_retries",
            ErrorCode::MalformedResponse => "malformed_response",
            ErrorCode::MissingCredentials => "missing_credentials",
            ErrorCode::InvalidConfig => "invalid_config",
            ErrorCode::Internal => "internal",
        }
    }

    /// Kind this code belongs to
    pub fn kind(&self) -> ErrorKind {
        match self {
            ErrorCode::EmptyInput
            | ErrorCode::TooLong
            | ErrorCode::InvalidMode
            | ErrorCode::InvalidTopicType
            | ErrorCode::UnsafeContent
            | ErrorCode::InvalidRequest => ErrorKind::Validation,
            ErrorCode::Timeout
            | ErrorCode::RateLimited
            | ErrorCode::AuthFailed
            | ErrorCode::ProviderRejected
            | ErrorCode::ModelUnavailable
            | ErrorCode::ProviderUnavailable
            | ErrorCode::ExhaustedRetries
            | ErrorCode::MalformedResponse => ErrorKind::AiService,
            ErrorCode::MissingCredentials | ErrorCode::InvalidConfig | ErrorCode::Internal => {
                ErrorKind::System
            }
        }
    }

    /// HTTP status for this code
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation => 400,
            ErrorKind::System => 500,
            ErrorKind::AiService => match self {
                ErrorCode::Timeout => 504,
                ErrorCode::RateLimited => 429,
                _ => 502,
            },
        }
    }

    /// Message shown to the caller
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorCode::EmptyInput => "Please enter some text to learn about.",
            ErrorCode::TooLong => "Input is too long. Please shorten it and try again.",
            ErrorCode::InvalidMode => "Mode must be one of: beginner, summary, quiz.",
            ErrorCode::InvalidTopicType => "Topic type must be either concept or code.",
            ErrorCode::UnsafeContent => {
                "This request can't be processed. Please rephrase it as a learning question."
            }
            ErrorCode::InvalidRequest => "The request body is not valid JSON for this endpoint.",
            ErrorCode::Timeout => "The AI service took too long to respond. Please try again.",
            ErrorCode::RateLimited => {
                "The AI service is receiving too many requests. Please wait a moment and retry."
            }
            ErrorCode::AuthFailed
            | ErrorCode::ProviderRejected
            | ErrorCode::ModelUnavailable => {
                "The AI service could not handle this request. Please try again later."
            }
            ErrorCode::ProviderUnavailable => {
                "The AI service is temporarily unavailable. Please try again later."
            }
            ErrorCode::ExhaustedRetries => {
                "The AI service failed repeatedly. Please try again in a few minutes."
            }
            ErrorCode::MalformedResponse => {
                "The AI service returned an unusable answer. Please try again."
            }
            ErrorCode::MissingCredentials | ErrorCode::InvalidConfig | ErrorCode::Internal => {
                "The service is not configured correctly. Please contact the administrator."
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single error type returned to callers
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{kind}/{code}: {message}")]
pub struct ClassifiedError {
    /// Error kind
    #[serde(rename = "type")]
    pub kind: ErrorKind,

    /// User-safe message
    pub message: String,

    /// Stable code
    pub code: ErrorCode,

    /// When the failure was classified
    #[serde(rename = "timestamp")]
    pub occurred_at: DateTime<Utc>,

    /// Internal diagnostic detail, never serialized
    #[serde(skip)]
    pub detail: Option<String>,
}

impl ClassifiedError {
    /// Create an error for a code, with no internal detail
    pub fn new(code: ErrorCode) -> Self {
        Self {
            kind: code.kind(),
            message: code.user_message().to_string(),
            code,
            occurred_at: Utc::now(),
            detail: None,
        }
    }

    /// Create an error for a code with internal detail for logs
    pub fn with_detail(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
            ..Self::new(code)
        }
    }

    /// `kind/code` form used in logs
    pub fn qualified_code(&self) -> String {
        format!("{}/{}", self.kind, self.code)
    }

    /// HTTP status for this error
    pub fn status_code(&self) -> u16 {
        self.code.status_code()
    }
}

/// Mapping from a stage-specific failure to a [`ClassifiedError`]
///
/// Implemented by every error type the pipeline produces. Implementations
/// must be pure apart from stamping the time of classification.
pub trait Classify {
    /// Produce the boundary error for this failure
    fn classify(&self) -> ClassifiedError;
}

impl Classify for ClassifiedError {
    /// Already classified: passed through unchanged
    fn classify(&self) -> ClassifiedError {
        self.clone()
    }
}

/// Classify any pipeline failure
///
/// # Examples
///
/// ```
/// use lucid_domain::{classify, ClassifiedError, ErrorCode};
///
/// let err = ClassifiedError::new(ErrorCode::EmptyInput);
/// assert_eq!(classify(&classify(&err)), classify(&err));
/// ```
pub fn classify<E: Classify + ?Sized>(error: &E) -> ClassifiedError {
    error.classify()
}
