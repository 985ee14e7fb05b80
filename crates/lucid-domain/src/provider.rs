//! Provider selection and credentials

use crate::error::{ClassifiedError, ErrorCode};
use std::fmt;
use std::time::Duration;

/// Default per-attempt timeout (30 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default number of retries after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default first backoff delay
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 500;

/// Default ceiling for a single backoff delay
pub const DEFAULT_BACKOFF_MAX_MS: u64 = 8_000;

/// Supported generative-AI backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// OpenAI Chat Completions (or any compatible endpoint)
    OpenAi,

    /// Anthropic Messages API
    Anthropic,

    /// Local Ollama server
    Ollama,
}

impl ProviderKind {
    /// Get the provider name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Ollama => "ollama",
        }
    }

    /// Parse a provider name
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Some(ProviderKind::OpenAi),
            "anthropic" => Some(ProviderKind::Anthropic),
            "ollama" => Some(ProviderKind::Ollama),
            _ => None,
        }
    }

    /// Base URL used when none is configured
    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "https://api.openai.com/v1",
            ProviderKind::Anthropic => "https://api.anthropic.com",
            ProviderKind::Ollama => "http://localhost:11434",
        }
    }

    /// Whether the backend needs an API key
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, ProviderKind::Ollama)
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Unknown provider: {}", s))
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider API key
///
/// `Debug` and `Display` are redacted so the key cannot leak through logs or
/// error messages.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a raw key
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Access the raw key (for request headers only)
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether the key is blank
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

/// Provider settings, built once at startup and shared read-only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Selected backend
    pub provider: ProviderKind,

    /// Credential for the backend
    pub api_key: ApiKey,

    /// Endpoint root, without a trailing slash
    pub base_url: String,

    /// Model name passed to the backend
    pub model: String,

    /// Per-attempt timeout in milliseconds
    pub timeout_ms: u64,

    /// Retries after the first attempt
    pub max_retries: u32,

    /// First backoff delay in milliseconds (doubles per attempt)
    pub backoff_base_ms: u64,

    /// Ceiling for a single backoff delay in milliseconds
    pub backoff_max_ms: u64,
}

impl ProviderConfig {
    /// Create a configuration with default base URL, timeout and retries
    pub fn new(provider: ProviderKind, api_key: ApiKey, model: impl Into<String>) -> Self {
        Self {
            provider,
            api_key,
            base_url: provider.default_base_url().to_string(),
            model: model.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
            backoff_max_ms: DEFAULT_BACKOFF_MAX_MS,
        }
    }

    /// Set the base URL (a trailing slash is removed)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the per-attempt timeout
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the retry bound
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the backoff base and ceiling
    pub fn with_backoff_ms(mut self, base_ms: u64, max_ms: u64) -> Self {
        self.backoff_base_ms = base_ms;
        self.backoff_max_ms = max_ms;
        self
    }

    /// Per-attempt timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Total number of attempts the adapter may make
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Validate the configuration
    ///
    /// A missing key is `system/missing_credentials`; every other problem is
    /// `system/invalid_config`.
    pub fn validate(&self) -> Result<(), ClassifiedError> {
        if self.provider.requires_api_key() && self.api_key.is_empty() {
            return Err(ClassifiedError::with_detail(
                ErrorCode::MissingCredentials,
                format!("no API key configured for provider '{}'", self.provider),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(ClassifiedError::with_detail(
                ErrorCode::InvalidConfig,
                "model name is empty",
            ));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ClassifiedError::with_detail(
                ErrorCode::InvalidConfig,
                format!("base URL '{}' is not an http(s) URL", self.base_url),
            ));
        }
        if self.timeout_ms == 0 {
            return Err(ClassifiedError::with_detail(
                ErrorCode::InvalidConfig,
                "timeout must be greater than 0",
            ));
        }
        if self.backoff_base_ms > self.backoff_max_ms {
            return Err(ClassifiedError::with_detail(
                ErrorCode::InvalidConfig,
                "backoff base cannot exceed backoff ceiling",
            ));
        }
        Ok(())
    }
}
