//! Lucid LLM Provider Layer
//!
//! Pluggable generative-AI backends behind the `LlmProvider` trait from
//! `lucid-domain`, plus the [`ProviderAdapter`] that applies timeouts and
//! retries around them.
//!
//! # Providers
//!
//! - `OpenAiProvider`: OpenAI Chat Completions (or any compatible endpoint)
//! - `AnthropicProvider`: Anthropic Messages API
//! - `OllamaProvider`: Local Ollama API integration
//! - `MockProvider`: Deterministic mock for testing
//!
//! Backends make a single HTTP call per `generate`. The adapter owns the
//! retry loop, so every backend gets the same timeout, backoff and
//! classification behaviour.
//!
//! # Examples
//!
//! ```no_run
//! use lucid_domain::{ApiKey, ProviderConfig, ProviderKind};
//! use lucid_llm::{build_provider, ProviderAdapter};
//!
//! let config = ProviderConfig::new(ProviderKind::Ollama, ApiKey::default(), "llama3");
//! let provider = build_provider(&config).expect("client builds");
//! let adapter = ProviderAdapter::new(provider);
//! // adapter.send(&prompt, &config).await inside an async context
//! ```

#![warn(missing_docs)]

pub mod adapter;
pub mod anthropic;
mod http;
pub mod ollama;
pub mod openai;

#[cfg(test)]
mod test_support;

use async_trait::async_trait;
use lucid_domain::traits::LlmProvider as LlmProviderTrait;
use lucid_domain::{
    ClassifiedError, Classify, ErrorCode, PromptSpec, ProviderConfig, ProviderKind,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;

pub use adapter::{ProviderAdapter, RetryPolicy};
pub use anthropic::AnthropicProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

/// A provider selected at startup, shared by every request
pub type DynProvider = Arc<dyn LlmProviderTrait<Error = LlmError>>;

/// Errors that can occur during LLM operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// No response within the timeout
    #[error("Request timed out")]
    Timeout,

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded {
        /// Provider-supplied wait before retrying
        retry_after: Option<Duration>,
    },

    /// Credentials rejected
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Request rejected as invalid (4xx other than auth and rate limit)
    #[error("Request rejected (HTTP {status}): {message}")]
    Rejected {
        /// HTTP status
        status: u16,
        /// Provider message, truncated
        message: String,
    },

    /// Provider-side failure (5xx)
    #[error("Provider error (HTTP {status}): {message}")]
    Server {
        /// HTTP status
        status: u16,
        /// Provider message, truncated
        message: String,
        /// Provider-supplied wait before retrying, usually sent with 503
        retry_after: Option<Duration>,
    },

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Client could not be configured
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl LlmError {
    /// Whether another attempt may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LlmError::Communication(_)
                | LlmError::Timeout
                | LlmError::RateLimitExceeded { .. }
                | LlmError::Server { .. }
        )
    }

    /// Provider-supplied retry hint, if any
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            LlmError::RateLimitExceeded { retry_after }
            | LlmError::Server { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

impl Classify for LlmError {
    fn classify(&self) -> ClassifiedError {
        let code = match self {
            LlmError::Communication(_) | LlmError::Server { .. } | LlmError::Other(_) => {
                ErrorCode::ProviderUnavailable
            }
            LlmError::Timeout => ErrorCode::Timeout,
            LlmError::RateLimitExceeded { .. } => ErrorCode::RateLimited,
            LlmError::Auth(_) => ErrorCode::AuthFailed,
            LlmError::Rejected { .. } => ErrorCode::ProviderRejected,
            LlmError::InvalidResponse(_) => ErrorCode::MalformedResponse,
            LlmError::ModelNotAvailable(_) => ErrorCode::ModelUnavailable,
            LlmError::Config(_) => ErrorCode::InvalidConfig,
        };
        ClassifiedError::with_detail(code, self.to_string())
    }
}

/// Build the backend named by the configuration
///
/// Called once at startup; the result is shared by all requests.
pub fn build_provider(config: &ProviderConfig) -> Result<DynProvider, LlmError> {
    let provider: DynProvider = match config.provider {
        ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(config)?),
        ProviderKind::Anthropic => Arc::new(AnthropicProvider::new(config)?),
        ProviderKind::Ollama => Arc::new(OllamaProvider::new(config)?),
    };
    Ok(provider)
}

/// Mock LLM provider for deterministic testing
///
/// Returns pre-configured responses without making any network calls.
/// Scripted outcomes are consumed in order; once the script is empty every
/// call returns the default response. Clones share the script, the call
/// counter and the prompt log.
///
/// # Examples
///
/// ```
/// use lucid_llm::{LlmError, MockProvider};
///
/// let provider = MockProvider::new("fallback");
/// provider.push_error(LlmError::Timeout);
/// provider.push_response("scripted");
/// assert_eq!(provider.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    script: Arc<Mutex<VecDeque<Result<String, LlmError>>>>,
    call_count: Arc<Mutex<usize>>,
    prompts: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            script: Arc::new(Mutex::new(VecDeque::new())),
            call_count: Arc::new(Mutex::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
            delay: None,
        }
    }

    /// Sleep this long before answering each call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Append a successful response to the script
    pub fn push_response(&self, response: impl Into<String>) {
        lock(&self.script).push_back(Ok(response.into()));
    }

    /// Append an error to the script
    pub fn push_error(&self, error: LlmError) {
        lock(&self.script).push_back(Err(error));
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        *lock(&self.call_count)
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        *lock(&self.call_count) = 0;
    }

    /// Instruction texts received so far, oldest first
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(
        &self,
        prompt: &PromptSpec,
        _config: &ProviderConfig,
    ) -> Result<String, Self::Error> {
        *lock(&self.call_count) += 1;
        lock(&self.prompts).push(prompt.instruction_text.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = lock(&self.script).pop_front();
        scripted.unwrap_or_else(|| Ok(self.default_response.clone()))
    }
}

/// Lock a mock mutex, recovering the data if a test thread panicked
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
