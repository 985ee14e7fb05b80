//! Timeout and retry around a single backend
//!
//! The adapter runs an explicit bounded loop: each attempt gets its own
//! timeout, transient failures back off exponentially (honouring a
//! provider's retry-after hint), and anything non-transient ends the loop
//! immediately. At most `max_retries + 1` calls reach the backend.

use crate::{DynProvider, LlmError};
use lucid_domain::{ClassifiedError, Classify, ErrorCode, PromptSpec, ProviderConfig};
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

/// Longest provider retry-after hint we are willing to wait for
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(30);

/// Backoff schedule between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    base: Duration,
    max: Duration,
}

impl RetryPolicy {
    /// Create a policy doubling from `base` up to `max`
    pub fn new(base: Duration, max: Duration) -> Self {
        Self { base, max }
    }

    /// Policy described by a provider configuration
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self::new(
            Duration::from_millis(config.backoff_base_ms),
            Duration::from_millis(config.backoff_max_ms),
        )
    }

    /// Delay before retry number `retry` (0-based): base * 2^retry, capped
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        self.base.saturating_mul(factor).min(self.max)
    }

    /// Delay before retry number `retry` after `error`
    ///
    /// A retry-after hint wins when it is longer than the computed backoff;
    /// hints are clamped to [`MAX_RETRY_AFTER`].
    pub fn delay_for(&self, retry: u32, error: &LlmError) -> Duration {
        let backoff = self.backoff(retry);
        match error.retry_after() {
            Some(hint) => backoff.max(hint.min(MAX_RETRY_AFTER)),
            None => backoff,
        }
    }

    /// Sum of all backoff delays for `retries` retries, ignoring hints
    pub fn budget(&self, retries: u32) -> Duration {
        (0..retries).map(|r| self.backoff(r)).sum()
    }
}

/// Uniform, retrying front for whichever backend was configured
#[derive(Clone)]
pub struct ProviderAdapter {
    provider: DynProvider,
}

impl ProviderAdapter {
    /// Wrap a backend
    pub fn new(provider: DynProvider) -> Self {
        Self { provider }
    }

    /// Name of the wrapped backend
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Send the prompt, retrying transient failures
    ///
    /// # Errors
    ///
    /// - non-transient backend errors are classified and returned at once
    /// - when every attempt fails transiently the result is
    ///   `ai_service/exhausted_retries`; with `max_retries == 0` the single
    ///   failure is classified directly (`ai_service/timeout` for a timeout)
    pub async fn send(
        &self,
        prompt: &PromptSpec,
        config: &ProviderConfig,
    ) -> Result<String, ClassifiedError> {
        let policy = RetryPolicy::from_config(config);
        let max_attempts = config.max_attempts();
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            debug!(
                provider = self.provider_name(),
                attempt,
                max_attempts,
                "Calling provider"
            );

            let outcome = match timeout(config.timeout(), self.provider.generate(prompt, config)).await
            {
                Ok(result) => result,
                // The in-flight call is dropped here; a late answer is discarded
                Err(_) => Err(LlmError::Timeout),
            };

            let error = match outcome {
                Ok(text) => {
                    debug!(attempt, response_chars = text.chars().count(), "Provider answered");
                    return Ok(text);
                }
                Err(e) => e,
            };

            if !error.is_transient() {
                warn!(attempt, error = %error, "Provider failed with non-retryable error");
                return Err(error.classify());
            }

            if attempt < max_attempts {
                let delay = policy.delay_for(attempt - 1, &error);
                warn!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "Transient provider failure, retrying"
                );
                sleep(delay).await;
            } else {
                warn!(attempt, error = %error, "Transient provider failure on final attempt");
            }
            last_error = Some(error);
        }

        let last_error = last_error
            .unwrap_or_else(|| LlmError::Other("no attempts were made".to_string()));

        if config.max_retries == 0 {
            return Err(last_error.classify());
        }

        Err(ClassifiedError::with_detail(
            ErrorCode::ExhaustedRetries,
            format!("{} attempts failed; last error: {}", max_attempts, last_error),
        ))
    }
}
