//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::prompt::PromptSpec;
use crate::provider::ProviderConfig;
use async_trait::async_trait;

/// Trait for generative-AI backends
///
/// Implemented by the infrastructure layer (lucid-llm), one type per
/// provider. An implementation makes exactly one network call per
/// invocation: timeouts and retries are applied by the caller.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Error type for provider operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// Short provider name for logs
    fn name(&self) -> &str;

    /// Send the prompt and return the raw generated text
    async fn generate(
        &self,
        prompt: &PromptSpec,
        config: &ProviderConfig,
    ) -> Result<String, Self::Error>;
}
