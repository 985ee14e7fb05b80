//! Ollama Provider Implementation
//!
//! Provides integration with Ollama's local LLM API, for running models
//! locally without an API key.
//!
//! # Examples
//!
//! ```no_run
//! use lucid_domain::{ApiKey, ProviderConfig, ProviderKind};
//! use lucid_llm::OllamaProvider;
//!
//! let config = ProviderConfig::new(ProviderKind::Ollama, ApiKey::default(), "llama3");
//! let provider = OllamaProvider::new(&config).unwrap();
//! ```

use crate::http::{build_client, endpoint, send_json};
use crate::LlmError;
use async_trait::async_trait;
use lucid_domain::traits::LlmProvider as LlmProviderTrait;
use lucid_domain::{PromptSpec, ProviderConfig};
use serde::{Deserialize, Serialize};

/// Ollama API provider for local LLM inference
pub struct OllamaProvider {
    client: reqwest::Client,
}

/// Request body for Ollama generate API
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
}

/// Response from Ollama generate API
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
    #[allow(dead_code)]
    done: bool,
}

impl OllamaProvider {
    /// Create a new Ollama provider
    pub fn new(config: &ProviderConfig) -> Result<Self, LlmError> {
        Ok(Self {
            client: build_client(config)?,
        })
    }
}

#[async_trait]
impl LlmProviderTrait for OllamaProvider {
    type Error = LlmError;

    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(
        &self,
        prompt: &PromptSpec,
        config: &ProviderConfig,
    ) -> Result<String, Self::Error> {
        let url = endpoint(&config.base_url, "api/generate");

        let request_body = OllamaGenerateRequest {
            model: &config.model,
            prompt: &prompt.instruction_text,
            system: &prompt.system_text,
            stream: false,
        };

        let response: OllamaGenerateResponse =
            send_json(self.client.post(&url).json(&request_body), &config.model).await?;

        if response.response.trim().is_empty() {
            return Err(LlmError::InvalidResponse(
                "Ollama returned an empty response".to_string(),
            ));
        }
        Ok(response.response)
    }
}
