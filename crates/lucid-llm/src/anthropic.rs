//! Anthropic Provider Implementation
//!
//! Talks to the Messages API (`POST /v1/messages`).

use crate::http::{build_client, endpoint, send_json};
use crate::LlmError;
use async_trait::async_trait;
use lucid_domain::traits::LlmProvider as LlmProviderTrait;
use lucid_domain::{PromptSpec, ProviderConfig};
use serde::{Deserialize, Serialize};

/// API version header value
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Output budget per call; quiz answers with five questions fit comfortably
const MAX_TOKENS: u32 = 2048;

/// Anthropic Messages API provider
pub struct AnthropicProvider {
    client: reqwest::Client,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "str::is_empty")]
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider
    pub fn new(config: &ProviderConfig) -> Result<Self, LlmError> {
        Ok(Self {
            client: build_client(config)?,
        })
    }
}

#[async_trait]
impl LlmProviderTrait for AnthropicProvider {
    type Error = LlmError;

    fn name(&self) -> &str {
        "anthropic"
    }

    async fn generate(
        &self,
        prompt: &PromptSpec,
        config: &ProviderConfig,
    ) -> Result<String, Self::Error> {
        let url = endpoint(&config.base_url, "v1/messages");

        let body = MessagesRequest {
            model: &config.model,
            max_tokens: MAX_TOKENS,
            system: &prompt.system_text,
            messages: vec![Message {
                role: "user",
                content: &prompt.instruction_text,
            }],
        };

        let request = self
            .client
            .post(&url)
            .header("x-api-key", config.api_key.expose())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body);

        let response: MessagesResponse = send_json(request, &config.model).await?;

        let text: String = response
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(LlmError::InvalidResponse(
                "No text blocks in message".to_string(),
            ));
        }
        Ok(text)
    }
}
