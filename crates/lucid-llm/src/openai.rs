//! OpenAI Provider Implementation
//!
//! Talks to the Chat Completions endpoint. Any server exposing the same API
//! (Azure OpenAI, vLLM, LM Studio, ...) works by pointing `base_url` at it.

use crate::http::{build_client, endpoint, send_json};
use crate::LlmError;
use async_trait::async_trait;
use lucid_domain::traits::LlmProvider as LlmProviderTrait;
use lucid_domain::{PromptSpec, ProviderConfig};
use serde::{Deserialize, Serialize};

/// Sampling temperature for explanations
const TEMPERATURE: f32 = 0.7;

/// OpenAI Chat Completions provider
pub struct OpenAiProvider {
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl OpenAiProvider {
    /// Create a new OpenAI provider
    pub fn new(config: &ProviderConfig) -> Result<Self, LlmError> {
        Ok(Self {
            client: build_client(config)?,
        })
    }
}

#[async_trait]
impl LlmProviderTrait for OpenAiProvider {
    type Error = LlmError;

    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(
        &self,
        prompt: &PromptSpec,
        config: &ProviderConfig,
    ) -> Result<String, Self::Error> {
        let url = endpoint(&config.base_url, "chat/completions");

        let mut messages = Vec::with_capacity(2);
        if !prompt.system_text.is_empty() {
            messages.push(ChatMessage {
                role: "system",
                content: &prompt.system_text,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &prompt.instruction_text,
        });

        let body = ChatRequest {
            model: &config.model,
            messages,
            temperature: TEMPERATURE,
        };

        let request = self
            .client
            .post(&url)
            .bearer_auth(config.api_key.expose())
            .json(&body);

        let response: ChatResponse = send_json(request, &config.model).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| LlmError::InvalidResponse("No content in completion".to_string()))
    }
}
