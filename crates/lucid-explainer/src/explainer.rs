//! Core Explainer implementation

use crate::config::ExplainerConfig;
use crate::parser::parse_response;
use crate::prompt::PromptBuilder;
use lucid_domain::{ClassifiedError, Classify, LearningRequest, LearningResponse, ProviderConfig};
use lucid_gatekeeper::Gatekeeper;
use lucid_llm::ProviderAdapter;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// The Explainer runs one learner request through the whole pipeline
///
/// Validation, prompt construction, the provider call and formatting happen
/// in sequence. Everything it holds is read-only, so a single instance is
/// shared by all concurrent requests.
#[derive(Clone)]
pub struct Explainer {
    gatekeeper: Gatekeeper,
    adapter: ProviderAdapter,
    provider_config: Arc<ProviderConfig>,
    config: ExplainerConfig,
}

impl Explainer {
    /// Create a new Explainer
    pub fn new(
        gatekeeper: Gatekeeper,
        adapter: ProviderAdapter,
        provider_config: Arc<ProviderConfig>,
        config: ExplainerConfig,
    ) -> Self {
        Self {
            gatekeeper,
            adapter,
            provider_config,
            config,
        }
    }

    /// Create an Explainer after checking every configuration it carries
    ///
    /// # Errors
    ///
    /// A `system/*` error for missing credentials or invalid settings.
    pub fn try_new(
        gatekeeper: Gatekeeper,
        adapter: ProviderAdapter,
        provider_config: Arc<ProviderConfig>,
        config: ExplainerConfig,
    ) -> Result<Self, ClassifiedError> {
        provider_config.validate()?;
        gatekeeper.config().validate().map_err(|e| e.classify())?;
        config.validate().map_err(|e| e.classify())?;
        Ok(Self::new(gatekeeper, adapter, provider_config, config))
    }

    /// Name of the configured provider backend
    pub fn provider_name(&self) -> &str {
        self.adapter.provider_name()
    }

    /// Explainer configuration
    pub fn config(&self) -> &ExplainerConfig {
        &self.config
    }

    /// Validate raw input and produce a learning response
    ///
    /// # Errors
    ///
    /// Exactly one classified error: `validation/*` before any provider call,
    /// `ai_service/*` for provider or output failures.
    pub async fn explain(
        &self,
        input: &str,
        mode: &str,
        topic_type: Option<&str>,
    ) -> Result<LearningResponse, ClassifiedError> {
        let started = Instant::now();
        let request = self.gatekeeper.validate(input, mode, topic_type)?;

        info!(
            mode = %request.mode(),
            topic_type = %request.topic_type(),
            input_chars = request.input_chars(),
            "Request accepted"
        );

        self.explain_request(&request, started).await
    }

    /// Produce a learning response for an already validated request
    ///
    /// `started` marks request acceptance and anchors `processing_time`.
    pub async fn explain_request(
        &self,
        request: &LearningRequest,
        started: Instant,
    ) -> Result<LearningResponse, ClassifiedError> {
        let shape = self.config.shape_for(request.mode());
        let prompt = PromptBuilder::new(request).with_shape(shape).build();
        debug!(prompt_chars = prompt.instruction_text.chars().count(), "Prompt built");

        let raw = self.adapter.send(&prompt, &self.provider_config).await?;
        debug!(response_chars = raw.chars().count(), "Provider responded");

        let response = match parse_response(&raw, &shape, started) {
            Ok(response) => response,
            Err(e) if self.config.retry_malformed => {
                warn!(error = %e, "Malformed provider output, retrying with strict prompt");

                let strict = PromptBuilder::new(request)
                    .with_shape(shape)
                    .strict(true)
                    .build();
                let raw = self.adapter.send(&strict, &self.provider_config).await?;

                parse_response(&raw, &shape, started).map_err(|e| {
                    warn!(error = %e, "Provider output still malformed after strict retry");
                    e.classify()
                })?
            }
            Err(e) => {
                warn!(error = %e, "Malformed provider output");
                return Err(e.classify());
            }
        };

        info!(
            mode = %response.mode,
            examples = response.examples.len(),
            questions = response.questions.len(),
            processing_time_ms = response.processing_time_ms,
            "Response formatted"
        );

        Ok(response)
    }
}
