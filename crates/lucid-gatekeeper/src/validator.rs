//! Input validation logic

use crate::screen::{infer_topic_type, ContentCategory, ContentScreen};
use crate::{GatekeeperError, ValidationConfig};
use lucid_domain::{
    ClassifiedError, Classify, ErrorCode, LearningMode, LearningRequest, TopicType,
};
use thiserror::Error;
use tracing::debug;

/// Reasons for rejection
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    /// Nothing left after trimming
    #[error("Input is empty")]
    EmptyInput,

    /// Input exceeds the configured length
    #[error("Input has {chars} characters, limit is {max}")]
    TooLong {
        /// Code points after sanitization
        chars: usize,
        /// Configured limit
        max: usize,
    },

    /// Mode is not one of the supported values
    #[error("Unknown mode '{0}'")]
    InvalidMode(String),

    /// Topic type is not one of the supported values
    #[error("Unknown topic type '{0}'")]
    InvalidTopicType(String),

    /// Content screen matched
    #[error("Content screen matched category {0}")]
    UnsafeContent(ContentCategory),
}

impl Classify for RejectionReason {
    fn classify(&self) -> ClassifiedError {
        let code = match self {
            RejectionReason::EmptyInput => ErrorCode::EmptyInput,
            RejectionReason::TooLong { .. } => ErrorCode::TooLong,
            RejectionReason::InvalidMode(_) => ErrorCode::InvalidMode,
            RejectionReason::InvalidTopicType(_) => ErrorCode::InvalidTopicType,
            RejectionReason::UnsafeContent(_) => ErrorCode::UnsafeContent,
        };
        ClassifiedError::with_detail(code, self.to_string())
    }
}

/// Normalise raw learner text
///
/// CRLF becomes LF, control characters other than newline and tab are
/// removed, and surrounding whitespace is trimmed.
pub fn sanitize(raw: &str) -> String {
    raw.replace("\r\n", "\n")
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect::<String>()
        .trim()
        .to_string()
}

/// The Gatekeeper validates learner input before a prompt is built
#[derive(Debug, Clone)]
pub struct Gatekeeper {
    config: ValidationConfig,
    screen: ContentScreen,
}

impl Gatekeeper {
    /// Create a new Gatekeeper with the given configuration
    pub fn new(config: ValidationConfig) -> Self {
        let screen = ContentScreen::from_config(&config);
        Self { config, screen }
    }

    /// Create a Gatekeeper after checking the configuration
    pub fn try_new(config: ValidationConfig) -> Result<Self, GatekeeperError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Create a Gatekeeper with default configuration
    pub fn default_config() -> Self {
        Self::new(ValidationConfig::default())
    }

    /// Active configuration
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate raw input against the configured rules
    ///
    /// Checks run in a fixed order and stop at the first failure: empty
    /// input, length, mode, topic type, content screen. A `None` topic type
    /// is inferred from the text.
    ///
    /// # Errors
    ///
    /// A `validation/*` error naming the first rule that failed.
    pub fn validate(
        &self,
        raw_input: &str,
        raw_mode: &str,
        raw_topic: Option<&str>,
    ) -> Result<LearningRequest, ClassifiedError> {
        self.check(raw_input, raw_mode, raw_topic).map_err(|reason| {
            debug!(reason = %reason, "Input rejected");
            reason.classify()
        })
    }

    /// Same checks as [`Gatekeeper::validate`], returning the unclassified reason
    pub fn check(
        &self,
        raw_input: &str,
        raw_mode: &str,
        raw_topic: Option<&str>,
    ) -> Result<LearningRequest, RejectionReason> {
        let input = sanitize(raw_input);

        // 1. Empty input
        if input.is_empty() {
            return Err(RejectionReason::EmptyInput);
        }

        // 2. Length, in code points
        let chars = input.chars().count();
        if chars > self.config.max_input_chars {
            return Err(RejectionReason::TooLong {
                chars,
                max: self.config.max_input_chars,
            });
        }

        // 3. Mode
        let mode = LearningMode::parse(raw_mode)
            .ok_or_else(|| RejectionReason::InvalidMode(clip(raw_mode)))?;

        // 4. Topic type, explicit or inferred
        let topic_type = match raw_topic {
            Some(raw) => TopicType::parse(raw)
                .ok_or_else(|| RejectionReason::InvalidTopicType(clip(raw)))?,
            None => infer_topic_type(&input),
        };

        // 5. Content screen
        if self.config.screen_content {
            if let Some(category) = self.screen.check(&input) {
                return Err(RejectionReason::UnsafeContent(category));
            }
        }

        Ok(LearningRequest::new(input, mode, topic_type))
    }
}

impl Default for Gatekeeper {
    fn default() -> Self {
        Self::default_config()
    }
}

/// Keep caller-supplied enum values short in diagnostics
fn clip(raw: &str) -> String {
    raw.chars().take(32).collect()
}
