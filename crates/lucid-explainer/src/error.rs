//! Error types for the Explainer

use lucid_domain::{ClassifiedError, Classify, ErrorCode};
use thiserror::Error;

/// Errors raised while turning provider output into a response
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExplainerError {
    /// Output looked like JSON but did not parse
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// Nothing usable in the output
    #[error("No usable content: {0}")]
    NoContent(String),

    /// A mode that needs an explanation did not get one
    #[error("Response has no explanation")]
    MissingExplanation,

    /// Fewer examples than the mode requires
    #[error("Response has {found} usable examples, {required} required")]
    TooFewExamples {
        /// Examples found after cleanup
        found: usize,
        /// Minimum for the mode
        required: usize,
    },

    /// Quiz output without a single valid question
    #[error("No valid quiz questions ({discarded} discarded)")]
    NoValidQuestions {
        /// Questions dropped during repair
        discarded: usize,
    },

    /// Assembled response broke an invariant
    #[error("Response failed final check: {0}")]
    Invariant(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Classify for ExplainerError {
    fn classify(&self) -> ClassifiedError {
        let code = match self {
            ExplainerError::Config(_) => ErrorCode::InvalidConfig,
            _ => ErrorCode::MalformedResponse,
        };
        ClassifiedError::with_detail(code, self.to_string())
    }
}

impl From<serde_json::Error> for ExplainerError {
    fn from(e: serde_json::Error) -> Self {
        ExplainerError::JsonParse(e.to_string())
    }
}
