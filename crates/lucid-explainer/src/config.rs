//! Configuration for the Explainer

use crate::ExplainerError;
use lucid_domain::{ExpectedShape, LearningMode, MAX_EXAMPLES};
use serde::{Deserialize, Serialize};

/// Upper bound accepted for `max_questions`
pub const QUESTION_LIMIT: usize = 10;

/// Configuration for the Explainer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplainerConfig {
    /// Re-ask the provider once with a stricter prompt after malformed output
    pub retry_malformed: bool,

    /// Maximum examples kept in a response (1-3)
    pub max_examples: usize,

    /// Maximum quiz questions kept in a response
    pub max_questions: usize,
}

impl ExplainerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ExplainerError> {
        if self.max_examples == 0 || self.max_examples > MAX_EXAMPLES {
            return Err(ExplainerError::Config(format!(
                "max_examples must be between 1 and {}",
                MAX_EXAMPLES
            )));
        }
        if self.max_questions == 0 || self.max_questions > QUESTION_LIMIT {
            return Err(ExplainerError::Config(format!(
                "max_questions must be between 1 and {}",
                QUESTION_LIMIT
            )));
        }
        Ok(())
    }

    /// Expected response shape for a mode under this configuration
    pub fn shape_for(&self, mode: LearningMode) -> ExpectedShape {
        ExpectedShape::for_mode(mode)
            .with_max_examples(self.max_examples)
            .with_max_questions(self.max_questions)
    }
}

impl Default for ExplainerConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            retry_malformed: true,
            max_examples: MAX_EXAMPLES,
            max_questions: ExpectedShape::DEFAULT_MAX_QUESTIONS,
        }
    }
}

impl ExplainerConfig {
    /// Strict preset: no second provider call, shorter responses
    pub fn strict() -> Self {
        Self {
            retry_malformed: false,
            max_examples: 2,
            max_questions: 3,
        }
    }

    /// Permissive preset: retry malformed output, longer quizzes
    pub fn permissive() -> Self {
        Self {
            retry_malformed: true,
            max_examples: MAX_EXAMPLES,
            max_questions: QUESTION_LIMIT,
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ExplainerError> {
        toml::from_str(toml_str)
            .map_err(|e| ExplainerError::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ExplainerError> {
        toml::to_string_pretty(self)
            .map_err(|e| ExplainerError::Config(format!("Failed to serialize to TOML: {}", e)))
    }
}
