//! Gatekeeper configuration

use crate::GatekeeperError;
use lucid_domain::MAX_INPUT_CHARS;
use serde::{Deserialize, Serialize};

/// Configuration for validation rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Longest accepted input in code points (at most 2000)
    pub max_input_chars: usize,

    /// Enable the keyword content screen
    pub screen_content: bool,

    /// Extra phrases rejected as unsafe, on top of the built-in list
    pub blocked_terms: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_input_chars: MAX_INPUT_CHARS,
            screen_content: true,
            blocked_terms: Vec::new(),
        }
    }
}

impl ValidationConfig {
    /// Create a permissive configuration (length and mode checks only)
    pub fn permissive() -> Self {
        Self {
            max_input_chars: MAX_INPUT_CHARS,
            screen_content: false,
            blocked_terms: Vec::new(),
        }
    }

    /// Create a strict configuration (shorter inputs, extra jailbreak phrases)
    pub fn strict() -> Self {
        Self {
            max_input_chars: 1000,
            screen_content: true,
            blocked_terms: vec![
                "jailbreak".to_string(),
                "developer mode enabled".to_string(),
                "pretend you have no rules".to_string(),
            ],
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), GatekeeperError> {
        if self.max_input_chars == 0 || self.max_input_chars > MAX_INPUT_CHARS {
            return Err(GatekeeperError::Config(format!(
                "max_input_chars must be between 1 and {}, got {}",
                MAX_INPUT_CHARS, self.max_input_chars
            )));
        }
        if self.blocked_terms.iter().any(|t| t.trim().is_empty()) {
            return Err(GatekeeperError::Config(
                "blocked_terms cannot contain empty entries".to_string(),
            ));
        }
        Ok(())
    }
}
