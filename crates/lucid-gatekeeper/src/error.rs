//! Gatekeeper error types

use lucid_domain::{ClassifiedError, Classify, ErrorCode};
use thiserror::Error;

/// Errors raised while setting up a gatekeeper
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatekeeperError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Classify for GatekeeperError {
    fn classify(&self) -> ClassifiedError {
        ClassifiedError::with_detail(ErrorCode::InvalidConfig, self.to_string())
    }
}
