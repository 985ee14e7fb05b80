//! Request module - validated learner input

use crate::mode::{LearningMode, TopicType};
use chrono::{DateTime, Utc};
use std::fmt;

/// Maximum accepted input length, counted in Unicode code points
pub const MAX_INPUT_CHARS: usize = 2000;

/// Correlation identifier for a single request, based on UUIDv7
///
/// Only used to tie log lines together; it is never returned to the caller
/// and never used as a lookup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u128);

impl RequestId {
    /// Generate a new UUIDv7-based RequestId
    ///
    /// # Examples
    ///
    /// ```
    /// use lucid_domain::RequestId;
    ///
    /// let id = RequestId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// A learner request that has passed input validation
///
/// Fields are private: the only way to obtain one is through the validator,
/// so holding a `LearningRequest` means the length, mode and content checks
/// have already succeeded. It is immutable from then on.
#[derive(Debug, Clone, PartialEq)]
pub struct LearningRequest {
    input: String,
    mode: LearningMode,
    topic_type: TopicType,
    submitted_at: DateTime<Utc>,
}

impl LearningRequest {
    /// Create a request from already-sanitized parts
    ///
    /// Callers are expected to have enforced the input invariants; this
    /// constructor does not repeat them.
    pub fn new(input: String, mode: LearningMode, topic_type: TopicType) -> Self {
        Self {
            input,
            mode,
            topic_type,
            submitted_at: Utc::now(),
        }
    }

    /// Sanitized input text
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Requested learning mode
    pub fn mode(&self) -> LearningMode {
        self.mode
    }

    /// Explicit or inferred topic type
    pub fn topic_type(&self) -> TopicType {
        self.topic_type
    }

    /// When the request was accepted
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    /// Input length in code points
    pub fn input_chars(&self) -> usize {
        self.input.chars().count()
    }
}
