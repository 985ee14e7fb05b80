//! Lucid Domain Layer
//!
//! This crate contains the value objects and trait interfaces shared by every
//! other Lucid crate. It performs no I/O: the validator, provider backends,
//! parser and HTTP surface all live in their own crates and meet here.
//!
//! ## Key Concepts
//!
//! - **LearningRequest**: validated user text plus the requested learning mode
//! - **LearningResponse**: the explanation, examples and quiz questions returned
//! - **PromptSpec**: provider-agnostic instructions and the shape expected back
//! - **ClassifiedError**: the only error type that crosses the HTTP boundary
//!
//! ## Lifetime
//!
//! Every type here is request-scoped. Nothing is cached or persisted between
//! calls; `ProviderConfig` is the only value shared across requests and it is
//! read-only.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod mode;
pub mod prompt;
pub mod provider;
pub mod request;
pub mod response;
pub mod traits;

// Re-exports for convenience
pub use error::{classify, Classify, ClassifiedError, ErrorCode, ErrorKind};
pub use mode::{LearningMode, TopicType};
pub use prompt::{ExpectedShape, PromptSpec};
pub use provider::{ApiKey, ProviderConfig, ProviderKind};
pub use request::{LearningRequest, RequestId, MAX_INPUT_CHARS};
pub use response::{LearningResponse, QuizQuestion, MAX_EXAMPLES};
pub use traits::LlmProvider;
