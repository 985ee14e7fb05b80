//! Lucid Explainer
//!
//! Turns a learner's question into structured teaching content using an LLM.
//!
//! # Architecture
//!
//! ```text
//! raw input → Gatekeeper → PromptBuilder → ProviderAdapter → parser → LearningResponse
//! ```
//!
//! Every stage reports failures as a [`lucid_domain::ClassifiedError`], so
//! callers only ever see one error type with a stable code.
//!
//! # Example Usage
//!
//! ```no_run
//! use lucid_domain::{ApiKey, ProviderConfig, ProviderKind};
//! use lucid_explainer::{Explainer, ExplainerConfig};
//! use lucid_gatekeeper::Gatekeeper;
//! use lucid_llm::{MockProvider, ProviderAdapter};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new(r#"{"explanation": "A function calling itself.", "examples": ["fact(3)"]}"#);
//! let provider_config = ProviderConfig::new(ProviderKind::Ollama, ApiKey::default(), "llama3");
//!
//! let explainer = Explainer::new(
//!     Gatekeeper::default_config(),
//!     ProviderAdapter::new(Arc::new(llm)),
//!     Arc::new(provider_config),
//!     ExplainerConfig::default(),
//! );
//!
//! let response = explainer.explain("recursion", "beginner", None).await?;
//! println!("{}", response.explanation);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod explainer;
pub mod parser;
pub mod prompt;

#[cfg(test)]
mod tests;

pub use config::{ExplainerConfig, QUESTION_LIMIT};
pub use error::ExplainerError;
pub use explainer::Explainer;
pub use parser::format;
pub use prompt::PromptBuilder;
