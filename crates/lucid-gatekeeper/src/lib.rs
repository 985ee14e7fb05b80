//! Lucid Gatekeeper
//!
//! Screens learner input before anything is sent to a provider.
//!
//! The Gatekeeper provides:
//! - Sanitization (line endings, control characters, surrounding whitespace)
//! - Length checks counted in code points
//! - Mode and topic type parsing, with topic inference when none is given
//! - A keyword content screen
//!
//! It is a pure function of its input and configuration: no I/O, no state.
//!
//! # Examples
//!
//! ```
//! use lucid_gatekeeper::{Gatekeeper, ValidationConfig};
//! use lucid_domain::{LearningMode, TopicType};
//!
//! let gatekeeper = Gatekeeper::new(ValidationConfig::default());
//!
//! let request = gatekeeper.validate("  recursion  ", "beginner", None).unwrap();
//! assert_eq!(request.input(), "recursion");
//! assert_eq!(request.mode(), LearningMode::Beginner);
//! assert_eq!(request.topic_type(), TopicType::Concept);
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod screen;
mod validator;

pub use config::ValidationConfig;
pub use error::GatekeeperError;
pub use screen::{infer_topic_type, ContentCategory, ContentScreen};
pub use validator::{sanitize, Gatekeeper, RejectionReason};
