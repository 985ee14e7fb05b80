//! Learning modes and topic types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Output format requested by the learner
///
/// Each mode has its own prompt template and its own completeness rules:
/// - Beginner: step-by-step explanation with worked examples
/// - Summary: condensed explanation only
/// - Quiz: explanation plus multiple-choice questions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LearningMode {
    /// Step-by-step explanation with 1-3 examples
    Beginner,

    /// Condensed explanation, no questions
    Summary,

    /// Explanation plus multiple-choice questions
    Quiz,
}

impl LearningMode {
    /// All modes, in display order
    pub const ALL: [LearningMode; 3] = [
        LearningMode::Beginner,
        LearningMode::Summary,
        LearningMode::Quiz,
    ];

    /// Get the mode name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            LearningMode::Beginner => "beginner",
            LearningMode::Summary => "summary",
            LearningMode::Quiz => "quiz",
        }
    }

    /// Parse a mode from user input
    ///
    /// Surrounding whitespace and letter case are ignored.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Some(LearningMode::Beginner),
            "summary" => Some(LearningMode::Summary),
            "quiz" => Some(LearningMode::Quiz),
            _ => None,
        }
    }

    /// Whether responses in this mode carry quiz questions
    pub fn has_questions(&self) -> bool {
        matches!(self, LearningMode::Quiz)
    }
}

impl std::str::FromStr for LearningMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid mode: {}", s))
    }
}

impl fmt::Display for LearningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of material the learner submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicType {
    /// A concept or question in prose
    #[default]
    Concept,

    /// A code snippet
    Code,
}

impl TopicType {
    /// Get the topic type name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            TopicType::Concept => "concept",
            TopicType::Code => "code",
        }
    }

    /// Parse a topic type from user input
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "concept" => Some(TopicType::Concept),
            "code" => Some(TopicType::Code),
            _ => None,
        }
    }
}

impl std::str::FromStr for TopicType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid topic type: {}", s))
    }
}

impl fmt::Display for TopicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
