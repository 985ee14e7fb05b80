//! Response module - formatted learning content

use crate::mode::LearningMode;
use serde::{Deserialize, Serialize};

/// Upper bound on worked examples in any response
pub const MAX_EXAMPLES: usize = 3;

/// A multiple-choice question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    /// Question text
    pub question: String,

    /// Answer options (3-4, unique)
    pub options: Vec<String>,

    /// The correct option, verbatim
    pub correct_answer: String,

    /// Why the correct answer is correct
    pub explanation: String,
}

impl QuizQuestion {
    /// Check the question invariants
    ///
    /// All text fields must be non-empty, there must be 3 or 4 distinct
    /// options, and `correct_answer` must be one of them.
    pub fn validate(&self) -> Result<(), String> {
        if self.question.trim().is_empty() {
            return Err("question text is empty".to_string());
        }
        if self.explanation.trim().is_empty() {
            return Err("question explanation is empty".to_string());
        }
        if !(3..=4).contains(&self.options.len()) {
            return Err(format!(
                "expected 3 or 4 options, found {}",
                self.options.len()
            ));
        }
        if self.options.iter().any(|o| o.trim().is_empty()) {
            return Err("an option is empty".to_string());
        }
        for (i, option) in self.options.iter().enumerate() {
            if self.options[..i].contains(option) {
                return Err(format!("duplicate option '{}'", option));
            }
        }
        if !self.options.contains(&self.correct_answer) {
            return Err(format!(
                "correct answer '{}' is not one of the options",
                self.correct_answer
            ));
        }
        Ok(())
    }
}

/// Structured content returned for a learning request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningResponse {
    /// Main explanation text
    pub explanation: String,

    /// Worked examples, at most three
    pub examples: Vec<String>,

    /// Quiz questions (empty unless mode is quiz)
    pub questions: Vec<QuizQuestion>,

    /// Mode the response was produced for
    pub mode: LearningMode,

    /// Wall-clock time from acceptance to formatting, in milliseconds
    #[serde(rename = "processing_time")]
    pub processing_time_ms: u64,
}

impl LearningResponse {
    /// Check the per-mode response invariants
    pub fn validate(&self) -> Result<(), String> {
        if self.examples.len() > MAX_EXAMPLES {
            return Err(format!(
                "{} examples exceeds the maximum of {}",
                self.examples.len(),
                MAX_EXAMPLES
            ));
        }

        if self.mode.has_questions() {
            if self.questions.is_empty() {
                return Err("quiz response has no questions".to_string());
            }
            for (idx, question) in self.questions.iter().enumerate() {
                question
                    .validate()
                    .map_err(|e| format!("question {}: {}", idx + 1, e))?;
            }
        } else {
            if !self.questions.is_empty() {
                return Err(format!("{} response carries questions", self.mode));
            }
            if self.explanation.trim().is_empty() {
                return Err(format!("{} response has no explanation", self.mode));
            }
        }

        Ok(())
    }
}
