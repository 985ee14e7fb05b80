//! Provider-agnostic prompt description

use crate::mode::LearningMode;
use crate::response::MAX_EXAMPLES;

/// Which parts of a provider response are mandatory for a mode
///
/// Built alongside the prompt so the parser checks exactly what the prompt
/// asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpectedShape {
    /// Mode the shape belongs to
    pub mode: LearningMode,

    /// Explanation must be non-empty
    pub requires_explanation: bool,

    /// Minimum number of usable examples
    pub min_examples: usize,

    /// Examples beyond this count are dropped
    pub max_examples: usize,

    /// At least one valid quiz question is required
    pub requires_questions: bool,

    /// Questions beyond this count are dropped
    pub max_questions: usize,
}

impl ExpectedShape {
    /// Default maximum number of quiz questions kept
    pub const DEFAULT_MAX_QUESTIONS: usize = 5;

    /// Shape for a learning mode
    pub fn for_mode(mode: LearningMode) -> Self {
        match mode {
            LearningMode::Beginner => Self {
                mode,
                requires_explanation: true,
                min_examples: 1,
                max_examples: MAX_EXAMPLES,
                requires_questions: false,
                max_questions: 0,
            },
            LearningMode::Summary => Self {
                mode,
                requires_explanation: true,
                min_examples: 0,
                max_examples: MAX_EXAMPLES,
                requires_questions: false,
                max_questions: 0,
            },
            LearningMode::Quiz => Self {
                mode,
                requires_explanation: false,
                min_examples: 0,
                max_examples: MAX_EXAMPLES,
                requires_questions: true,
                max_questions: Self::DEFAULT_MAX_QUESTIONS,
            },
        }
    }

    /// Override the example cap (never above [`MAX_EXAMPLES`])
    pub fn with_max_examples(mut self, max: usize) -> Self {
        self.max_examples = max.min(MAX_EXAMPLES);
        self.min_examples = self.min_examples.min(self.max_examples);
        self
    }

    /// Override the question cap (ignored for modes without questions)
    pub fn with_max_questions(mut self, max: usize) -> Self {
        if self.requires_questions {
            self.max_questions = max.max(1);
        }
        self
    }
}

/// Instructions for a provider plus the shape of the expected answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSpec {
    /// Role and tone instructions (sent as the system message where supported)
    pub system_text: String,

    /// The full task, including the learner's input and the output format
    pub instruction_text: String,

    /// What the parser must find in the answer
    pub expected_shape: ExpectedShape,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beginner_shape_requires_examples() {
        let shape = ExpectedShape::for_mode(LearningMode::Beginner);
        assert!(shape.requires_explanation);
        assert_eq!(shape.min_examples, 1);
        assert!(!shape.requires_questions);
    }

    #[test]
    fn test_quiz_shape_requires_questions() {
        let shape = ExpectedShape::for_mode(LearningMode::Quiz);
        assert!(shape.requires_questions);
        assert_eq!(shape.max_questions, ExpectedShape::DEFAULT_MAX_QUESTIONS);
    }

    #[test]
    fn test_max_examples_is_capped() {
        let shape = ExpectedShape::for_mode(LearningMode::Beginner).with_max_examples(10);
        assert_eq!(shape.max_examples, MAX_EXAMPLES);
    }

    #[test]
    fn test_max_questions_ignored_for_summary() {
        let shape = ExpectedShape::for_mode(LearningMode::Summary).with_max_questions(4);
        assert_eq!(shape.max_questions, 0);
    }
}
