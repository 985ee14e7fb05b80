//! Parse provider output into a learning response
//!
//! The prompt asks for a single JSON object, but providers wrap it in code
//! fences, surround it with chatter, or ignore the format entirely. Parsing
//! therefore runs in two stages:
//!
//! 1. Locate the content. An answer that is (or is fenced around) a JSON
//!    object must parse; a JSON object buried in prose is used when it has
//!    recognisable keys; anything else goes through header-based text
//!    extraction.
//! 2. Assemble and check. Examples are trimmed and capped, quiz questions are
//!    repaired (labels stripped, letter answers resolved, duplicates removed)
//!    or dropped, and the per-mode completeness rules are enforced.
//!
//! Nothing is ever filled in: a missing required field is an error.

use crate::error::ExplainerError;
use lucid_domain::{ClassifiedError, Classify, ExpectedShape, LearningResponse, QuizQuestion};
use serde_json::{Map, Value};
use std::time::Instant;
use tracing::{debug, warn};

/// Keys that mark a JSON object as an answer rather than a code sample
const ANSWER_KEYS: &[&str] = &["explanation", "summary", "examples", "questions", "quiz"];

/// Provider output before any per-mode checks
#[derive(Debug, Default, Clone, PartialEq)]
struct Draft {
    explanation: String,
    examples: Vec<String>,
    questions: Vec<DraftQuestion>,
}

#[derive(Debug, Default, Clone, PartialEq)]
struct DraftQuestion {
    question: String,
    options: Vec<String>,
    answer: String,
    explanation: String,
}

impl DraftQuestion {
    fn is_blank(&self) -> bool {
        self.question.is_empty()
            && self.options.is_empty()
            && self.answer.is_empty()
            && self.explanation.is_empty()
    }
}

/// Format raw provider text for the shape the prompt asked for
///
/// `started` is the moment the request was accepted; the response's
/// processing time runs from there to the end of formatting.
///
/// # Errors
///
/// `ai_service/malformed_response` when the output cannot be parsed or lacks
/// a field the mode requires.
pub fn format(
    raw_text: &str,
    shape: &ExpectedShape,
    started: Instant,
) -> Result<LearningResponse, ClassifiedError> {
    parse_response(raw_text, shape, started).map_err(|e| e.classify())
}

/// Same as [`format`], returning the unclassified reason
pub fn parse_response(
    raw_text: &str,
    shape: &ExpectedShape,
    started: Instant,
) -> Result<LearningResponse, ExplainerError> {
    let draft = parse_draft(raw_text)?;
    assemble(draft, shape, started)
}

fn parse_draft(raw: &str) -> Result<Draft, ExplainerError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ExplainerError::NoContent("provider returned only whitespace".to_string()));
    }

    // The whole answer is a (possibly fenced) JSON object: it has to parse
    let body = if trimmed.starts_with("```") {
        strip_fence(trimmed)
    } else {
        trimmed
    };
    if body.starts_with('{') {
        let value = leading_value(body)?;
        debug!("Parsed structured provider output");
        return draft_from_json(&value);
    }

    // A JSON answer surrounded by prose
    if let Some(value) = find_embedded_object(trimmed) {
        debug!("Parsed JSON object embedded in prose");
        return draft_from_json(&value);
    }

    debug!("Falling back to header-based text extraction");
    Ok(draft_from_text(trimmed))
}

/// Content of the first fenced block, without the language tag
fn strip_fence(text: &str) -> &str {
    let Some(open) = text.find("```") else {
        return text;
    };
    let after = &text[open + 3..];
    let content_start = after.find('\n').map_or(after.len(), |i| i + 1);
    let content = &after[content_start..];
    let close = content.find("```").unwrap_or(content.len());
    content[..close].trim()
}

/// First JSON value in `text`; whatever follows it is ignored
fn leading_value(text: &str) -> Result<Value, serde_json::Error> {
    let mut values = serde_json::Deserializer::from_str(text).into_iter::<Value>();
    match values.next() {
        Some(value) => value,
        None => serde_json::from_str(text),
    }
}

fn find_embedded_object(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let value = leading_value(&text[start..]).ok()?;
    let is_answer = value
        .as_object()
        .is_some_and(|obj| ANSWER_KEYS.iter().any(|k| obj.contains_key(*k)));
    is_answer.then_some(value)
}

// ---------------------------------------------------------------------------
// JSON extraction
// ---------------------------------------------------------------------------

fn draft_from_json(value: &Value) -> Result<Draft, ExplainerError> {
    let obj = value
        .as_object()
        .ok_or_else(|| ExplainerError::NoContent("expected a JSON object".to_string()))?;

    let explanation = text_field(obj, &["explanation", "summary", "overview"]).unwrap_or_default();

    let examples = match obj.get("examples") {
        Some(Value::Array(items)) => items.iter().filter_map(example_from_json).collect(),
        Some(Value::String(s)) => vec![s.clone()],
        _ => Vec::new(),
    };

    let questions = ["questions", "quiz"]
        .iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_array))
        .map(|items| items.iter().map(question_from_json).collect())
        .unwrap_or_default();

    Ok(Draft {
        explanation,
        examples,
        questions,
    })
}

/// First non-empty text under any of `keys`; arrays of strings are joined
/// line by line
fn text_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match obj.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(parts) => {
            let lines: Vec<&str> = parts.iter().filter_map(Value::as_str).collect();
            (!lines.is_empty()).then(|| lines.join("\n"))
        }
        _ => None,
    })
}

fn example_from_json(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) => {
            let title = text_field(obj, &["title", "name"]);
            let body = text_field(
                obj,
                &["content", "description", "text", "example", "code", "explanation", "output"],
            );
            match (title, body) {
                (Some(t), Some(b)) => Some(format!("{}: {}", t.trim(), b.trim())),
                (Some(t), None) => Some(t),
                (None, b) => b,
            }
        }
        _ => None,
    }
}

fn question_from_json(value: &Value) -> DraftQuestion {
    let Some(obj) = value.as_object() else {
        return DraftQuestion::default();
    };

    let options = match obj.get("options").or_else(|| obj.get("choices")) {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
        // {"A": "...", "B": "..."} keeps key order, which is alphabetical
        Some(Value::Object(map)) => map.values().filter_map(scalar_text).collect(),
        _ => Vec::new(),
    };

    DraftQuestion {
        question: text_field(obj, &["question", "prompt", "text"]).unwrap_or_default(),
        options,
        answer: text_field(obj, &["correct_answer", "correctAnswer", "answer", "correct"])
            .unwrap_or_default(),
        explanation: text_field(obj, &["explanation", "rationale", "reason"]).unwrap_or_default(),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Text extraction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Explanation,
    Examples,
    Questions,
}

struct Header {
    section: Section,
    rest: String,
}

/// Recognise lines such as `## Examples`, `**Explanation:** text` or
/// `Example 2: text`
fn split_header(line: &str) -> Option<Header> {
    let cleaned = line.trim().trim_start_matches('#').trim().replace("**", "");
    let (head, rest) = match cleaned.find(':') {
        Some(i) => (&cleaned[..i], cleaned[i + 1..].trim()),
        None => (cleaned.as_str(), ""),
    };
    let head = head.trim().trim_matches('*').trim().to_lowercase();

    let section = match head.as_str() {
        "explanation" | "summary" | "overview" | "step-by-step explanation" => {
            Section::Explanation
        }
        "example" | "examples" => Section::Examples,
        "question" | "questions" | "quiz" | "quiz questions" => Section::Questions,
        other => {
            let number = other.strip_prefix("example")?.trim();
            if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            Section::Examples
        }
    };

    Some(Header {
        section,
        rest: rest.to_string(),
    })
}

fn strip_bullet(line: &str) -> Option<&str> {
    let t = line.trim_start();
    for bullet in ["- ", "* ", "• "] {
        if let Some(rest) = t.strip_prefix(bullet) {
            return Some(rest.trim());
        }
    }
    numbered_item(t)
}

/// `1. text` or `2) text`
fn numbered_item(line: &str) -> Option<&str> {
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let rest = &line[digits..];
    let rest = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')'))?;
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.trim())
}

fn draft_from_text(text: &str) -> Draft {
    let mut section = Section::Explanation;
    let mut explanation: Vec<String> = Vec::new();
    let mut examples: Vec<String> = Vec::new();
    let mut example_open = false;
    let mut question_lines: Vec<&str> = Vec::new();

    for line in text.lines() {
        if section != Section::Questions && opens_quiz(line) {
            section = Section::Questions;
            example_open = false;
            question_lines.push(line);
            continue;
        }

        if let Some(header) = split_header(line) {
            // "Explanation: ..." and "Question: ..." inside the quiz belong to a question
            let quiz_line = section == Section::Questions
                && header.section != Section::Examples
                && !header.rest.is_empty();

            if !quiz_line {
                section = header.section;
                example_open = false;
                if !header.rest.is_empty() {
                    match section {
                        Section::Explanation => explanation.push(header.rest),
                        Section::Examples => {
                            examples.push(header.rest);
                            example_open = true;
                        }
                        Section::Questions => question_lines.push(line),
                    }
                }
                continue;
            }
        }

        match section {
            Section::Explanation => explanation.push(line.to_string()),
            Section::Examples => {
                if line.trim().is_empty() {
                    example_open = false;
                } else if let Some(item) = strip_bullet(line) {
                    examples.push(item.to_string());
                    example_open = true;
                } else if let (true, Some(last)) = (example_open, examples.last_mut()) {
                    last.push('\n');
                    last.push_str(line.trim_end());
                } else {
                    examples.push(line.trim().to_string());
                    example_open = true;
                }
            }
            Section::Questions => question_lines.push(line),
        }
    }

    Draft {
        explanation: explanation.join("\n").trim().to_string(),
        examples,
        questions: questions_from_text(&question_lines),
    }
}

/// `Question 1: ...` or `Q2. ...` starts the quiz even without a header
fn opens_quiz(line: &str) -> bool {
    let t = line.trim();
    strip_prefix_ci(t, &["question", "q"])
        .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
        && question_start(t).is_some()
}

fn questions_from_text(lines: &[&str]) -> Vec<DraftQuestion> {
    let mut questions = Vec::new();
    let mut current = DraftQuestion::default();

    for line in lines {
        let t = line.trim();
        if t.is_empty() {
            continue;
        }

        if let Some(rest) = strip_prefix_ci(t, &["correct answer:", "answer:", "correct:"]) {
            current.answer = rest.to_string();
        } else if let Some(rest) = strip_prefix_ci(t, &["explanation:", "rationale:", "why:"]) {
            current.explanation = rest.to_string();
        } else if split_option_label(t).is_some() {
            current.options.push(t.to_string());
        } else if let Some(text) = question_start(t) {
            if !current.is_blank() {
                questions.push(std::mem::take(&mut current));
            }
            current.question = text.to_string();
        } else if current.question.is_empty() {
            current.question = t.to_string();
        } else if current.options.is_empty() {
            current.question.push(' ');
            current.question.push_str(t);
        } else if !current.explanation.is_empty() {
            current.explanation.push(' ');
            current.explanation.push_str(t);
        }
    }

    if !current.is_blank() {
        questions.push(current);
    }
    questions
}

fn strip_prefix_ci<'a>(line: &'a str, prefixes: &[&str]) -> Option<&'a str> {
    prefixes.iter().find_map(|prefix| {
        let head = line.get(..prefix.len())?;
        head.eq_ignore_ascii_case(prefix)
            .then(|| line[prefix.len()..].trim())
    })
}

/// `Question 3: text`, `Q2. text` or `1) text`
fn question_start(line: &str) -> Option<&str> {
    if let Some(rest) = strip_prefix_ci(line, &["question:"]) {
        return Some(rest);
    }
    let rest = strip_prefix_ci(line, &["question"])
        .or_else(|| {
            let after_q = strip_prefix_ci(line, &["q"])?;
            after_q.starts_with(|c: char| c.is_ascii_digit()).then_some(after_q)
        })
        .unwrap_or(line);

    let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let after = &rest[digits..];
    let after = after
        .strip_prefix('.')
        .or_else(|| after.strip_prefix(')'))
        .or_else(|| after.strip_prefix(':'))?;
    Some(after.trim())
}

// ---------------------------------------------------------------------------
// Quiz question repair
// ---------------------------------------------------------------------------

/// Split `A) text`, `(b) text`, `C. text` or `d: text` into index and text
fn split_option_label(text: &str) -> Option<(usize, &str)> {
    let t = text.trim_start();
    let (letter, rest) = if let Some(inner) = t.strip_prefix('(') {
        let mut chars = inner.chars();
        let letter = chars.next()?;
        (letter, chars.as_str().strip_prefix(')')?)
    } else {
        let mut chars = t.chars();
        let letter = chars.next()?;
        let after = chars.as_str();
        let rest = after
            .strip_prefix(')')
            .or_else(|| after.strip_prefix('.'))
            .or_else(|| after.strip_prefix(':'))?;
        (letter, rest)
    };

    let index = letter_to_index(letter)?;
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some((index, rest.trim()))
}

fn letter_to_index(letter: char) -> Option<usize> {
    match letter.to_ascii_lowercase() {
        c @ 'a'..='d' => Some((c as u8 - b'a') as usize),
        _ => None,
    }
}

fn strip_option_label(text: &str) -> &str {
    match split_option_label(text) {
        Some((_, rest)) => rest,
        None => text.trim(),
    }
}

/// `B`, `b)`, `(C)`, `D.` or `Option A`
fn answer_letter(answer: &str) -> Option<usize> {
    let t = strip_prefix_ci(answer, &["option "]).unwrap_or(answer);
    let t = t
        .trim()
        .trim_start_matches('(')
        .trim_end_matches([')', '.', ':'])
        .trim();
    let mut chars = t.chars();
    let letter = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    letter_to_index(letter)
}

/// Map whatever the provider gave as the answer onto one option's text
fn resolve_answer(answer: &str, labelled: &[String], options: &[String]) -> Option<String> {
    let answer = answer.trim();
    if answer.is_empty() {
        return None;
    }
    if let Some(exact) = options.iter().find(|o| o.as_str() == answer) {
        return Some(exact.clone());
    }
    if let Some(index) = answer_letter(answer) {
        return labelled.get(index).filter(|o| !o.is_empty()).cloned();
    }
    let stripped = strip_option_label(answer).to_lowercase();
    options.iter().find(|o| o.to_lowercase() == stripped).cloned()
}

fn repair_question(draft: DraftQuestion) -> Result<QuizQuestion, String> {
    // Original positions, so letter answers still line up after dedup
    let labelled: Vec<String> = draft
        .options
        .iter()
        .map(|o| strip_option_label(o).to_string())
        .collect();

    let mut options: Vec<String> = Vec::with_capacity(labelled.len());
    for option in &labelled {
        if !option.is_empty() && !options.contains(option) {
            options.push(option.clone());
        }
    }

    let correct_answer = resolve_answer(&draft.answer, &labelled, &options)
        .ok_or_else(|| "correct answer matches no option".to_string())?;

    let question = QuizQuestion {
        question: draft.question.trim().to_string(),
        options,
        correct_answer,
        explanation: draft.explanation.trim().to_string(),
    };
    question.validate()?;
    Ok(question)
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

fn assemble(
    draft: Draft,
    shape: &ExpectedShape,
    started: Instant,
) -> Result<LearningResponse, ExplainerError> {
    let explanation = draft.explanation.trim().to_string();

    let mut examples: Vec<String> = draft
        .examples
        .iter()
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .collect();
    if examples.len() > shape.max_examples {
        debug!(
            found = examples.len(),
            kept = shape.max_examples,
            "Truncating examples"
        );
        examples.truncate(shape.max_examples);
    }

    let mut questions = Vec::new();
    let mut discarded = 0;
    if shape.requires_questions {
        for (idx, draft_question) in draft.questions.into_iter().enumerate() {
            match repair_question(draft_question) {
                Ok(question) => questions.push(question),
                Err(reason) => {
                    discarded += 1;
                    warn!(question = idx + 1, reason = %reason, "Discarding invalid quiz question");
                }
            }
        }
        if questions.len() > shape.max_questions {
            debug!(
                found = questions.len(),
                kept = shape.max_questions,
                "Truncating quiz questions"
            );
            questions.truncate(shape.max_questions);
        }
    } else if !draft.questions.is_empty() {
        debug!(
            count = draft.questions.len(),
            mode = %shape.mode,
            "Ignoring questions in a mode without a quiz"
        );
    }

    if shape.requires_explanation && explanation.is_empty() {
        return Err(ExplainerError::MissingExplanation);
    }
    if examples.len() < shape.min_examples {
        return Err(ExplainerError::TooFewExamples {
            found: examples.len(),
            required: shape.min_examples,
        });
    }
    if shape.requires_questions && questions.is_empty() {
        return Err(ExplainerError::NoValidQuestions { discarded });
    }

    let response = LearningResponse {
        explanation,
        examples,
        questions,
        mode: shape.mode,
        processing_time_ms: started.elapsed().as_millis() as u64,
    };
    response.validate().map_err(ExplainerError::Invariant)?;
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lucid_domain::{ErrorCode, ErrorKind, LearningMode};

    fn shape(mode: LearningMode) -> ExpectedShape {
        ExpectedShape::for_mode(mode)
    }

    fn parse(raw: &str, mode: LearningMode) -> Result<LearningResponse, ExplainerError> {
        parse_response(raw, &shape(mode), Instant::now())
    }

    const QUIZ_JSON: &str = r#"{
        "explanation": "Recursion is when a function calls itself.",
        "questions": [
            {
                "question": "What must every recursive function have?",
                "options": ["A base case", "A loop", "A global variable"],
                "correct_answer": "A base case",
                "explanation": "Without a base case the calls never stop."
            }
        ]
    }"#;

    #[test]
    fn test_parse_beginner_json() {
        let raw = r#"{"explanation": "A function that calls itself.", "examples": ["factorial(3) = 3 * factorial(2)"]}"#;
        let response = parse(raw, LearningMode::Beginner).unwrap();

        assert_eq!(response.explanation, "A function that calls itself.");
        assert_eq!(response.examples.len(), 1);
        assert!(response.questions.is_empty());
        assert_eq!(response.mode, LearningMode::Beginner);
    }

    #[test]
    fn test_parse_json_with_markdown_wrapper() {
        let raw = "```json\n{\"explanation\": \"Short.\", \"examples\": []}\n```";
        let response = parse(raw, LearningMode::Summary).unwrap();
        assert_eq!(response.explanation, "Short.");
    }

    #[test]
    fn test_parse_json_inside_prose() {
        let raw = "Sure! Here is your answer:\n{\"explanation\": \"Short.\", \"examples\": [\"one\"]}\nHope it helps.";
        let response = parse(raw, LearningMode::Beginner).unwrap();
        assert_eq!(response.examples, vec!["one"]);
    }

    #[test]
    fn test_broken_json_is_malformed() {
        let err = parse("{\"explanation\": \"unterminated", LearningMode::Summary).unwrap_err();
        assert!(matches!(err, ExplainerError::JsonParse(_)));

        let classified = err.classify();
        assert_eq!(classified.kind, ErrorKind::AiService);
        assert_eq!(classified.code, ErrorCode::MalformedResponse);
    }

    #[test]
    fn test_empty_output_is_malformed() {
        assert!(matches!(
            parse("   \n ", LearningMode::Summary),
            Err(ExplainerError::NoContent(_))
        ));
    }

    #[test]
    fn test_examples_truncated_in_order() {
        let raw = r#"{"explanation": "x", "examples": ["1", "2", "3", "4", "5"]}"#;
        let response = parse(raw, LearningMode::Beginner).unwrap();
        assert_eq!(response.examples, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_example_objects_flattened() {
        let raw = r#"{"explanation": "x", "examples": [
            {"title": "Factorial", "description": "n * fact(n - 1)"},
            {"code": "fib(n - 1) + fib(n - 2)"},
            42
        ]}"#;
        let response = parse(raw, LearningMode::Beginner).unwrap();
        assert_eq!(
            response.examples,
            vec!["Factorial: n * fact(n - 1)", "fib(n - 1) + fib(n - 2)"]
        );
    }

    #[test]
    fn test_beginner_without_examples_fails() {
        let raw = r#"{"explanation": "A function that calls itself.", "examples": ["  "]}"#;
        let err = parse(raw, LearningMode::Beginner).unwrap_err();
        assert_eq!(err, ExplainerError::TooFewExamples { found: 0, required: 1 });
    }

    #[test]
    fn test_summary_without_explanation_fails() {
        let raw = r#"{"explanation": "", "examples": ["one"]}"#;
        let err = parse(raw, LearningMode::Summary).unwrap_err();
        assert_eq!(err, ExplainerError::MissingExplanation);
    }

    #[test]
    fn test_explanation_steps_joined() {
        let raw = r#"{"explanation": ["Step 1: base case.", "Step 2: recursive case."], "examples": ["f(0)"]}"#;
        let response = parse(raw, LearningMode::Beginner).unwrap();
        assert_eq!(response.explanation, "Step 1: base case.\nStep 2: recursive case.");
    }

    #[test]
    fn test_summary_drops_questions() {
        let raw = r#"{"explanation": "Short.", "questions": [{"question": "q?"}]}"#;
        let response = parse(raw, LearningMode::Summary).unwrap();
        assert!(response.questions.is_empty());
    }

    #[test]
    fn test_parse_quiz_json() {
        let response = parse(QUIZ_JSON, LearningMode::Quiz).unwrap();

        assert_eq!(response.questions.len(), 1);
        let q = &response.questions[0];
        assert_eq!(q.correct_answer, "A base case");
        assert!(q.options.contains(&q.correct_answer));
        assert!(response.validate().is_ok());
    }

    #[test]
    fn test_quiz_letter_answer_and_labels() {
        let raw = r#"{"questions": [{
            "question": "Which is a base case for factorial?",
            "options": ["A) n == 0", "B) n == 10", "C) n < 0", "D) n > 1"],
            "answer": "a)",
            "rationale": "factorial(0) is 1."
        }]}"#;
        let response = parse(raw, LearningMode::Quiz).unwrap();

        let q = &response.questions[0];
        assert_eq!(q.options, vec!["n == 0", "n == 10", "n < 0", "n > 1"]);
        assert_eq!(q.correct_answer, "n == 0");
        assert_eq!(q.explanation, "factorial(0) is 1.");
    }

    #[test]
    fn test_quiz_answer_case_insensitive() {
        let raw = r#"{"questions": [{
            "question": "Capital of France?",
            "options": ["Paris", "Lyon", "Nice"],
            "correctAnswer": "paris",
            "explanation": "Paris is the capital."
        }]}"#;
        let response = parse(raw, LearningMode::Quiz).unwrap();
        assert_eq!(response.questions[0].correct_answer, "Paris");
    }

    #[test]
    fn test_quiz_option_map() {
        let raw = r#"{"questions": [{
            "question": "2 + 2?",
            "options": {"A": "3", "B": "4", "C": "5"},
            "correct_answer": "B",
            "explanation": "Basic arithmetic."
        }]}"#;
        let response = parse(raw, LearningMode::Quiz).unwrap();
        assert_eq!(response.questions[0].options, vec!["3", "4", "5"]);
        assert_eq!(response.questions[0].correct_answer, "4");
    }

    #[test]
    fn test_quiz_duplicate_options_removed() {
        let raw = r#"{"questions": [{
            "question": "Pick one",
            "options": ["red", "blue", "red", "green"],
            "correct_answer": "blue",
            "explanation": "Blue."
        }]}"#;
        let response = parse(raw, LearningMode::Quiz).unwrap();
        assert_eq!(response.questions[0].options, vec!["red", "blue", "green"]);
    }

    #[test]
    fn test_quiz_invalid_questions_dropped() {
        let raw = r#"{"questions": [
            {"question": "Too few options", "options": ["a", "b"], "correct_answer": "a", "explanation": "x"},
            {"question": "Answer missing", "options": ["a", "b", "c"], "correct_answer": "z", "explanation": "x"},
            {"question": "Good one", "options": ["yes", "no", "maybe"], "correct_answer": "yes", "explanation": "Because."},
            "not an object"
        ]}"#;
        let response = parse(raw, LearningMode::Quiz).unwrap();
        assert_eq!(response.questions.len(), 1);
        assert_eq!(response.questions[0].question, "Good one");
    }

    #[test]
    fn test_quiz_without_valid_questions_fails() {
        let raw = r#"{"explanation": "x", "questions": [
            {"question": "q", "options": ["a", "b", "c"], "correct_answer": "d", "explanation": "x"}
        ]}"#;
        let err = parse(raw, LearningMode::Quiz).unwrap_err();
        assert_eq!(err, ExplainerError::NoValidQuestions { discarded: 1 });
    }

    #[test]
    fn test_quiz_questions_capped() {
        let question = r#"{"question": "q", "options": ["a", "b", "c"], "correct_answer": "a", "explanation": "e"}"#;
        let raw = format!(
            "{{\"questions\": [{}]}}",
            vec![question; 8].join(",")
        );
        let response = parse(&raw, LearningMode::Quiz).unwrap();
        assert_eq!(response.questions.len(), ExpectedShape::DEFAULT_MAX_QUESTIONS);

        let capped = parse_response(
            &raw,
            &shape(LearningMode::Quiz).with_max_questions(2),
            Instant::now(),
        )
        .unwrap();
        assert_eq!(capped.questions.len(), 2);
    }

    #[test]
    fn test_text_fallback_beginner() {
        let raw = "## Explanation\nRecursion means a function calls itself.\nIt needs a base case.\n\n## Examples\n- factorial(3) calls factorial(2)\n- fib(5) calls fib(4) and fib(3)\n";
        let response = parse(raw, LearningMode::Beginner).unwrap();

        assert_eq!(
            response.explanation,
            "Recursion means a function calls itself.\nIt needs a base case."
        );
        assert_eq!(
            response.examples,
            vec!["factorial(3) calls factorial(2)", "fib(5) calls fib(4) and fib(3)"]
        );
    }

    #[test]
    fn test_text_fallback_numbered_example_headers() {
        let raw = "Recursion is self-reference.\n\nExample 1: factorial\nfactorial(3) = 6\n\nExample 2: countdown\n";
        let response = parse(raw, LearningMode::Beginner).unwrap();
        assert_eq!(response.explanation, "Recursion is self-reference.");
        assert_eq!(response.examples, vec!["factorial\nfactorial(3) = 6", "countdown"]);
    }

    #[test]
    fn test_text_fallback_plain_prose_summary() {
        let raw = "Photosynthesis turns light into chemical energy.";
        let response = parse(raw, LearningMode::Summary).unwrap();
        assert_eq!(response.explanation, raw);
        assert!(response.examples.is_empty());
    }

    #[test]
    fn test_text_fallback_prose_beginner_needs_examples() {
        let err = parse("Just an explanation, nothing else.", LearningMode::Beginner).unwrap_err();
        assert!(matches!(err, ExplainerError::TooFewExamples { .. }));
    }

    #[test]
    fn test_text_fallback_quiz() {
        let raw = "\
**Explanation:** Binary search halves the range each step.

Questions:
1. What is the time complexity of binary search?
A) O(n)
B) O(log n)
C) O(n log n)
D) O(1)
Answer: B
Explanation: The range halves each step.

Question 2: Binary search requires the input to be...
(a) sorted
(b) unique
(c) non-empty
Correct answer: sorted
Rationale: Halving only works on ordered data.
";
        let response = parse(raw, LearningMode::Quiz).unwrap();

        assert_eq!(response.explanation, "Binary search halves the range each step.");
        assert_eq!(response.questions.len(), 2);
        assert_eq!(response.questions[0].correct_answer, "O(log n)");
        assert_eq!(response.questions[0].options.len(), 4);
        assert_eq!(response.questions[1].correct_answer, "sorted");
        assert_eq!(response.questions[1].explanation, "Halving only works on ordered data.");
    }

    #[test]
    fn test_text_fallback_quiz_without_questions_header() {
        let raw = "\
## Explanation
Binary search halves the range each step.

Question 1: What is its complexity?
A) O(n)
B) O(log n)
C) O(1)
Answer: B
Explanation: The range halves each step.
";
        let response = parse(raw, LearningMode::Quiz).unwrap();

        assert_eq!(response.explanation, "Binary search halves the range each step.");
        assert_eq!(response.questions.len(), 1);
        assert_eq!(response.questions[0].question, "What is its complexity?");
        assert_eq!(response.questions[0].correct_answer, "O(log n)");
        assert_eq!(response.questions[0].explanation, "The range halves each step.");
    }

    #[test]
    fn test_opens_quiz() {
        assert!(opens_quiz("Question 1: What is it?"));
        assert!(opens_quiz("Q2. Which one?"));
        assert!(!opens_quiz("Question: plain header"));
        assert!(!opens_quiz("Quick recap of the idea."));
        assert!(!opens_quiz("1. a numbered example"));
    }

    #[test]
    fn test_json_followed_by_prose_with_braces() {
        let raw = "{\"explanation\": \"A set groups items.\"}\nNote: sets are written like {1, 2}.";
        let response = parse(raw, LearningMode::Summary).unwrap();
        assert_eq!(response.explanation, "A set groups items.");
    }

    #[test]
    fn test_prose_with_code_braces_is_not_json() {
        let raw = "## Explanation\nA block groups statements.\n## Examples\n- fn main() { println!(\"hi\"); }";
        let response = parse(raw, LearningMode::Beginner).unwrap();
        assert_eq!(response.examples.len(), 1);
    }

    #[test]
    fn test_split_option_label() {
        assert_eq!(split_option_label("A) foo"), Some((0, "foo")));
        assert_eq!(split_option_label("(c) bar"), Some((2, "bar")));
        assert_eq!(split_option_label("d. baz"), Some((3, "baz")));
        assert_eq!(split_option_label("a.m. is morning"), None);
        assert_eq!(split_option_label("E) out of range"), None);
        assert_eq!(split_option_label("Binary search"), None);
    }

    #[test]
    fn test_answer_letter() {
        assert_eq!(answer_letter("B"), Some(1));
        assert_eq!(answer_letter("(c)"), Some(2));
        assert_eq!(answer_letter("d."), Some(3));
        assert_eq!(answer_letter("Option A"), Some(0));
        assert_eq!(answer_letter("Paris"), None);
    }

    #[test]
    fn test_processing_time_measured_from_start() {
        let started = Instant::now() - std::time::Duration::from_millis(250);
        let raw = r#"{"explanation": "Short."}"#;
        let response = parse_response(raw, &shape(LearningMode::Summary), started).unwrap();
        assert!(response.processing_time_ms >= 250);
    }

    #[test]
    fn test_format_classifies() {
        let err = format("", &shape(LearningMode::Quiz), Instant::now()).unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedResponse);
        assert_eq!(err.status_code(), 502);
    }
}
