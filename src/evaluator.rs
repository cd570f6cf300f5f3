use serde::Serialize;
use thiserror::Error;

use crate::exercise::ExerciseKind;
use crate::response::Response;

/// Outcome of checking one response against one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub is_correct: bool,
    /// The user's answer, normalized for display.
    pub user_answer: String,
    /// The expected answer, normalized for display.
    pub correct_answer: String,
}

impl Verdict {
    pub fn new(is_correct: bool, user_answer: String, correct_answer: String) -> Self {
        Self {
            is_correct,
            user_answer,
            correct_answer,
        }
    }
}

/// A response of the wrong shape was handed to an evaluator.
///
/// This is a caller bug, not a wrong answer: the presentation layer always
/// builds the buffer from [`Evaluate::blank_response`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind} questions take a {expected} response, got {got}")]
pub struct ResponseMismatch {
    pub kind: ExerciseKind,
    pub expected: &'static str,
    pub got: &'static str,
}

impl ResponseMismatch {
    pub fn new(kind: ExerciseKind, expected: &'static str, got: &Response) -> Self {
        Self {
            kind,
            expected,
            got: got.shape(),
        }
    }
}

/// Correctness check for one exercise variant.
///
/// Implementations are pure: no clock, no randomness, no I/O. An empty
/// response always evaluates to an incorrect verdict.
pub trait Evaluate {
    /// The response buffer a fresh question starts with.
    fn blank_response(&self) -> Response;

    /// Whether the submit action is enabled for this buffer.
    fn can_submit(&self, response: &Response) -> bool;

    fn evaluate(&self, response: &Response) -> Result<Verdict, ResponseMismatch>;
}

/// Lowercase, trimmed comparison used by every free-text check.
pub(crate) fn loosely_equal(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Strip the punctuation that can trail a word in running text.
pub(crate) fn clean_word(word: &str) -> String {
    word.chars()
        .filter(|c| !matches!(c, '.' | ',' | '!' | '?' | ';' | ':' | '"'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loose_equality_ignores_case_and_padding() {
        assert!(loosely_equal(" cats ", "Cats"));
        assert!(!loosely_equal("Cat", "Cats"));
    }

    #[test]
    fn clean_word_drops_trailing_punctuation() {
        assert_eq!(clean_word("dog."), "dog");
        assert_eq!(clean_word("\"Hello,\""), "Hello");
        assert_eq!(clean_word("it's"), "it's");
    }

    #[test]
    fn mismatch_names_both_shapes() {
        let err = ResponseMismatch::new(ExerciseKind::FillIn, "text", &Response::Order(vec![]));
        assert_eq!(err.to_string(), "fill_in questions take a text response, got order");
    }
}
