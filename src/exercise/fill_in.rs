use serde::{Deserialize, Serialize};

use super::{require_prompt, ExerciseKind, InvalidQuestion, Validate};
use crate::evaluator::{loosely_equal, Evaluate, ResponseMismatch, Verdict};
use crate::response::Response;

const ANSWER: &str = "{answer}";
const GIVEN: &str = "{given}";
const SUFFIX: &str = "{suffix}";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillStyle {
    WordCompletion,
    SimpleAddition,
    Possessive,
}

/// A sentence with one blank the user types into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillIn {
    pub style: FillStyle,
    /// Text around the blank; `{answer}` marks the blank, `{given}` and
    /// `{suffix}` are substituted for display.
    pub sentence: String,
    pub given: String,
    #[serde(default)]
    pub suffix: Option<String>,
    #[serde(default)]
    pub hint_word: Option<String>,
    pub answer: String,
}

impl FillIn {
    pub fn instruction(&self) -> &'static str {
        match self.style {
            FillStyle::WordCompletion => "Complete the word",
            FillStyle::SimpleAddition => "Add the ending",
            FillStyle::Possessive => "Write the possessive form",
        }
    }

    /// Text before and after the blank, placeholders filled in.
    pub fn parts(&self) -> (String, String) {
        if self.style == FillStyle::SimpleAddition {
            return (
                format!("{} + {} =", self.given, self.suffix.as_deref().unwrap_or("")),
                String::new(),
            );
        }

        let fill = |s: &str| {
            s.replace(GIVEN, &self.given)
                .replace(SUFFIX, self.suffix.as_deref().unwrap_or(""))
        };
        match self.sentence.split_once(ANSWER) {
            Some((before, after)) => (fill(before), fill(after)),
            None => (fill(&self.sentence), String::new()),
        }
    }

    /// The sentence with `answer` written into the blank.
    pub fn render_with(&self, answer: &str) -> String {
        let (before, after) = self.parts();
        let blank = if answer.trim().is_empty() { "___" } else { answer };
        let sep = if self.style == FillStyle::SimpleAddition {
            " "
        } else {
            ""
        };
        format!("{before}{sep}{blank}{after}")
    }
}

impl Evaluate for FillIn {
    fn blank_response(&self) -> Response {
        Response::Text(String::new())
    }

    fn can_submit(&self, response: &Response) -> bool {
        matches!(response, Response::Text(s) if !s.trim().is_empty())
    }

    fn evaluate(&self, response: &Response) -> Result<Verdict, ResponseMismatch> {
        let Response::Text(text) = response else {
            return Err(ResponseMismatch::new(ExerciseKind::FillIn, "text", response));
        };

        let is_correct = !text.trim().is_empty() && loosely_equal(text, &self.answer);
        Ok(Verdict::new(
            is_correct,
            text.trim().to_string(),
            self.answer.clone(),
        ))
    }
}

impl Validate for FillIn {
    fn validate(&self) -> Result<(), InvalidQuestion> {
        require_prompt(&self.sentence)?;
        if self.answer.trim().is_empty() {
            return Err(InvalidQuestion::Empty("answer"));
        }
        if self.style == FillStyle::SimpleAddition
            && !self.suffix.as_deref().is_some_and(|s| !s.trim().is_empty())
        {
            return Err(InvalidQuestion::Empty("suffix"));
        }
        if self.style != FillStyle::SimpleAddition && !self.sentence.contains(ANSWER) {
            return Err(InvalidQuestion::MissingPlaceholder(ANSWER));
        }
        Ok(())
    }
}
