use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{require_prompt, ExerciseKind, InvalidQuestion, Validate};
use crate::evaluator::{Evaluate, ResponseMismatch, Verdict};
use crate::response::Response;

/// Spell a word with some letters missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapFill {
    pub question: String,
    pub word: String,
    /// Char positions in `word` the user has to fill.
    pub blanks: Vec<usize>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl GapFill {
    pub fn letters(&self) -> Vec<char> {
        self.word.chars().collect()
    }

    pub fn is_blank(&self, position: usize) -> bool {
        self.blanks.contains(&position)
    }

    /// The blank following `position`, if any, in word order.
    pub fn next_blank(&self, position: usize) -> Option<usize> {
        self.blanks.iter().copied().filter(|b| *b > position).min()
    }

    pub fn previous_blank(&self, position: usize) -> Option<usize> {
        self.blanks.iter().copied().filter(|b| *b < position).max()
    }

    pub fn first_blank(&self) -> Option<usize> {
        self.blanks.iter().copied().min()
    }

    fn expected(&self, position: usize) -> Option<String> {
        self.word
            .chars()
            .nth(position)
            .map(|c| c.to_lowercase().to_string())
    }
}

impl Evaluate for GapFill {
    fn blank_response(&self) -> Response {
        Response::Letters(BTreeMap::new())
    }

    fn can_submit(&self, response: &Response) -> bool {
        match response {
            Response::Letters(typed) => {
                !self.blanks.is_empty() && self.blanks.iter().all(|b| typed.contains_key(b))
            }
            _ => false,
        }
    }

    fn evaluate(&self, response: &Response) -> Result<Verdict, ResponseMismatch> {
        let Response::Letters(typed) = response else {
            return Err(ResponseMismatch::new(ExerciseKind::GapFill, "letters", response));
        };

        let is_correct = !self.blanks.is_empty()
            && self
                .blanks
                .iter()
                .all(|b| typed.get(b).map(|l| l.trim().to_lowercase()) == self.expected(*b));

        let user_answer = self
            .letters()
            .iter()
            .enumerate()
            .map(|(i, c)| {
                if self.is_blank(i) {
                    typed.get(&i).cloned().unwrap_or_else(|| "_".to_string())
                } else {
                    c.to_string()
                }
            })
            .collect::<String>();
        let correct_answer = self
            .letters()
            .iter()
            .enumerate()
            .map(|(i, c)| {
                if self.is_blank(i) {
                    format!("[{c}]")
                } else {
                    c.to_string()
                }
            })
            .collect::<String>();

        Ok(Verdict::new(is_correct, user_answer, correct_answer))
    }
}

impl Validate for GapFill {
    fn validate(&self) -> Result<(), InvalidQuestion> {
        require_prompt(&self.question)?;
        if self.blanks.is_empty() {
            return Err(InvalidQuestion::Empty("blanks"));
        }
        let len = self.word.chars().count();
        if let Some(&position) = self.blanks.iter().find(|b| **b >= len) {
            return Err(InvalidQuestion::BlankOutOfRange { position, len });
        }
        Ok(())
    }
}
