use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{require_prompt, ExerciseKind, InvalidQuestion, Validate};
use crate::evaluator::{Evaluate, ResponseMismatch, Verdict};
use crate::response::Response;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectGroup {
    /// Pick the words that share a sound; the options can be read aloud.
    SoundMatching,
    #[default]
    Synonym,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub word: String,
    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiSelect {
    pub question: String,
    #[serde(default)]
    pub group: SelectGroup,
    pub required_selections: usize,
    pub options: Vec<Choice>,
}

impl MultiSelect {
    pub fn correct_indices(&self) -> BTreeSet<usize> {
        self.options
            .iter()
            .enumerate()
            .filter(|(_, o)| o.is_correct)
            .map(|(i, _)| i)
            .collect()
    }

    fn join_words(&self, indices: &BTreeSet<usize>) -> String {
        indices
            .iter()
            .filter_map(|i| self.options.get(*i))
            .map(|o| o.word.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Evaluate for MultiSelect {
    fn blank_response(&self) -> Response {
        Response::Selection(BTreeSet::new())
    }

    fn can_submit(&self, response: &Response) -> bool {
        matches!(response, Response::Selection(s) if s.len() == self.required_selections)
    }

    fn evaluate(&self, response: &Response) -> Result<Verdict, ResponseMismatch> {
        let Response::Selection(selected) = response else {
            return Err(ResponseMismatch::new(
                ExerciseKind::MultiSelect,
                "selection",
                response,
            ));
        };

        let correct = self.correct_indices();
        let is_correct = !selected.is_empty()
            && selected.len() == self.required_selections
            && *selected == correct;
        Ok(Verdict::new(
            is_correct,
            self.join_words(selected),
            self.join_words(&correct),
        ))
    }
}

impl Validate for MultiSelect {
    fn validate(&self) -> Result<(), InvalidQuestion> {
        require_prompt(&self.question)?;
        if self.options.is_empty() {
            return Err(InvalidQuestion::Empty("options"));
        }
        let correct = self.correct_indices().len();
        if correct == 0 {
            return Err(InvalidQuestion::NoTargets);
        }
        if correct != self.required_selections {
            return Err(InvalidQuestion::SelectionCountMismatch {
                required: self.required_selections,
                correct,
            });
        }
        Ok(())
    }
}
