use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::{require_prompt, ExerciseKind, InvalidQuestion, Validate};
use crate::evaluator::{clean_word, loosely_equal, Evaluate, ResponseMismatch, Verdict};
use crate::response::Response;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    pub word: String,
    pub correction: String,
}

/// What the user looks for in the text, with the expected finds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum HighlightTask {
    /// Pick individual letters; compared as a multiset.
    Vowels { targets: Vec<char> },
    Nouns { targets: Vec<String> },
    Redundant { targets: Vec<String> },
    RedundantPhrase { targets: Vec<String> },
    /// Type a replacement over each wrong word.
    Pronouns { targets: Vec<Correction> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    pub question: String,
    pub text: String,
    #[serde(flatten)]
    pub task: HighlightTask,
}

impl Highlight {
    /// Vowel tasks select characters, every other task selects words.
    pub fn selects_characters(&self) -> bool {
        matches!(self.task, HighlightTask::Vowels { .. })
    }

    pub fn takes_corrections(&self) -> bool {
        matches!(self.task, HighlightTask::Pronouns { .. })
    }

    /// The selectable pieces of `text`, in order.
    pub fn units(&self) -> Vec<String> {
        if self.selects_characters() {
            self.text.chars().map(String::from).collect()
        } else {
            self.text.split_whitespace().map(String::from).collect()
        }
    }

    fn target_count(&self) -> usize {
        match &self.task {
            HighlightTask::Vowels { targets } => targets.len(),
            HighlightTask::Nouns { targets }
            | HighlightTask::Redundant { targets }
            | HighlightTask::RedundantPhrase { targets } => targets.len(),
            HighlightTask::Pronouns { targets } => targets.len(),
        }
    }

    /// The words of `text` the way answers compare them.
    fn normalized_words(&self) -> BTreeSet<String> {
        self.text
            .split_whitespace()
            .map(|w| clean_word(w).to_lowercase())
            .collect()
    }

    /// Every target must be reachable from the text, or nobody can answer.
    fn check_targets_in_text(&self) -> Result<(), InvalidQuestion> {
        let missing = match &self.task {
            HighlightTask::Vowels { targets } => {
                let available = self.text.chars().flat_map(char::to_lowercase).counts();
                targets
                    .iter()
                    .flat_map(|c| c.to_lowercase())
                    .counts()
                    .into_iter()
                    .find(|(c, n)| available.get(c).copied().unwrap_or(0) < *n)
                    .map(|(c, _)| c.to_string())
            }
            HighlightTask::Nouns { targets }
            | HighlightTask::Redundant { targets }
            | HighlightTask::RedundantPhrase { targets } => {
                let words = self.normalized_words();
                targets
                    .iter()
                    .find(|t| !words.contains(&t.trim().to_lowercase()))
                    .cloned()
            }
            HighlightTask::Pronouns { targets } => {
                let words = self.normalized_words();
                targets
                    .iter()
                    .find(|t| !words.contains(&t.word.to_lowercase()))
                    .map(|t| t.word.clone())
            }
        };
        match missing {
            Some(target) => Err(InvalidQuestion::TargetNotInText(target)),
            None => Ok(()),
        }
    }

    fn check_vowels(&self, targets: &[char], selected: &BTreeSet<usize>) -> Verdict {
        let chars = self.text.chars().collect::<Vec<_>>();
        let picked = selected
            .iter()
            .filter_map(|i| chars.get(*i))
            .map(|c| c.to_lowercase().to_string())
            .collect::<Vec<_>>();
        let expected = targets
            .iter()
            .map(|c| c.to_lowercase().to_string())
            .collect::<Vec<_>>();

        let is_correct = !picked.is_empty() && picked.iter().counts() == expected.iter().counts();
        Verdict::new(is_correct, picked.join(","), expected.join(","))
    }

    fn check_words(&self, targets: &[String], selected: &BTreeSet<usize>) -> Verdict {
        let words = self.units();
        let picked = selected
            .iter()
            .filter_map(|i| words.get(*i))
            .map(|w| clean_word(w).to_lowercase())
            .collect::<BTreeSet<_>>();
        let expected = targets
            .iter()
            .map(|t| t.trim().to_lowercase())
            .collect::<BTreeSet<_>>();

        let is_correct = !picked.is_empty() && picked == expected;
        Verdict::new(
            is_correct,
            picked.iter().join(","),
            targets.iter().map(|t| t.to_lowercase()).join(","),
        )
    }

    fn check_corrections(
        &self,
        targets: &[Correction],
        corrections: &BTreeMap<usize, String>,
    ) -> Verdict {
        let words = self.units();
        let given = corrections
            .iter()
            .filter(|(_, c)| !c.trim().is_empty())
            .filter_map(|(i, c)| words.get(*i).map(|w| (clean_word(w).to_lowercase(), c.trim())))
            .collect::<BTreeMap<_, _>>();

        // every target corrected and nothing else touched
        let is_correct = !given.is_empty()
            && given.len() == targets.len()
            && targets.iter().all(|t| {
                given
                    .get(&t.word.to_lowercase())
                    .is_some_and(|c| loosely_equal(c, &t.correction))
            });

        Verdict::new(
            is_correct,
            given.iter().map(|(w, c)| format!("{w} → {c}")).join(", "),
            targets
                .iter()
                .map(|t| format!("{} → {}", t.word.to_lowercase(), t.correction))
                .join(", "),
        )
    }
}

impl Evaluate for Highlight {
    fn blank_response(&self) -> Response {
        if self.takes_corrections() {
            Response::Corrections(BTreeMap::new())
        } else {
            Response::Selection(BTreeSet::new())
        }
    }

    fn can_submit(&self, response: &Response) -> bool {
        match (&self.task, response) {
            (HighlightTask::Pronouns { .. }, Response::Corrections(_)) => !response.is_empty(),
            (HighlightTask::Pronouns { .. }, _) => false,
            (_, Response::Selection(s)) => !s.is_empty(),
            _ => false,
        }
    }

    fn evaluate(&self, response: &Response) -> Result<Verdict, ResponseMismatch> {
        match (&self.task, response) {
            (HighlightTask::Vowels { targets }, Response::Selection(s)) => {
                Ok(self.check_vowels(targets, s))
            }
            (
                HighlightTask::Nouns { targets }
                | HighlightTask::Redundant { targets }
                | HighlightTask::RedundantPhrase { targets },
                Response::Selection(s),
            ) => Ok(self.check_words(targets, s)),
            (HighlightTask::Pronouns { targets }, Response::Corrections(c)) => {
                Ok(self.check_corrections(targets, c))
            }
            (HighlightTask::Pronouns { .. }, other) => Err(ResponseMismatch::new(
                ExerciseKind::Highlight,
                "corrections",
                other,
            )),
            (_, other) => Err(ResponseMismatch::new(
                ExerciseKind::Highlight,
                "selection",
                other,
            )),
        }
    }
}

impl Validate for Highlight {
    fn validate(&self) -> Result<(), InvalidQuestion> {
        require_prompt(&self.question)?;
        if self.text.trim().is_empty() {
            return Err(InvalidQuestion::Empty("text"));
        }
        if self.target_count() == 0 {
            return Err(InvalidQuestion::NoTargets);
        }
        self.check_targets_in_text()
    }
}
