use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{require_prompt, ExerciseKind, InvalidQuestion, Validate};
use crate::evaluator::{Evaluate, ResponseMismatch, Verdict};
use crate::response::Response;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeMode {
    /// Click the words that need a capital letter.
    Capitalize,
    /// Click the nouns a pronoun should replace.
    Pronoun,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickWord {
    pub text: String,
    #[serde(default)]
    pub should_capitalize: bool,
    #[serde(default)]
    pub is_pronoun: bool,
    /// Shown in place of the word once clicked in pronoun mode.
    #[serde(default)]
    pub replacement: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickToChange {
    pub question: String,
    pub mode: ChangeMode,
    pub words: Vec<ClickWord>,
}

impl ClickToChange {
    /// Pronoun mode only lets the user click candidate words.
    pub fn is_clickable(&self, index: usize) -> bool {
        match (self.mode, self.words.get(index)) {
            (_, None) => false,
            (ChangeMode::Capitalize, Some(_)) => true,
            (ChangeMode::Pronoun, Some(w)) => w.is_pronoun,
        }
    }

    pub fn targets(&self) -> BTreeSet<usize> {
        self.words
            .iter()
            .enumerate()
            .filter(|(_, w)| match self.mode {
                ChangeMode::Capitalize => w.should_capitalize,
                ChangeMode::Pronoun => w.is_pronoun,
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// How word `index` reads once the user has clicked it.
    pub fn changed_word(&self, index: usize) -> String {
        let Some(word) = self.words.get(index) else {
            return String::new();
        };
        match self.mode {
            ChangeMode::Capitalize => {
                let mut chars = word.text.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
            ChangeMode::Pronoun => word.replacement.clone().unwrap_or_else(|| word.text.clone()),
        }
    }

    fn join_words(&self, indices: &BTreeSet<usize>) -> String {
        indices
            .iter()
            .filter_map(|i| self.words.get(*i))
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Evaluate for ClickToChange {
    fn blank_response(&self) -> Response {
        Response::Selection(BTreeSet::new())
    }

    fn can_submit(&self, response: &Response) -> bool {
        match (self.mode, response) {
            (ChangeMode::Pronoun, Response::Selection(_)) => true,
            (ChangeMode::Capitalize, Response::Selection(s)) => !s.is_empty(),
            _ => false,
        }
    }

    fn evaluate(&self, response: &Response) -> Result<Verdict, ResponseMismatch> {
        let Response::Selection(selected) = response else {
            return Err(ResponseMismatch::new(
                ExerciseKind::ClickToChange,
                "selection",
                response,
            ));
        };

        let targets = self.targets();
        let is_correct = !selected.is_empty() && *selected == targets;
        Ok(Verdict::new(
            is_correct,
            self.join_words(selected),
            self.join_words(&targets),
        ))
    }
}

impl Validate for ClickToChange {
    fn validate(&self) -> Result<(), InvalidQuestion> {
        require_prompt(&self.question)?;
        if self.words.is_empty() {
            return Err(InvalidQuestion::Empty("words"));
        }
        if self.targets().is_empty() {
            return Err(InvalidQuestion::NoTargets);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, should_capitalize: bool, is_pronoun: bool) -> ClickWord {
        ClickWord {
            text: text.into(),
            should_capitalize,
            is_pronoun,
            replacement: None,
        }
    }

    fn london() -> ClickToChange {
        ClickToChange {
            question: "Click the words that need a capital letter".into(),
            mode: ChangeMode::Capitalize,
            words: vec![
                word("tom", true, false),
                word("lives", false, false),
                word("in", false, false),
                word("london.", true, false),
            ],
        }
    }

    #[test]
    fn exact_target_set_is_correct() {
        let q = london();
        let mut r = q.blank_response();
        r.toggle(3);
        r.toggle(0);

        let verdict = q.evaluate(&r).unwrap();
        assert!(verdict.is_correct);
        assert_eq!(verdict.user_answer, "tom, london.");
    }

    #[test]
    fn extra_word_is_incorrect() {
        let q = london();
        let mut r = q.blank_response();
        r.toggle(0);
        r.toggle(1);
        r.toggle(3);
        assert!(!q.evaluate(&r).unwrap().is_correct);
    }

    #[test]
    fn capitalize_mode_needs_a_click_to_submit() {
        let q = london();
        assert!(!q.can_submit(&q.blank_response()));
        assert!(!q.evaluate(&q.blank_response()).unwrap().is_correct);
    }

    #[test]
    fn pronoun_mode_restricts_clicks_and_always_submits() {
        let q = ClickToChange {
            question: "Click the words a pronoun could replace".into(),
            mode: ChangeMode::Pronoun,
            words: vec![
                ClickWord {
                    replacement: Some("She".into()),
                    ..word("Anna", false, true)
                },
                word("reads", false, false),
            ],
        };
        assert!(q.is_clickable(0));
        assert!(!q.is_clickable(1));
        assert!(!q.is_clickable(7));
        assert!(q.can_submit(&q.blank_response()));
        assert_eq!(q.changed_word(0), "She");
    }

    #[test]
    fn capitalized_word_keeps_the_rest() {
        assert_eq!(london().changed_word(3), "London.");
    }

    #[test]
    fn question_without_targets_fails_validation() {
        let mut q = london();
        for w in &mut q.words {
            w.should_capitalize = false;
        }
        assert_eq!(q.validate(), Err(InvalidQuestion::NoTargets));
    }
}
