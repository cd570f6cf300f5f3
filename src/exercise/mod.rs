//! Question records for every exercise kind and their evaluators.

pub mod category_sort;
pub mod click_to_change;
pub mod fill_in;
pub mod gap_fill;
pub mod highlight;
pub mod multi_select;
pub mod sequencing;
pub mod table_match;

pub use category_sort::{CategorySort, SortItem};
pub use click_to_change::{ChangeMode, ClickToChange, ClickWord};
pub use fill_in::{FillIn, FillStyle};
pub use gap_fill::GapFill;
pub use highlight::{Correction, Highlight, HighlightTask};
pub use multi_select::{Choice, MultiSelect, SelectGroup};
pub use sequencing::{SequenceItem, Sequencing};
pub use table_match::{Column, TableMatch, TableRow};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::evaluator::{Evaluate, ResponseMismatch, Verdict};
use crate::response::Response;

/// One interactive quiz modality. Each kind has its own question bank.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum ExerciseKind {
    CategorySort,
    FillIn,
    GapFill,
    Highlight,
    ClickToChange,
    MultiSelect,
    Sequencing,
    TableMatch,
}

impl ExerciseKind {
    pub const ALL: [ExerciseKind; 8] = [
        ExerciseKind::CategorySort,
        ExerciseKind::FillIn,
        ExerciseKind::GapFill,
        ExerciseKind::Highlight,
        ExerciseKind::ClickToChange,
        ExerciseKind::MultiSelect,
        ExerciseKind::Sequencing,
        ExerciseKind::TableMatch,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            ExerciseKind::CategorySort => "Drag and Drop",
            ExerciseKind::FillIn => "Fill in the Blanks",
            ExerciseKind::GapFill => "Gap Fill",
            ExerciseKind::Highlight => "Highlight",
            ExerciseKind::ClickToChange => "Click to Change",
            ExerciseKind::MultiSelect => "Multiple Answers",
            ExerciseKind::Sequencing => "Sequencing",
            ExerciseKind::TableMatch => "Table",
        }
    }

    /// Name of the bank file holding this kind's questions.
    pub fn file_name(&self) -> String {
        format!("{self}.json")
    }
}

/// Why a question record was rejected at load time.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidQuestion {
    #[error("prompt is empty")]
    EmptyPrompt,

    #[error("nothing to answer: the {0} list is empty")]
    Empty(&'static str),

    #[error("item {item} belongs to unknown category {category:?}")]
    UnknownCategory { item: u32, category: String },

    #[error("id {0} is used more than once")]
    DuplicateId(u32),

    #[error("sentence has no {0} placeholder")]
    MissingPlaceholder(&'static str),

    #[error("blank at {position} is outside the {len}-letter word")]
    BlankOutOfRange { position: usize, len: usize },

    #[error("no word is marked as a target")]
    NoTargets,

    #[error("target {0:?} does not occur in the text")]
    TargetNotInText(String),

    #[error("requires {required} selections but {correct} options are correct")]
    SelectionCountMismatch { required: usize, correct: usize },

    #[error("orders must be exactly 1..={len}")]
    BadOrdering { len: usize },

    #[error("row {row} expects unknown column {column:?}")]
    UnknownColumn { row: usize, column: String },
}

/// Load-time consistency check for a question record.
pub trait Validate {
    fn validate(&self) -> Result<(), InvalidQuestion>;
}

pub(crate) fn require_prompt(prompt: &str) -> Result<(), InvalidQuestion> {
    if prompt.trim().is_empty() {
        Err(InvalidQuestion::EmptyPrompt)
    } else {
        Ok(())
    }
}

/// A question of any kind. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Question {
    CategorySort(CategorySort),
    FillIn(FillIn),
    GapFill(GapFill),
    Highlight(Highlight),
    ClickToChange(ClickToChange),
    MultiSelect(MultiSelect),
    Sequencing(Sequencing),
    TableMatch(TableMatch),
}

macro_rules! each_variant {
    ($self:ident, $q:ident => $body:expr) => {
        match $self {
            Question::CategorySort($q) => $body,
            Question::FillIn($q) => $body,
            Question::GapFill($q) => $body,
            Question::Highlight($q) => $body,
            Question::ClickToChange($q) => $body,
            Question::MultiSelect($q) => $body,
            Question::Sequencing($q) => $body,
            Question::TableMatch($q) => $body,
        }
    };
}

impl Question {
    pub fn kind(&self) -> ExerciseKind {
        match self {
            Question::CategorySort(_) => ExerciseKind::CategorySort,
            Question::FillIn(_) => ExerciseKind::FillIn,
            Question::GapFill(_) => ExerciseKind::GapFill,
            Question::Highlight(_) => ExerciseKind::Highlight,
            Question::ClickToChange(_) => ExerciseKind::ClickToChange,
            Question::MultiSelect(_) => ExerciseKind::MultiSelect,
            Question::Sequencing(_) => ExerciseKind::Sequencing,
            Question::TableMatch(_) => ExerciseKind::TableMatch,
        }
    }

    /// The instruction line shown above the question.
    pub fn prompt(&self) -> &str {
        match self {
            Question::CategorySort(q) => &q.question,
            Question::FillIn(q) => q.instruction(),
            Question::GapFill(q) => &q.question,
            Question::Highlight(q) => &q.question,
            Question::ClickToChange(q) => &q.question,
            Question::MultiSelect(q) => &q.question,
            Question::Sequencing(q) => &q.question,
            Question::TableMatch(q) => &q.question,
        }
    }

    /// Text handed to the speech capability, for kinds that have audio.
    pub fn audio_text(&self) -> Option<String> {
        match self {
            Question::GapFill(q) => Some(q.word.clone()),
            Question::MultiSelect(q) if q.group == SelectGroup::SoundMatching => Some(
                q.options
                    .iter()
                    .map(|o| o.word.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            _ => None,
        }
    }

    /// Extra explanation shown with incorrect-answer feedback.
    pub fn explanation(&self) -> Option<&str> {
        match self {
            Question::GapFill(q) => q.explanation.as_deref(),
            Question::Sequencing(q) => q.solution.as_deref(),
            Question::TableMatch(q) => q.explanation.as_deref(),
            _ => None,
        }
    }
}

impl Evaluate for Question {
    fn blank_response(&self) -> Response {
        each_variant!(self, q => q.blank_response())
    }

    fn can_submit(&self, response: &Response) -> bool {
        each_variant!(self, q => q.can_submit(response))
    }

    fn evaluate(&self, response: &Response) -> Result<Verdict, ResponseMismatch> {
        each_variant!(self, q => q.evaluate(response))
    }
}

impl Validate for Question {
    fn validate(&self) -> Result<(), InvalidQuestion> {
        each_variant!(self, q => q.validate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_match_bank_files() {
        assert_eq!(ExerciseKind::CategorySort.to_string(), "category_sort");
        assert_eq!(ExerciseKind::TableMatch.file_name(), "table_match.json");
    }

    #[test]
    fn kinds_deserialize_from_snake_case() {
        let kind: ExerciseKind = serde_json::from_str("\"click_to_change\"").unwrap();
        assert_eq!(kind, ExerciseKind::ClickToChange);
    }

    #[test]
    fn question_dispatches_to_its_variant() {
        let json = r#"{
            "kind": "fill_in",
            "style": "simple_addition",
            "sentence": "{given} + {suffix} = {answer}",
            "given": "cat",
            "suffix": "s",
            "answer": "cats"
        }"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.kind(), ExerciseKind::FillIn);
        assert!(q.validate().is_ok());

        let verdict = q.evaluate(&Response::Text(" Cats ".into())).unwrap();
        assert!(verdict.is_correct);
        assert!(q.audio_text().is_none());
    }

    #[test]
    fn every_kind_has_a_title() {
        for kind in ExerciseKind::ALL {
            assert!(!kind.title().is_empty());
        }
    }
}
