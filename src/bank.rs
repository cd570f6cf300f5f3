use include_dir::{include_dir, Dir};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::exercise::{require_prompt, ExerciseKind, InvalidQuestion, Question, Validate};

static BANK_DIR: Dir = include_dir!("src/banks");

#[derive(Debug, Error)]
pub enum BankError {
    #[error("no built-in question bank for {0}")]
    Missing(ExerciseKind),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("bank {bank} is not a valid question bank: {source}")]
    Parse {
        bank: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("bank {bank} holds {found} questions, expected {expected}")]
    KindMismatch {
        bank: String,
        expected: ExerciseKind,
        found: ExerciseKind,
    },

    #[error("bank {bank}, worked example: {reason}")]
    InvalidExample {
        bank: String,
        #[source]
        reason: InvalidQuestion,
    },

    #[error("bank {bank}, question {}: {reason}", .index + 1)]
    Invalid {
        bank: String,
        index: usize,
        #[source]
        reason: InvalidQuestion,
    },
}

/// A solved sample shown before practice. Read-only; never scored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkedExample {
    pub question: String,
    /// The solved layout, one row per category, blank or step.
    pub rows: Vec<ExampleRow>,
    #[serde(default)]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleRow {
    pub label: String,
    pub answer: String,
    #[serde(default)]
    pub note: Option<String>,
}

impl Validate for WorkedExample {
    fn validate(&self) -> Result<(), InvalidQuestion> {
        require_prompt(&self.question)?;
        if self.rows.is_empty() {
            return Err(InvalidQuestion::Empty("rows"));
        }
        Ok(())
    }
}

/// On-disk shape of a bank; `exercises` is decoded once `kind` is known.
#[derive(Deserialize)]
struct RawBank {
    name: String,
    kind: ExerciseKind,
    #[serde(default)]
    example: Option<WorkedExample>,
    exercises: serde_json::Value,
}

/// The read-only question set for one exercise kind.
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseBank {
    pub name: String,
    pub kind: ExerciseKind,
    questions: Vec<Question>,
    example: Option<WorkedExample>,
}

impl ExerciseBank {
    /// Build a bank, validating every question.
    pub fn new(
        name: impl Into<String>,
        kind: ExerciseKind,
        questions: Vec<Question>,
    ) -> Result<Self, BankError> {
        let name = name.into();
        for (index, question) in questions.iter().enumerate() {
            if question.kind() != kind {
                return Err(BankError::KindMismatch {
                    bank: name,
                    expected: kind,
                    found: question.kind(),
                });
            }
            question.validate().map_err(|reason| BankError::Invalid {
                bank: name.clone(),
                index,
                reason,
            })?;
        }
        Ok(Self {
            name,
            kind,
            questions,
            example: None,
        })
    }

    /// Attach a worked example, validating it.
    pub fn with_example(mut self, example: WorkedExample) -> Result<Self, BankError> {
        example
            .validate()
            .map_err(|reason| BankError::InvalidExample {
                bank: self.name.clone(),
                reason,
            })?;
        self.example = Some(example);
        Ok(self)
    }

    /// A bank with no questions; sessions over it finish immediately.
    pub fn empty(kind: ExerciseKind) -> Self {
        Self {
            name: kind.to_string(),
            kind,
            questions: Vec::new(),
            example: None,
        }
    }

    /// The bank compiled into the binary.
    pub fn builtin(kind: ExerciseKind) -> Result<Self, BankError> {
        let file = BANK_DIR
            .get_file(kind.file_name())
            .ok_or(BankError::Missing(kind))?;
        let json = file.contents_utf8().ok_or(BankError::Missing(kind))?;
        Self::from_json(&kind.to_string(), kind, json)
    }

    pub fn from_path(path: &Path, kind: ExerciseKind) -> Result<Self, BankError> {
        let json = fs::read_to_string(path).map_err(|source| BankError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&path.display().to_string(), kind, &json)
    }

    /// Parse and validate a bank document. `label` names the source in errors.
    pub fn from_json(label: &str, kind: ExerciseKind, json: &str) -> Result<Self, BankError> {
        let parse_err = |source| BankError::Parse {
            bank: label.to_string(),
            source,
        };

        let raw: RawBank = serde_json::from_str(json).map_err(parse_err)?;
        if raw.kind != kind {
            return Err(BankError::KindMismatch {
                bank: label.to_string(),
                expected: kind,
                found: raw.kind,
            });
        }

        let questions = decode_questions(kind, raw.exercises).map_err(parse_err)?;
        let bank = Self::new(raw.name, kind, questions).map_err(|err| match err {
            BankError::Invalid { index, reason, .. } => BankError::Invalid {
                bank: label.to_string(),
                index,
                reason,
            },
            other => other,
        })?;
        match raw.example {
            Some(example) => bank.with_example(example).map_err(|err| match err {
                BankError::InvalidExample { reason, .. } => BankError::InvalidExample {
                    bank: label.to_string(),
                    reason,
                },
                other => other,
            }),
            None => Ok(bank),
        }
    }

    /// Load `kind`, preferring `<dir>/<kind>.json` when an override directory
    /// is configured and holds that file.
    pub fn load(kind: ExerciseKind, override_dir: Option<&Path>) -> Result<Self, BankError> {
        let bank = match override_dir.map(|dir| dir.join(kind.file_name())) {
            Some(path) if path.exists() => Self::from_path(&path, kind)?,
            _ => Self::builtin(kind)?,
        };
        log::info!(
            "loaded {} bank {:?} with {} questions",
            kind,
            bank.name,
            bank.len()
        );
        Ok(bank)
    }

    pub fn example(&self) -> Option<&WorkedExample> {
        self.example.as_ref()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

fn decode_questions(
    kind: ExerciseKind,
    exercises: serde_json::Value,
) -> Result<Vec<Question>, serde_json::Error> {
    fn typed<T: DeserializeOwned>(
        exercises: serde_json::Value,
        wrap: fn(T) -> Question,
    ) -> Result<Vec<Question>, serde_json::Error> {
        Ok(serde_json::from_value::<Vec<T>>(exercises)?
            .into_iter()
            .map(wrap)
            .collect())
    }

    match kind {
        ExerciseKind::CategorySort => typed(exercises, Question::CategorySort),
        ExerciseKind::FillIn => typed(exercises, Question::FillIn),
        ExerciseKind::GapFill => typed(exercises, Question::GapFill),
        ExerciseKind::Highlight => typed(exercises, Question::Highlight),
        ExerciseKind::ClickToChange => typed(exercises, Question::ClickToChange),
        ExerciseKind::MultiSelect => typed(exercises, Question::MultiSelect),
        ExerciseKind::Sequencing => typed(exercises, Question::Sequencing),
        ExerciseKind::TableMatch => typed(exercises, Question::TableMatch),
    }
}
