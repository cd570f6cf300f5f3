use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{require_prompt, ExerciseKind, InvalidQuestion, Validate};
use crate::evaluator::{Evaluate, ResponseMismatch, Verdict};
use crate::response::Response;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    pub text: String,
    /// Id of the column this row belongs in.
    pub correct_answer: String,
}

/// Tick one column per row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMatch {
    pub question: String,
    pub columns: Vec<Column>,
    pub rows: Vec<TableRow>,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl TableMatch {
    pub fn column_index(&self, id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.id == id)
    }

    fn label(&self, id: Option<&str>) -> &str {
        id.and_then(|id| self.columns.iter().find(|c| c.id == id))
            .map(|c| c.label.as_str())
            .unwrap_or("_")
    }
}

impl Evaluate for TableMatch {
    fn blank_response(&self) -> Response {
        Response::Columns(BTreeMap::new())
    }

    fn can_submit(&self, response: &Response) -> bool {
        match response {
            Response::Columns(picked) => {
                !self.rows.is_empty() && (0..self.rows.len()).all(|i| picked.contains_key(&i))
            }
            _ => false,
        }
    }

    fn evaluate(&self, response: &Response) -> Result<Verdict, ResponseMismatch> {
        let Response::Columns(picked) = response else {
            return Err(ResponseMismatch::new(ExerciseKind::TableMatch, "columns", response));
        };

        let is_correct = !self.rows.is_empty()
            && self
                .rows
                .iter()
                .enumerate()
                .all(|(i, row)| picked.get(&i) == Some(&row.correct_answer));

        let user_answer = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let picked = picked.get(&i).map(String::as_str);
                format!("{}: {}", row.text, self.label(picked))
            })
            .join("; ");
        let correct_answer = self
            .rows
            .iter()
            .map(|row| format!("{}: {}", row.text, self.label(Some(row.correct_answer.as_str()))))
            .join("; ");

        Ok(Verdict::new(is_correct, user_answer, correct_answer))
    }
}

impl Validate for TableMatch {
    fn validate(&self) -> Result<(), InvalidQuestion> {
        require_prompt(&self.question)?;
        if self.columns.is_empty() {
            return Err(InvalidQuestion::Empty("columns"));
        }
        if self.rows.is_empty() {
            return Err(InvalidQuestion::Empty("rows"));
        }
        for (row, r) in self.rows.iter().enumerate() {
            if self.column_index(&r.correct_answer).is_none() {
                return Err(InvalidQuestion::UnknownColumn {
                    row,
                    column: r.correct_answer.clone(),
                });
            }
        }
        Ok(())
    }
}
