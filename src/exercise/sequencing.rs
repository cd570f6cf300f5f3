use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{require_prompt, ExerciseKind, InvalidQuestion, Validate};
use crate::evaluator::{Evaluate, ResponseMismatch, Verdict};
use crate::response::Response;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceItem {
    pub id: u32,
    pub content: String,
    /// 1-based position of the item in the correct sequence.
    pub order: u32,
}

/// Put the items in order. Items start in the order they are listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequencing {
    pub question: String,
    pub options: Vec<SequenceItem>,
    #[serde(default)]
    pub solution: Option<String>,
}

impl Sequencing {
    pub fn item(&self, id: u32) -> Option<&SequenceItem> {
        self.options.iter().find(|o| o.id == id)
    }

    fn contents<'a>(&'a self, items: impl Iterator<Item = &'a SequenceItem>) -> String {
        items.map(|o| o.content.as_str()).join(" → ")
    }
}

impl Evaluate for Sequencing {
    fn blank_response(&self) -> Response {
        Response::Order(self.options.iter().map(|o| o.id).collect())
    }

    fn can_submit(&self, response: &Response) -> bool {
        matches!(response, Response::Order(ids) if ids.len() == self.options.len())
    }

    fn evaluate(&self, response: &Response) -> Result<Verdict, ResponseMismatch> {
        let Response::Order(ids) = response else {
            return Err(ResponseMismatch::new(ExerciseKind::Sequencing, "order", response));
        };

        let is_correct = !ids.is_empty()
            && ids.len() == self.options.len()
            && ids.iter().enumerate().all(|(position, id)| {
                self.item(*id)
                    .is_some_and(|item| item.order as usize == position + 1)
            });

        Ok(Verdict::new(
            is_correct,
            self.contents(ids.iter().filter_map(|id| self.item(*id))),
            self.contents(self.options.iter().sorted_by_key(|o| o.order)),
        ))
    }
}

impl Validate for Sequencing {
    fn validate(&self) -> Result<(), InvalidQuestion> {
        require_prompt(&self.question)?;
        if self.options.is_empty() {
            return Err(InvalidQuestion::Empty("options"));
        }

        let mut seen = HashSet::new();
        if let Some(dup) = self.options.iter().find(|o| !seen.insert(o.id)) {
            return Err(InvalidQuestion::DuplicateId(dup.id));
        }

        let len = self.options.len();
        let orders = self.options.iter().map(|o| o.order as usize).sorted();
        if !orders.eq(1..=len) {
            return Err(InvalidQuestion::BadOrdering { len });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u32, content: &str, order: u32) -> SequenceItem {
        SequenceItem {
            id,
            content: content.into(),
            order,
        }
    }

    fn morning() -> Sequencing {
        Sequencing {
            question: "Put the morning in order".into(),
            options: vec![
                item(1, "brush teeth", 2),
                item(2, "wake up", 1),
                item(3, "go to school", 3),
            ],
            solution: None,
        }
    }

    #[test]
    fn listed_order_is_incorrect() {
        let q = morning();
        let r = q.blank_response();
        assert!(q.can_submit(&r));

        let verdict = q.evaluate(&r).unwrap();
        assert!(!verdict.is_correct);
        assert_eq!(verdict.user_answer, "brush teeth → wake up → go to school");
        assert_eq!(verdict.correct_answer, "wake up → brush teeth → go to school");
    }

    #[test]
    fn reordered_items_are_correct() {
        let q = morning();
        let mut r = q.blank_response();
        r.move_item(1, 0);
        assert_eq!(r, Response::Order(vec![2, 1, 3]));
        assert!(q.evaluate(&r).unwrap().is_correct);
    }

    #[test]
    fn empty_order_is_incorrect() {
        let q = morning();
        assert!(!q.evaluate(&Response::Order(vec![])).unwrap().is_correct);
    }

    #[test]
    fn gap_in_orders_fails_validation() {
        let mut q = morning();
        q.options[2].order = 4;
        assert_eq!(q.validate(), Err(InvalidQuestion::BadOrdering { len: 3 }));
        assert!(morning().validate().is_ok());
    }
}
