use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use super::{require_prompt, ExerciseKind, InvalidQuestion, Validate};
use crate::evaluator::{Evaluate, ResponseMismatch, Verdict};
use crate::response::Response;

/// An item to be dropped into one of the categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortItem {
    pub id: u32,
    pub content: String,
    pub category: String,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySort {
    pub question: String,
    pub categories: Vec<String>,
    pub options: Vec<SortItem>,
}

impl CategorySort {
    pub fn item(&self, id: u32) -> Option<&SortItem> {
        self.options.iter().find(|o| o.id == id)
    }

    /// "A: x, y; B: z" for the given item -> category assignment.
    fn describe(&self, in_category: impl Fn(&SortItem, &str) -> bool) -> String {
        self.categories
            .iter()
            .map(|category| {
                let items = self
                    .options
                    .iter()
                    .filter(|o| in_category(o, category))
                    .map(|o| o.content.as_str())
                    .collect::<Vec<_>>();
                format!("{}: {}", category, items.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl Evaluate for CategorySort {
    fn blank_response(&self) -> Response {
        Response::Placement(BTreeMap::new())
    }

    fn can_submit(&self, response: &Response) -> bool {
        match response {
            Response::Placement(placed) => {
                !self.options.is_empty() && self.options.iter().all(|o| placed.contains_key(&o.id))
            }
            _ => false,
        }
    }

    fn evaluate(&self, response: &Response) -> Result<Verdict, ResponseMismatch> {
        let Response::Placement(placed) = response else {
            return Err(ResponseMismatch::new(
                ExerciseKind::CategorySort,
                "placement",
                response,
            ));
        };

        let all_placed = placed.len() == self.options.len()
            && self.options.iter().all(|o| placed.contains_key(&o.id));
        let is_correct = !placed.is_empty()
            && all_placed
            && self
                .options
                .iter()
                .all(|o| placed.get(&o.id) == Some(&o.category));

        Ok(Verdict::new(
            is_correct,
            self.describe(|o, c| placed.get(&o.id).is_some_and(|p| p == c)),
            self.describe(|o, c| o.category == c),
        ))
    }
}

impl Validate for CategorySort {
    fn validate(&self) -> Result<(), InvalidQuestion> {
        require_prompt(&self.question)?;
        if self.categories.is_empty() {
            return Err(InvalidQuestion::Empty("categories"));
        }
        if self.options.is_empty() {
            return Err(InvalidQuestion::Empty("options"));
        }

        let mut seen = HashSet::new();
        for item in &self.options {
            if !seen.insert(item.id) {
                return Err(InvalidQuestion::DuplicateId(item.id));
            }
            if !self.categories.contains(&item.category) {
                return Err(InvalidQuestion::UnknownCategory {
                    item: item.id,
                    category: item.category.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn two_items() -> CategorySort {
        CategorySort {
            question: "Sort the words".into(),
            categories: vec!["A".into(), "B".into()],
            options: vec![
                SortItem {
                    id: 1,
                    content: "one".into(),
                    category: "A".into(),
                    label: None,
                },
                SortItem {
                    id: 2,
                    content: "two".into(),
                    category: "B".into(),
                    label: None,
                },
            ],
        }
    }

    #[test]
    fn matching_placement_is_correct() {
        let q = two_items();
        let mut r = q.blank_response();
        r.place(1, "A");
        r.place(2, "B");

        let verdict = q.evaluate(&r).unwrap();
        assert!(verdict.is_correct);
        assert_eq!(verdict.user_answer, "A: one; B: two");
        assert_eq!(verdict.user_answer, verdict.correct_answer);
    }

    #[test]
    fn swapped_placement_is_incorrect() {
        let q = two_items();
        let mut r = q.blank_response();
        r.place(1, "B");
        r.place(2, "A");

        let verdict = q.evaluate(&r).unwrap();
        assert!(!verdict.is_correct);
        assert_eq!(verdict.user_answer, "A: two; B: one");
    }

    #[test]
    fn partial_placement_cannot_be_submitted_and_is_incorrect() {
        let q = two_items();
        let mut r = q.blank_response();
        r.place(1, "A");

        assert!(!q.can_submit(&r));
        assert!(!q.evaluate(&r).unwrap().is_correct);
    }

    #[test]
    fn nothing_placed_is_incorrect() {
        let q = two_items();
        assert!(!q.evaluate(&q.blank_response()).unwrap().is_correct);
    }

    #[test]
    fn wrong_shape_is_rejected() {
        let q = two_items();
        assert_matches!(
            q.evaluate(&Response::Text("A".into())),
            Err(ResponseMismatch { expected: "placement", got: "text", .. })
        );
    }

    #[test]
    fn unknown_category_fails_validation() {
        let mut q = two_items();
        q.options[1].category = "C".into();
        assert_matches!(
            q.validate(),
            Err(InvalidQuestion::UnknownCategory { item: 2, .. })
        );
    }

    #[test]
    fn duplicate_ids_fail_validation() {
        let mut q = two_items();
        q.options[1].id = 1;
        assert_eq!(q.validate(), Err(InvalidQuestion::DuplicateId(1)));
    }
}
