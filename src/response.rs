use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A user's answer to one question. The shape follows the exercise kind.
///
/// The same type doubles as the response buffer the presentation layer edits
/// while a question is on screen; every editing method is a no-op returning
/// `false` when called on a buffer of another shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", content = "value", rename_all = "snake_case")]
pub enum Response {
    /// item id -> category the item was dropped into
    Placement(BTreeMap<u32, String>),
    Text(String),
    /// blank position (char index in the word) -> letter typed there
    Letters(BTreeMap<usize, String>),
    /// word, character or option indices picked by the user
    Selection(BTreeSet<usize>),
    /// word index -> replacement typed by the user
    Corrections(BTreeMap<usize, String>),
    /// item ids in their current order
    Order(Vec<u32>),
    /// row index -> column id
    Columns(BTreeMap<usize, String>),
}

impl Response {
    pub fn shape(&self) -> &'static str {
        match self {
            Response::Placement(_) => "placement",
            Response::Text(_) => "text",
            Response::Letters(_) => "letters",
            Response::Selection(_) => "selection",
            Response::Corrections(_) => "corrections",
            Response::Order(_) => "order",
            Response::Columns(_) => "columns",
        }
    }

    /// True when the user has not provided anything yet.
    pub fn is_empty(&self) -> bool {
        match self {
            Response::Placement(m) => m.is_empty(),
            Response::Text(s) => s.trim().is_empty(),
            Response::Letters(m) => m.values().all(|l| l.trim().is_empty()),
            Response::Selection(s) => s.is_empty(),
            Response::Corrections(m) => m.values().all(|c| c.trim().is_empty()),
            Response::Order(v) => v.is_empty(),
            Response::Columns(m) => m.is_empty(),
        }
    }

    /// Drop an item into a category, moving it if it was already placed.
    pub fn place(&mut self, item_id: u32, category: &str) -> bool {
        match self {
            Response::Placement(m) => {
                m.insert(item_id, category.to_string());
                true
            }
            _ => false,
        }
    }

    /// Return an item to the unplaced pool.
    pub fn unplace(&mut self, item_id: u32) -> bool {
        match self {
            Response::Placement(m) => m.remove(&item_id).is_some(),
            _ => false,
        }
    }

    pub fn category_of(&self, item_id: u32) -> Option<&str> {
        match self {
            Response::Placement(m) => m.get(&item_id).map(String::as_str),
            _ => None,
        }
    }

    pub fn push_char(&mut self, c: char) -> bool {
        match self {
            Response::Text(s) => {
                s.push(c);
                true
            }
            _ => false,
        }
    }

    pub fn pop_char(&mut self) -> bool {
        match self {
            Response::Text(s) => s.pop().is_some(),
            _ => false,
        }
    }

    /// Fill one gap. Letters are stored lowercased and trimmed; an empty
    /// letter clears the gap.
    pub fn set_letter(&mut self, position: usize, letter: &str) -> bool {
        match self {
            Response::Letters(m) => {
                let letter = letter.trim().to_lowercase();
                if letter.is_empty() {
                    m.remove(&position);
                } else {
                    m.insert(position, letter);
                }
                true
            }
            _ => false,
        }
    }

    pub fn letter_at(&self, position: usize) -> Option<&str> {
        match self {
            Response::Letters(m) => m.get(&position).map(String::as_str),
            _ => None,
        }
    }

    /// Flip membership of `index`. Returns whether the buffer changed.
    pub fn toggle(&mut self, index: usize) -> bool {
        match self {
            Response::Selection(s) => {
                if !s.remove(&index) {
                    s.insert(index);
                }
                true
            }
            _ => false,
        }
    }

    /// Like [`Response::toggle`], but refuses to grow the selection past `cap`.
    pub fn toggle_capped(&mut self, index: usize, cap: usize) -> bool {
        match self {
            Response::Selection(s) => {
                if s.remove(&index) {
                    true
                } else if s.len() < cap {
                    s.insert(index)
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    pub fn is_selected(&self, index: usize) -> bool {
        match self {
            Response::Selection(s) => s.contains(&index),
            _ => false,
        }
    }

    /// Store a correction for a word; an empty correction removes the entry.
    pub fn set_correction(&mut self, word_index: usize, text: &str) -> bool {
        match self {
            Response::Corrections(m) => {
                if text.is_empty() {
                    m.remove(&word_index);
                } else {
                    m.insert(word_index, text.to_string());
                }
                true
            }
            _ => false,
        }
    }

    pub fn correction_at(&self, word_index: usize) -> Option<&str> {
        match self {
            Response::Corrections(m) => m.get(&word_index).map(String::as_str),
            _ => None,
        }
    }

    /// Move the item at position `from` to position `to`, shifting the rest.
    pub fn move_item(&mut self, from: usize, to: usize) -> bool {
        match self {
            Response::Order(v) if from < v.len() && to < v.len() => {
                if from != to {
                    let item = v.remove(from);
                    v.insert(to, item);
                }
                true
            }
            _ => false,
        }
    }

    pub fn select_column(&mut self, row: usize, column_id: &str) -> bool {
        match self {
            Response::Columns(m) => {
                m.insert(row, column_id.to_string());
                true
            }
            _ => false,
        }
    }

    pub fn column_of(&self, row: usize) -> Option<&str> {
        match self {
            Response::Columns(m) => m.get(&row).map(String::as_str),
            _ => None,
        }
    }
}
