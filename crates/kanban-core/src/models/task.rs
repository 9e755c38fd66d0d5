use serde::{Deserialize, Serialize};

use super::Comment;
use crate::error::ValidationError;

pub type TaskId = i64;

/// A single card on the board.
///
/// `id` is unique and increasing within one owner's collection only; two
/// owners may both have a task `1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
    #[serde(alias = "userId")]
    pub owner_id: String,
    pub comments: Vec<Comment>,
}

impl Task {
    /// Build a fresh incomplete task. The text is stored trimmed.
    pub fn new(text: &str, owner_id: &str, id: TaskId) -> Result<Self, ValidationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyTaskText);
        }

        Ok(Self {
            id,
            text: text.to_string(),
            completed: false,
            owner_id: owner_id.to_string(),
            comments: Vec::new(),
        })
    }
}
