use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::ids::time_id;

/// A note attached to a task. Never edited once created; `author_name` is a
/// snapshot of the author's name at the time of writing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub content: String,
    pub author_id: String,
    pub author_name: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(content: &str, author_id: &str, author_name: &str) -> Result<Self, ValidationError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ValidationError::EmptyComment);
        }

        let now = Utc::now();
        Ok(Self {
            id: time_id(now),
            content: content.to_string(),
            author_id: author_id.to_string(),
            author_name: author_name.to_string(),
            created_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_comment_snapshots_author() {
        let comment = Comment::new(" done ", "u1", "Alice").unwrap();
        assert_eq!(comment.content, "done");
        assert_eq!(comment.author_id, "u1");
        assert_eq!(comment.author_name, "Alice");
    }

    #[test]
    fn whitespace_comment_is_rejected() {
        assert_eq!(
            Comment::new("  ", "u1", "Alice"),
            Err(ValidationError::EmptyComment)
        );
    }

    #[test]
    fn back_to_back_comments_get_distinct_ids() {
        let a = Comment::new("a", "u1", "Alice").unwrap();
        let b = Comment::new("b", "u1", "Alice").unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn created_at_is_written_as_iso_8601() {
        let comment = Comment::new("x", "u1", "Alice").unwrap();
        let json = serde_json::to_value(&comment).unwrap();
        let raw = json["createdAt"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(raw).is_ok());
    }
}
