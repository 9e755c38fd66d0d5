//! Upgrades stored task records to the current shape.
//!
//! Two shapes exist on disk:
//!
//! - **current**: `{ id, text, completed, ownerId, comments }`
//! - **legacy**: written before comments existed, so `comments` (and on the
//!   oldest data, the owner) may be missing or `null`.
//!
//! [`migrate`] is pure and total over both shapes. Running it over data that
//! is already current changes nothing and reports `changed == false`.

use serde::Deserialize;

use crate::models::{Comment, Task, TaskId};

/// A task as found in storage, before migration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TaskRecord {
    Current(Task),
    Legacy(LegacyTask),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyTask {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
    #[serde(default, alias = "userId")]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub comments: Option<Vec<Comment>>,
}

impl TaskRecord {
    /// Bring one record up to date. The flag is true when anything had to be
    /// filled in.
    pub fn upgrade(self, owner_id: &str) -> (Task, bool) {
        match self {
            Self::Current(task) => (task, false),
            Self::Legacy(legacy) => {
                let task = Task {
                    id: legacy.id,
                    text: legacy.text,
                    completed: legacy.completed,
                    owner_id: legacy.owner_id.unwrap_or_else(|| owner_id.to_string()),
                    comments: legacy.comments.unwrap_or_default(),
                };
                (task, true)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migrated {
    pub tasks: Vec<Task>,
    pub changed: bool,
}

pub fn migrate(records: Vec<TaskRecord>, owner_id: &str) -> Migrated {
    let mut changed = false;
    let tasks = records
        .into_iter()
        .map(|record| {
            let (task, upgraded) = record.upgrade(owner_id);
            changed |= upgraded;
            task
        })
        .collect();

    Migrated { tasks, changed }
}
