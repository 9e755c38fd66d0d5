use super::migrate::{migrate, TaskRecord};
use super::KeyValueSlot;
use crate::error::StoreError;
use crate::models::{Task, TaskId};

pub const TASKS_KEY_PREFIX: &str = "todo-tasks-";

/// Storage key of an owner's collection. Owners never share a key.
pub fn tasks_key(owner_id: &str) -> String {
    format!("{TASKS_KEY_PREFIX}{owner_id}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedTasks {
    pub tasks: Vec<Task>,
    pub next_id: TaskId,
    /// The stored value was upgraded and written back during this load.
    pub migrated: bool,
}

/// Next free id: one past the largest id, or 1 for an empty collection.
/// `None` when the largest id is already `TaskId::MAX`.
pub fn next_id(tasks: &[Task]) -> Option<TaskId> {
    match tasks.iter().map(|t| t.id).max() {
        Some(max) => max.checked_add(1),
        None => Some(1),
    }
}

/// Load an owner's collection, migrating it if needed.
///
/// When migration changes anything the upgraded collection is saved before
/// returning, so the next load finds current data.
pub fn load<S: KeyValueSlot + ?Sized>(
    slot: &mut S,
    owner_id: &str,
) -> Result<LoadedTasks, StoreError> {
    let key = tasks_key(owner_id);

    let Some(raw) = slot.get(&key)? else {
        tracing::debug!(owner_id, "no stored tasks");
        return Ok(LoadedTasks {
            tasks: Vec::new(),
            next_id: 1,
            migrated: false,
        });
    };

    let records: Vec<TaskRecord> =
        serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
            key: key.clone(),
            source,
        })?;

    let migrated = migrate(records, owner_id);
    let next_id =
        next_id(&migrated.tasks).ok_or_else(|| StoreError::IdOverflow { key: key.clone() })?;

    if migrated.changed {
        tracing::info!(owner_id, tasks = migrated.tasks.len(), "migrated stored tasks");
        save(slot, owner_id, &migrated.tasks)?;
    }

    tracing::debug!(owner_id, tasks = migrated.tasks.len(), next_id, "loaded tasks");

    Ok(LoadedTasks {
        tasks: migrated.tasks,
        next_id,
        migrated: migrated.changed,
    })
}

/// Replace the owner's stored collection. This is the only write path for
/// task data.
pub fn save<S: KeyValueSlot + ?Sized>(
    slot: &mut S,
    owner_id: &str,
    tasks: &[Task],
) -> Result<(), StoreError> {
    let key = tasks_key(owner_id);
    let contents = serde_json::to_string_pretty(tasks).map_err(|source| StoreError::Serialize {
        key: key.clone(),
        source,
    })?;
    slot.set(&key, &contents)
}
