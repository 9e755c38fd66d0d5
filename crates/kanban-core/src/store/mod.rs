//! Durable key-value storage and the task collection stored in it.

mod file;
mod memory;
pub mod migrate;
pub mod tasks;

pub use file::FileSlot;
pub use memory::MemorySlot;
pub use tasks::{load, save, tasks_key, LoadedTasks};

use crate::error::StoreError;

/// A durable string-valued slot addressed by key.
///
/// Each `set` replaces the whole value; there are no partial writes.
pub trait KeyValueSlot {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}
