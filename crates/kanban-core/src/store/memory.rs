use std::collections::HashMap;

use super::KeyValueSlot;
use crate::error::StoreError;

/// Volatile slot. Counts writes so callers can check that no-op operations
/// really skip persistence.
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    values: HashMap<String, String>,
    writes: usize,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set` and `remove` calls so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl KeyValueSlot for MemorySlot {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.writes += 1;
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.writes += 1;
        self.values.remove(key);
        Ok(())
    }
}
