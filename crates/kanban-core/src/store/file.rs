use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::KeyValueSlot;
use crate::error::StoreError;

/// One JSON file per key inside a data directory.
///
/// Keys are percent-encoded into file names so that distinct keys can never
/// map to the same file.
#[derive(Debug, Clone)]
pub struct FileSlot {
    dir: PathBuf,
}

impl FileSlot {
    /// Open (and create if needed) the data directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", urlencoding::encode(key)))
    }
}

impl KeyValueSlot for FileSlot {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let bytes = match fs::read(self.path_for(key)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        String::from_utf8(bytes)
            .map(Some)
            .map_err(|source| StoreError::NotUtf8 {
                key: key.to_string(),
                source,
            })
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        // Write beside the target and rename so a crash never leaves half a file.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        tracing::trace!(key, path = %path.display(), "wrote slot");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let slot = FileSlot::open(dir.path()).unwrap();
        assert_eq!(slot.get("todo-tasks-u1").unwrap(), None);
    }

    #[test]
    fn set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let mut slot = FileSlot::open(dir.path()).unwrap();

        slot.set("todo-auth", "{}").unwrap();
        assert_eq!(slot.get("todo-auth").unwrap().as_deref(), Some("{}"));

        slot.remove("todo-auth").unwrap();
        assert_eq!(slot.get("todo-auth").unwrap(), None);
        slot.remove("todo-auth").unwrap();
    }

    #[test]
    fn path_like_keys_stay_inside_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut slot = FileSlot::open(dir.path()).unwrap();

        slot.set("todo-tasks-../escape", "[]").unwrap();
        slot.set("todo-tasks-a/b", "[1]").unwrap();
        slot.set("todo-tasks-a%2Fb", "[2]").unwrap();

        assert_eq!(slot.get("todo-tasks-a/b").unwrap().as_deref(), Some("[1]"));
        assert_eq!(slot.get("todo-tasks-a%2Fb").unwrap().as_deref(), Some("[2]"));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 3);
    }

    #[test]
    fn non_utf8_value_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let slot = FileSlot::open(dir.path()).unwrap();
        fs::write(dir.path().join("todo-tasks-u1.json"), [0xff, 0xfe, b'[', b']']).unwrap();

        let err = slot.get("todo-tasks-u1").unwrap_err();
        assert!(err.is_corrupt());
        assert!(matches!(err, StoreError::NotUtf8 { ref key, .. } if key == "todo-tasks-u1"));
    }

    #[test]
    fn creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("data").join("kanban");
        let slot = FileSlot::open(&nested).unwrap();
        assert!(slot.dir().is_dir());
    }
}
