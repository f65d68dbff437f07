use super::SlotStore;
use crate::error::{EventKeepError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// File-backed slots: `<root>/<group id>/<key>`.
///
/// Any process pointed at the same root and group sees the same slots.
pub struct FsSlotStore {
    dir: PathBuf,
}

impl FsSlotStore {
    pub fn new(root: impl AsRef<Path>, group_id: &str) -> Self {
        Self {
            dir: root.as_ref().join(group_id),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(EventKeepError::Io)?;
        }
        Ok(())
    }
}

impl SlotStore for FsSlotStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.slot_path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(EventKeepError::read(key, e.to_string())),
        }
    }

    fn write(&self, key: &str, bytes: &[u8]) -> Result<()> {
        self.ensure_dir()
            .map_err(|e| EventKeepError::write(key, e.to_string()))?;

        // Atomic write: readers in the widget process must never see a partial blob
        let tmp_path = self.dir.join(format!(".{}-{}.tmp", key, Uuid::new_v4()));
        fs::write(&tmp_path, bytes).map_err(|e| EventKeepError::write(key, e.to_string()))?;
        if let Err(e) = fs::rename(&tmp_path, self.slot_path(key)) {
            let _ = fs::remove_file(&tmp_path);
            return Err(EventKeepError::write(key, e.to_string()));
        }

        Ok(())
    }
}
