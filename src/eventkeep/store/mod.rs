//! # Slot Storage
//!
//! Events live in a small key-value namespace shared between the app and the
//! widget renderer. Each key holds one opaque byte blob (a "slot"), and the
//! [`SlotStore`] trait is the only way the rest of the crate touches it.
//!
//! ## Keys
//!
//! ```text
//! <root>/<group id>/
//! ├── savedEvents               # primary: the current collection
//! ├── savedEvents_backup        # backup: the collection as of the last save
//! └── events_backup_timestamp   # RFC 3339 instant of the last backup write
//! ```
//!
//! ## Visibility
//!
//! Writes replace the whole value. A reader in another process sees either
//! the old blob or the new one, never a torn write. There is exactly one
//! writer (the app), so last-writer-wins needs no coordination.
//!
//! ## Implementations
//!
//! - [`fs::FsSlotStore`]: one file per key, written via temp file + rename.
//! - [`memory::MemSlotStore`]: in-memory, with write failure injection for tests.

use crate::error::Result;

pub mod fs;
pub mod memory;

pub const PRIMARY_KEY: &str = "savedEvents";
pub const BACKUP_KEY: &str = "savedEvents_backup";
pub const BACKUP_TIMESTAMP_KEY: &str = "events_backup_timestamp";

/// Raw byte-slot I/O.
pub trait SlotStore {
    /// Returns `Ok(None)` when the key has never been written.
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Replace the slot's value. MUST be atomic with respect to readers.
    fn write(&self, key: &str, bytes: &[u8]) -> Result<()>;
}

impl<T: SlotStore + ?Sized> SlotStore for &T {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, bytes: &[u8]) -> Result<()> {
        (**self).write(key, bytes)
    }
}
