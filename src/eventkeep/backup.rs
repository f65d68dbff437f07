//! Shadow copy of the last saved collection.
//!
//! The backup is refreshed on every save with the value *being* saved, so it
//! trails the primary by one save. It protects against a primary slot that
//! goes bad on disk, not against saving bad data.

use crate::codec;
use crate::error::{EventKeepError, Result};
use crate::model::Event;
use crate::store::{SlotStore, BACKUP_KEY, BACKUP_TIMESTAMP_KEY};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupStatus {
    Written,
    /// The collection was empty; an existing backup was left alone.
    SkippedEmpty,
    Failed,
}

/// Write `events` to the backup slot, stamped with the current time.
///
/// Never replaces a real backup with an empty one.
pub fn create_backup<S: SlotStore>(slots: &S, events: &[Event]) -> Result<BackupStatus> {
    if events.is_empty() {
        tracing::debug!("Skipping backup of empty collection");
        return Ok(BackupStatus::SkippedEmpty);
    }

    let bytes = codec::encode(events)?;
    slots.write(BACKUP_KEY, &bytes)?;
    // The backup itself is in place; a missing marker only loses its age
    if let Err(e) = slots.write(BACKUP_TIMESTAMP_KEY, Utc::now().to_rfc3339().as_bytes()) {
        tracing::warn!("Backup written but its timestamp was not: {}", e);
    }

    tracing::debug!(count = events.len(), "Backup written");
    Ok(BackupStatus::Written)
}

pub fn has_backup<S: SlotStore>(slots: &S) -> bool {
    match slots.read(BACKUP_KEY) {
        Ok(Some(bytes)) => !bytes.is_empty(),
        Ok(None) => false,
        Err(e) => {
            tracing::warn!("Could not read backup slot: {}", e);
            false
        }
    }
}

/// Decode the backup slot, or explain why it can't be used.
pub fn try_restore<S: SlotStore>(slots: &S) -> Result<Vec<Event>> {
    let bytes = slots
        .read(BACKUP_KEY)
        .map_err(|e| EventKeepError::EmptyBackupRestore(e.to_string()))?
        .ok_or_else(|| EventKeepError::EmptyBackupRestore("backup slot is empty".to_string()))?;

    codec::decode(&bytes).map_err(|e| EventKeepError::EmptyBackupRestore(e.to_string()))
}

/// The backup's collection, or an empty one if it cannot be decoded.
///
/// There is nothing behind the backup: failure here is final.
pub fn restore<S: SlotStore>(slots: &S) -> Vec<Event> {
    try_restore(slots).unwrap_or_else(|e| {
        tracing::error!("{}", e);
        Vec::new()
    })
}

/// When the backup was last written, if ever.
pub fn last_backup_at<S: SlotStore>(slots: &S) -> Option<DateTime<Utc>> {
    let bytes = slots.read(BACKUP_TIMESTAMP_KEY).ok()??;
    let text = String::from_utf8(bytes).ok()?;
    DateTime::parse_from_rfc3339(text.trim())
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
