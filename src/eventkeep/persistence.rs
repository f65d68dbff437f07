//! # Persistence Gateway
//!
//! Load and save the event collection, and recover when the primary slot is
//! damaged. Neither operation returns an error: every failure is resolved
//! through the fallback ladder below, logged, and recorded in the returned
//! report so callers (and tests) can see which path was taken.
//!
//! ## Load
//!
//! ```text
//! primary missing/empty ──────────────────────────────▶ empty
//! primary unreadable or undecodable ─┬─ backup ──────▶ restore + heal
//!                                    └─ no backup ───▶ empty
//! primary decodes but is suspicious ─┬─ backup ──────▶ restore + heal
//!                                    └─ no backup ───▶ accept as is
//! primary decodes and looks fine ─────────────────────▶ accept
//! ```
//!
//! "Heal" is a full save of the restored collection, so the next load reads
//! a good primary without consulting the backup.
//!
//! ## Save
//!
//! 1. Warn (never block) about events with an empty title or zeroed date.
//! 2. Back up the collection being saved. Failure here is non-fatal.
//! 3. Encode and write the primary slot.
//! 4. If that fails, drop the events from step 1 and try once more.
//! 5. On success, fire the timeline refresh signal.

use crate::backup::{self, BackupStatus};
use crate::codec;
use crate::error::{EventKeepError, Result};
use crate::model::Event;
use crate::notify::TimelineRefresher;
use crate::store::{SlotStore, PRIMARY_KEY};
use crate::validity;
use chrono::{DateTime, Local, NaiveDateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Nothing stored yet.
    Empty,
    Primary,
    Backup,
    /// Primary was unusable and nothing could be restored.
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corruption {
    Unreadable,
    Undecodable,
    Suspicious,
}

#[derive(Debug)]
pub struct LoadReport {
    pub source: LoadSource,
    pub corruption: Option<Corruption>,
    /// Outcome of the write-through after a recovery.
    pub healed: Option<SaveStatus>,
    pub errors: Vec<EventKeepError>,
}

impl LoadReport {
    fn new(source: LoadSource) -> Self {
        Self {
            source,
            corruption: None,
            healed: None,
            errors: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Saved,
    /// Saved on retry after dropping `dropped` unsaveable events.
    Partial { dropped: usize },
    Failed,
}

#[derive(Debug)]
pub struct SaveReport {
    pub status: SaveStatus,
    pub backup: BackupStatus,
    pub errors: Vec<EventKeepError>,
    /// What was actually written after a partial save.
    pub retained: Option<Vec<Event>>,
}

impl SaveReport {
    pub fn is_saved(&self) -> bool {
        self.status != SaveStatus::Failed
    }
}

pub struct Persistence<S: SlotStore, R: TimelineRefresher> {
    slots: S,
    refresher: R,
}

impl<S: SlotStore, R: TimelineRefresher> Persistence<S, R> {
    pub fn new(slots: S, refresher: R) -> Self {
        Self { slots, refresher }
    }

    pub fn slots(&self) -> &S {
        &self.slots
    }

    pub fn has_backup(&self) -> bool {
        backup::has_backup(&self.slots)
    }

    pub fn backup_taken_at(&self) -> Option<DateTime<Utc>> {
        backup::last_backup_at(&self.slots)
    }

    pub fn load(&self) -> (Vec<Event>, LoadReport) {
        self.load_at(Local::now().naive_local())
    }

    /// Load, judging plausibility against `now`.
    pub fn load_at(&self, now: NaiveDateTime) -> (Vec<Event>, LoadReport) {
        let mut report = LoadReport::new(LoadSource::Primary);

        let bytes = match self.slots.read(PRIMARY_KEY) {
            Ok(Some(bytes)) if !bytes.is_empty() => bytes,
            Ok(_) => {
                tracing::debug!("No saved events, starting empty");
                return (Vec::new(), LoadReport::new(LoadSource::Empty));
            }
            Err(e) => {
                tracing::warn!("Primary slot unreadable: {}", e);
                report.errors.push(e);
                return self.recover(Corruption::Unreadable, None, report);
            }
        };

        let events = match codec::decode(&bytes) {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!("Primary slot corrupted: {}", e);
                report.errors.push(e);
                return self.recover(Corruption::Undecodable, None, report);
            }
        };

        let issues = validity::find_issues(&events, now);
        if !issues.is_empty() {
            tracing::warn!(?issues, "Saved events look implausible");
            return self.recover(Corruption::Suspicious, Some(events), report);
        }

        tracing::debug!(count = events.len(), "Loaded events");
        (events, report)
    }

    fn recover(
        &self,
        corruption: Corruption,
        suspicious: Option<Vec<Event>>,
        mut report: LoadReport,
    ) -> (Vec<Event>, LoadReport) {
        report.corruption = Some(corruption);

        if !self.has_backup() {
            return match suspicious {
                Some(events) => {
                    // Refusing to load would lose whatever real data is in there
                    tracing::warn!("No backup available, keeping suspicious events");
                    report.source = LoadSource::Primary;
                    (events, report)
                }
                None => {
                    tracing::error!("No backup available, starting empty");
                    report.source = LoadSource::Reset;
                    (Vec::new(), report)
                }
            };
        }

        let events = match backup::try_restore(&self.slots) {
            Ok(events) => {
                tracing::warn!(count = events.len(), "Restored events from backup");
                report.source = LoadSource::Backup;
                events
            }
            Err(e) => {
                tracing::error!("{}", e);
                report.errors.push(e);
                report.source = LoadSource::Reset;
                Vec::new()
            }
        };

        let mut healed = self.save(&events);
        report.healed = Some(healed.status);
        report.errors.append(&mut healed.errors);
        let events = healed.retained.take().unwrap_or(events);
        (events, report)
    }

    pub fn save(&self, events: &[Event]) -> SaveReport {
        for event in validity::save_warnings(events) {
            tracing::warn!(id = %event.id, "Saving event with an empty title or zeroed date");
        }

        let mut errors = Vec::new();
        let backup = match backup::create_backup(&self.slots, events) {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!("Backup failed, saving anyway: {}", e);
                errors.push(e);
                BackupStatus::Failed
            }
        };

        if let Err(e) = self.write_primary(events) {
            tracing::warn!("Save failed, retrying without unsaveable events: {}", e);
            errors.push(e);
            return self.save_partial(events, backup, errors);
        }

        tracing::debug!(count = events.len(), "Saved events");
        self.refresher.reload_all_timelines();
        SaveReport {
            status: SaveStatus::Saved,
            backup,
            errors,
            retained: None,
        }
    }

    fn save_partial(
        &self,
        events: &[Event],
        backup: BackupStatus,
        mut errors: Vec<EventKeepError>,
    ) -> SaveReport {
        let kept: Vec<Event> = events
            .iter()
            .filter(|e| validity::is_saveable(e))
            .cloned()
            .collect();

        match self.write_primary(&kept) {
            Ok(()) => {
                let dropped = events.len() - kept.len();
                tracing::warn!(dropped, "Saved events after dropping unsaveable ones");
                self.refresher.reload_all_timelines();
                SaveReport {
                    status: SaveStatus::Partial { dropped },
                    backup,
                    errors,
                    retained: Some(kept),
                }
            }
            Err(e) => {
                tracing::error!("Could not save events: {}", e);
                errors.push(e);
                SaveReport {
                    status: SaveStatus::Failed,
                    backup,
                    errors,
                    retained: None,
                }
            }
        }
    }

    fn write_primary(&self, events: &[Event]) -> Result<()> {
        let bytes = codec::encode(events)?;
        self.slots.write(PRIMARY_KEY, &bytes)
    }
}
