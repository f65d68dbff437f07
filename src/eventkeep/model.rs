use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single calendar entry.
///
/// `date` is a local wall-clock time. No timezone is attached and none is
/// applied when comparing, so "the same day" always means the same local day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub date: NaiveDateTime,
    pub notes: String,
    pub is_completed: bool,
}

impl Event {
    pub fn new(title: impl Into<String>, date: NaiveDateTime, notes: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            date,
            notes: notes.into(),
            is_completed: false,
        }
    }

    /// True for the Unix epoch origin itself, the value a zeroed date decodes to.
    pub fn has_epoch_zero_date(&self) -> bool {
        self.date == NaiveDateTime::UNIX_EPOCH
    }
}
