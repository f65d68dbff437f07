//! Wire form for a collection of events.
//!
//! Collections are stored as a JSON array of objects:
//!
//! ```text
//! [
//!   {
//!     "id": "6f1c…",
//!     "title": "Dentist",
//!     "date": "2024-03-01T09:30:00",
//!     "notes": "",
//!     "isCompleted": false
//!   }
//! ]
//! ```
//!
//! Decoding is all-or-nothing: one malformed element rejects the whole document.

use crate::error::{EventKeepError, Result};
use crate::model::Event;

pub fn encode(events: &[Event]) -> Result<Vec<u8>> {
    serde_json::to_vec(events).map_err(EventKeepError::Encoding)
}

pub fn decode(bytes: &[u8]) -> Result<Vec<Event>> {
    serde_json::from_slice(bytes).map_err(EventKeepError::Decoding)
}
