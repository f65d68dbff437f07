//! Plausibility checks on decoded collections.
//!
//! A document can decode cleanly and still be garbage: flipped bits in a
//! stored date can land it centuries away. These heuristics catch data that
//! no user could have entered.

use crate::model::Event;
use chrono::{Months, NaiveDateTime};
use uuid::Uuid;

pub const MAX_FUTURE_YEARS: u32 = 100;
pub const MAX_TITLE_CHARS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suspicion {
    FarFuture(Uuid),
    BeforeEpoch(Uuid),
    OversizedTitle(Uuid),
}

/// Every implausible value in `events`, judged against `now`.
pub fn find_issues(events: &[Event], now: NaiveDateTime) -> Vec<Suspicion> {
    let horizon = now.checked_add_months(Months::new(MAX_FUTURE_YEARS * 12));
    let mut issues = Vec::new();

    for event in events {
        // An unrepresentable horizon means nothing can be past it.
        if horizon.is_some_and(|h| event.date > h) {
            issues.push(Suspicion::FarFuture(event.id));
        }
        if event.date < NaiveDateTime::UNIX_EPOCH {
            issues.push(Suspicion::BeforeEpoch(event.id));
        }
        if event.title.chars().count() > MAX_TITLE_CHARS {
            issues.push(Suspicion::OversizedTitle(event.id));
        }
    }

    issues
}

pub fn is_suspicious(events: &[Event], now: NaiveDateTime) -> bool {
    !find_issues(events, now).is_empty()
}

/// Events that should never be written: an empty title or a zeroed date.
pub fn save_warnings(events: &[Event]) -> Vec<&Event> {
    events.iter().filter(|e| !is_saveable(e)).collect()
}

pub fn is_saveable(event: &Event) -> bool {
    !event.title.is_empty() && !event.has_epoch_zero_date()
}
