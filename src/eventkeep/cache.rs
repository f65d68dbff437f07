//! # Event Cache
//!
//! The in-memory collection the app reads from. It is the only thing that
//! mutates events, and every mutation is followed by a full save through the
//! [`Persistence`] gateway (there is no incremental persistence).
//!
//! One cache is built at startup and handed to whatever needs it. It is not
//! shared across threads; mutators take `&mut self`.
//!
//! Queries are linear scans. Order is insertion order unless a query says
//! otherwise.

use crate::error::EventKeepError;
use crate::model::Event;
use crate::notify::TimelineRefresher;
use crate::persistence::{LoadReport, Persistence, SaveReport};
use crate::store::SlotStore;
use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use uuid::Uuid;

pub const DEFAULT_UPCOMING_DAYS: i64 = 7;

/// Outcome of a mutator.
#[derive(Debug)]
pub enum Mutation {
    Persisted(SaveReport),
    /// Nothing changed and nothing was written.
    Skipped(EventKeepError),
}

impl Mutation {
    pub fn is_persisted(&self) -> bool {
        matches!(self, Mutation::Persisted(report) if report.is_saved())
    }
}

pub struct EventCache<S: SlotStore, R: TimelineRefresher> {
    events: Vec<Event>,
    persistence: Persistence<S, R>,
}

impl<S: SlotStore, R: TimelineRefresher> EventCache<S, R> {
    /// An empty cache. Call [`load`](Self::load) to populate it.
    pub fn new(persistence: Persistence<S, R>) -> Self {
        Self {
            events: Vec::new(),
            persistence,
        }
    }

    /// Build a cache and load it from storage.
    pub fn open(persistence: Persistence<S, R>) -> (Self, LoadReport) {
        let mut cache = Self::new(persistence);
        let report = cache.load();
        (cache, report)
    }

    pub fn load(&mut self) -> LoadReport {
        let (events, report) = self.persistence.load();
        self.events = events;
        report
    }

    pub fn persistence(&self) -> &Persistence<S, R> {
        &self.persistence
    }

    fn save(&mut self) -> SaveReport {
        let report = self.persistence.save(&self.events);
        if let Some(retained) = &report.retained {
            self.events = retained.clone();
        }
        report
    }

    // --- Mutators ---

    pub fn add(&mut self, event: Event) -> Mutation {
        if self.get(&event.id).is_some() {
            tracing::warn!(id = %event.id, "Refusing to add event with a duplicate id");
            return Mutation::Skipped(EventKeepError::InvalidInput(format!(
                "duplicate event id {}",
                event.id
            )));
        }
        self.events.push(event);
        Mutation::Persisted(self.save())
    }

    /// Replace the stored event with the same id.
    pub fn update(&mut self, event: Event) -> Mutation {
        let Some(slot) = self.events.iter_mut().find(|e| e.id == event.id) else {
            tracing::warn!(id = %event.id, "Update of unknown event dropped");
            return Mutation::Skipped(EventKeepError::RecordNotFound(event.id));
        };
        *slot = event;
        Mutation::Persisted(self.save())
    }

    pub fn delete(&mut self, id: &Uuid) -> SaveReport {
        self.events.retain(|e| e.id != *id);
        self.save()
    }

    pub fn toggle_complete(&mut self, id: &Uuid) -> Mutation {
        let Some(event) = self.events.iter_mut().find(|e| e.id == *id) else {
            tracing::warn!(%id, "Toggle of unknown event dropped");
            return Mutation::Skipped(EventKeepError::RecordNotFound(*id));
        };
        event.is_completed = !event.is_completed;
        Mutation::Persisted(self.save())
    }

    // --- Queries ---

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn get(&self, id: &Uuid) -> Option<&Event> {
        self.events.iter().find(|e| e.id == *id)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events on the same local calendar day as `day`.
    pub fn events_on(&self, day: NaiveDate) -> Vec<&Event> {
        self.events.iter().filter(|e| e.date.date() == day).collect()
    }

    pub fn upcoming(&self, within_days: i64) -> Vec<&Event> {
        self.upcoming_from(Local::now().naive_local(), within_days)
    }

    /// Events in `[today, today + within_days]`, earliest first.
    pub fn upcoming_from(&self, today: NaiveDateTime, within_days: i64) -> Vec<&Event> {
        let end = Duration::try_days(within_days)
            .and_then(|window| today.checked_add_signed(window))
            .unwrap_or(NaiveDateTime::MAX);
        let mut found: Vec<&Event> = self
            .events
            .iter()
            .filter(|e| e.date >= today && e.date <= end)
            .collect();
        found.sort_by_key(|e| e.date);
        found
    }

    pub fn events_in_current_month(&self) -> Vec<&Event> {
        self.events_in_month_of(Local::now().naive_local())
    }

    /// Events whose month and year match `now`'s.
    pub fn events_in_month_of(&self, now: NaiveDateTime) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.date.month() == now.month() && e.date.year() == now.year())
            .collect()
    }

    pub fn event_days_in_current_month(&self) -> BTreeMap<u32, bool> {
        self.event_days_in_month_of(Local::now().naive_local())
    }

    /// Day-of-month → `true` for every day of `now`'s month that has an event.
    pub fn event_days_in_month_of(&self, now: NaiveDateTime) -> BTreeMap<u32, bool> {
        self.events_in_month_of(now)
            .into_iter()
            .map(|e| (e.date.day(), true))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::SaveStatus;
    use crate::store::memory::MemSlotStore;
    use crate::store::PRIMARY_KEY;
    use crate::{backup, codec};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn cache(slots: &MemSlotStore) -> EventCache<&MemSlotStore, fn()> {
        EventCache::new(Persistence::new(slots, (|| {}) as fn()))
    }

    #[test]
    fn add_appends_and_saves() {
        let slots = MemSlotStore::new();
        let mut cache = cache(&slots);

        let first = Event::new("First", at(2024, 3, 2, 9, 0), "");
        let second = Event::new("Second", at(2024, 3, 1, 9, 0), "");
        assert!(cache.add(first.clone()).is_persisted());
        assert!(cache.add(second.clone()).is_persisted());

        assert_eq!(cache.events(), &[first.clone(), second.clone()]);
        let stored = codec::decode(&slots.get_raw(PRIMARY_KEY).unwrap()).unwrap();
        assert_eq!(stored, vec![first, second]);
    }

    #[test]
    fn add_refuses_duplicate_ids() {
        let slots = MemSlotStore::new();
        let mut cache = cache(&slots);
        let event = Event::new("Once", at(2024, 3, 2, 9, 0), "");
        cache.add(event.clone());

        let mutation = cache.add(event);
        assert!(matches!(
            mutation,
            Mutation::Skipped(EventKeepError::InvalidInput(_))
        ));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn update_replaces_by_id() {
        let slots = MemSlotStore::new();
        let mut cache = cache(&slots);
        let mut event = Event::new("Draft", at(2024, 3, 2, 9, 0), "");
        cache.add(event.clone());

        event.title = "Final".to_string();
        event.notes = "bring laptop".to_string();
        assert!(cache.update(event.clone()).is_persisted());
        assert_eq!(cache.get(&event.id), Some(&event));
        assert_eq!(backup::restore(&slots), vec![event]);
    }

    #[test]
    fn update_of_absent_event_is_a_silent_no_op() {
        let slots = MemSlotStore::new();
        let mut cache = cache(&slots);
        let kept = Event::new("Kept", at(2024, 3, 2, 9, 0), "");
        cache.add(kept.clone());
        let writes_before = slots.write_log().len();

        let stranger = Event::new("Stranger", at(2024, 3, 2, 9, 0), "");
        let mutation = cache.update(stranger.clone());

        assert!(matches!(
            mutation,
            Mutation::Skipped(EventKeepError::RecordNotFound(id)) if id == stranger.id
        ));
        assert_eq!(cache.events(), &[kept]);
        assert_eq!(slots.write_log().len(), writes_before);
    }

    #[test]
    fn toggle_flips_completion() {
        let slots = MemSlotStore::new();
        let mut cache = cache(&slots);
        let event = Event::new("Run", at(2024, 3, 2, 7, 0), "");
        cache.add(event.clone());

        cache.toggle_complete(&event.id);
        assert!(cache.get(&event.id).unwrap().is_completed);
        cache.toggle_complete(&event.id);
        assert!(!cache.get(&event.id).unwrap().is_completed);

        assert!(matches!(
            cache.toggle_complete(&Uuid::new_v4()),
            Mutation::Skipped(EventKeepError::RecordNotFound(_))
        ));
    }

    #[test]
    fn delete_removes_and_saves() {
        let slots = MemSlotStore::new();
        let mut cache = cache(&slots);
        let a = Event::new("A", at(2024, 3, 2, 7, 0), "");
        let b = Event::new("B", at(2024, 3, 3, 7, 0), "");
        cache.add(a.clone());
        cache.add(b.clone());

        assert!(cache.delete(&a.id).is_saved());
        assert_eq!(cache.events(), &[b.clone()]);

        // Deleting something that isn't there still saves
        assert!(cache.delete(&a.id).is_saved());
        assert_eq!(cache.events(), &[b]);
    }

    #[test]
    fn partial_save_is_adopted_by_the_cache() {
        let slots = MemSlotStore::new();
        let mut cache = cache(&slots);
        let good = Event::new("Good", at(2024, 3, 2, 7, 0), "");
        cache.add(good.clone());

        slots.fail_next_writes(PRIMARY_KEY, 1);
        let mutation = cache.add(Event::new("", at(2024, 3, 2, 8, 0), ""));

        match mutation {
            Mutation::Persisted(report) => {
                assert_eq!(report.status, SaveStatus::Partial { dropped: 1 })
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(cache.events(), &[good]);
    }

    #[test]
    fn events_on_uses_calendar_day_equality() {
        let slots = MemSlotStore::new();
        let mut cache = cache(&slots);
        let late = Event::new("Late", at(2024, 3, 1, 23, 59), "");
        let early = Event::new("Early", at(2024, 3, 1, 0, 1), "");
        cache.add(late.clone());
        cache.add(early.clone());
        cache.add(Event::new("Next", at(2024, 3, 2, 0, 1), ""));

        let query = at(2024, 3, 1, 0, 1).date();
        assert_eq!(cache.events_on(query), vec![&late, &early]);

        let next_day = at(2024, 3, 2, 0, 1).date();
        assert_eq!(cache.events_on(next_day).len(), 1);
        assert_eq!(cache.events_on(next_day)[0].title, "Next");
    }

    #[test]
    fn upcoming_is_inclusive_and_sorted() {
        let slots = MemSlotStore::new();
        let mut cache = cache(&slots);
        let today = at(2024, 3, 10, 12, 0);

        let in_eight = Event::new("Eight", today + Duration::days(8), "");
        let in_three = Event::new("Three", today + Duration::days(3), "");
        let now = Event::new("Now", today, "");
        let edge = Event::new("Edge", today + Duration::days(7), "");
        let past = Event::new("Past", today - Duration::minutes(1), "");
        for e in [&in_eight, &in_three, &now, &edge, &past] {
            cache.add(e.clone());
        }

        let found = cache.upcoming_from(today, DEFAULT_UPCOMING_DAYS);
        assert_eq!(found, vec![&now, &in_three, &edge]);
    }

    #[test]
    fn upcoming_over_today_three_and_eight_days() {
        let slots = MemSlotStore::new();
        let mut cache = cache(&slots);
        let today = at(2024, 3, 10, 12, 0);

        let plus_eight = Event::new("+8", today + Duration::days(8), "");
        let plus_three = Event::new("+3", today + Duration::days(3), "");
        let same = Event::new("today", today, "");
        cache.add(plus_eight);
        cache.add(plus_three.clone());
        cache.add(same.clone());

        assert_eq!(cache.upcoming_from(today, 7), vec![&same, &plus_three]);
    }

    #[test]
    fn month_queries_compare_month_and_year() {
        let slots = MemSlotStore::new();
        let mut cache = cache(&slots);
        let now = at(2024, 3, 15, 10, 0);

        let first = Event::new("First", at(2024, 3, 1, 0, 0), "");
        let last = Event::new("Last", at(2024, 3, 31, 23, 59), "");
        let again = Event::new("Again", at(2024, 3, 31, 8, 0), "");
        cache.add(first.clone());
        cache.add(Event::new("Next month", at(2024, 4, 1, 0, 0), ""));
        cache.add(Event::new("Last year", at(2023, 3, 15, 10, 0), ""));
        cache.add(last.clone());
        cache.add(again.clone());

        assert_eq!(cache.events_in_month_of(now), vec![&first, &last, &again]);

        let days = cache.event_days_in_month_of(now);
        assert_eq!(days.len(), 2);
        assert_eq!(days.get(&1), Some(&true));
        assert_eq!(days.get(&31), Some(&true));
        assert_eq!(days.get(&15), None);
    }

    #[test]
    fn open_loads_existing_events() {
        let slots = MemSlotStore::new();
        let stored = vec![Event::new("Stored", at(2024, 3, 1, 9, 0), "")];
        slots.put_raw(PRIMARY_KEY, &codec::encode(&stored).unwrap());

        let (cache, report) = EventCache::open(Persistence::new(&slots, (|| {}) as fn()));
        assert_eq!(cache.events(), stored.as_slice());
        assert!(report.corruption.is_none());
    }
}
