use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{error::MegaphoneError, event::Event};

/// Display history for one megaphone, as persisted by the host app.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MegaphoneRecord {
    pub event: Event,
    pub seen_count: u32,
    pub last_seen: Option<DateTime<Utc>>,
    pub first_visible: DateTime<Utc>,
    pub finished: bool,
}

impl MegaphoneRecord {
    /// A record for a megaphone that has never been shown.
    pub fn new(event: Event, first_visible: DateTime<Utc>) -> Self {
        Self {
            event,
            seen_count: 0,
            last_seen: None,
            first_visible,
            finished: false,
        }
    }

    pub fn mark_seen(&mut self, now: DateTime<Utc>) {
        self.seen_count = self.seen_count.saturating_add(1);
        self.last_seen = Some(now);
    }

    pub fn mark_finished(&mut self) {
        self.finished = true;
    }

    fn from_state(event: Event, state: RecordState) -> Self {
        Self {
            event,
            seen_count: state.seen_count,
            last_seen: state.last_seen,
            first_visible: state.first_visible,
            finished: state.finished,
        }
    }
}

/// Record fields as stored under a persistence key, without the event itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordState {
    #[serde(default)]
    pub seen_count: u32,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
    pub first_visible: DateTime<Utc>,
    #[serde(default)]
    pub finished: bool,
}

/// One consistent view of every megaphone's display history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MegaphoneHistory {
    records: HashMap<Event, MegaphoneRecord>,
}

impl MegaphoneHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A history where every event is unseen and first visible at `now`.
    pub fn fresh(now: DateTime<Utc>) -> Self {
        Event::ALL
            .into_iter()
            .map(|event| MegaphoneRecord::new(event, now))
            .collect()
    }

    pub fn insert(&mut self, record: MegaphoneRecord) -> Option<MegaphoneRecord> {
        self.records.insert(record.event, record)
    }

    pub fn get(&self, event: Event) -> Option<&MegaphoneRecord> {
        self.records.get(&event)
    }

    pub fn get_mut(&mut self, event: Event) -> Option<&mut MegaphoneRecord> {
        self.records.get_mut(&event)
    }

    /// Looks up a record that must exist, checking it was filed under the right event.
    pub fn require(&self, event: Event) -> Result<&MegaphoneRecord, MegaphoneError> {
        let record = self
            .records
            .get(&event)
            .ok_or(MegaphoneError::MissingRecord(event))?;
        if record.event != event {
            return Err(MegaphoneError::EventMismatch {
                expected: event,
                found: record.event,
            });
        }
        Ok(record)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Translates persistence keys into events. Unknown keys are rejected.
    pub fn from_keyed(keyed: HashMap<String, RecordState>) -> Result<Self, MegaphoneError> {
        let mut history = Self::new();
        for (key, state) in keyed {
            let event = Event::from_key(&key).inspect_err(|_| {
                warn!(%key, "history references a retired megaphone");
            })?;
            history.insert(MegaphoneRecord::from_state(event, state));
        }
        Ok(history)
    }

    pub fn from_json_str(json: &str) -> Result<Self, MegaphoneError> {
        let keyed: HashMap<String, RecordState> = serde_json::from_str(json)?;
        Self::from_keyed(keyed)
    }
}

impl FromIterator<MegaphoneRecord> for MegaphoneHistory {
    fn from_iter<I: IntoIterator<Item = MegaphoneRecord>>(iter: I) -> Self {
        let mut history = Self::new();
        for record in iter {
            history.insert(record);
        }
        history
    }
}

/// Source of display history. Implemented by the host app's persistence layer.
pub trait HistoryProvider: Send + Sync {
    fn snapshot(&self) -> Result<MegaphoneHistory>;
}

/// Keeps display history in memory. Suitable for tests and hosts without storage.
#[derive(Debug, Default)]
pub struct InMemoryHistory {
    records: RwLock<MegaphoneHistory>,
}

impl InMemoryHistory {
    /// Seeds an unseen record for every event, first visible at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            records: RwLock::new(MegaphoneHistory::fresh(now)),
        }
    }

    pub fn from_history(history: MegaphoneHistory) -> Self {
        Self {
            records: RwLock::new(history),
        }
    }

    /// Starts tracking `event` at `now` if it has no record yet. An existing
    /// record keeps its original `first_visible`.
    pub fn ensure(&self, event: Event, now: DateTime<Utc>) {
        let mut records = self.records.write();
        if records.get(event).is_none() {
            records.insert(MegaphoneRecord::new(event, now));
        }
    }

    pub fn mark_seen(&self, event: Event, now: DateTime<Utc>) {
        self.update(event, |record| record.mark_seen(now));
    }

    pub fn mark_finished(&self, event: Event) {
        self.update(event, MegaphoneRecord::mark_finished);
    }

    pub fn record(&self, event: Event) -> Option<MegaphoneRecord> {
        self.records.read().get(event).cloned()
    }

    fn update(&self, event: Event, apply: impl FnOnce(&mut MegaphoneRecord)) {
        let mut records = self.records.write();
        match records.get_mut(event) {
            Some(record) => apply(record),
            None => warn!(%event, "no record to update"),
        }
    }
}

impl HistoryProvider for InMemoryHistory {
    fn snapshot(&self) -> Result<MegaphoneHistory> {
        Ok(self.records.read().clone())
    }
}
