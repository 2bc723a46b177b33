//! Event slot model and the in-memory mirror of persisted state.

use crate::calendar_id::CalendarId;
use crate::datekey::DateKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One stored slot: a free-text note attached to an hour of a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSlot {
    pub calendar_id: CalendarId,
    pub date_key: DateKey,
    pub hour: u8,
    pub text: String,
}

/// Trim user text before persistence. `None` means "no event": the caller
/// deletes the slot instead of storing an empty record.
pub fn normalize_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// In-memory mirror of persisted state: date key to hour to text.
///
/// Rebuilt wholesale on every full reload, patched on confirmed writes.
/// Days with no remaining slots are dropped entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventsByDate(BTreeMap<DateKey, BTreeMap<u8, String>>);

impl EventsByDate {
    pub fn from_slots(slots: Vec<EventSlot>) -> Self {
        let mut map: BTreeMap<DateKey, BTreeMap<u8, String>> = BTreeMap::new();
        for slot in slots {
            map.entry(slot.date_key).or_default().insert(slot.hour, slot.text);
        }
        EventsByDate(map)
    }

    pub fn get(&self, date_key: &DateKey, hour: u8) -> Option<&str> {
        self.0.get(date_key).and_then(|day| day.get(&hour)).map(String::as_str)
    }

    pub fn has_events(&self, date_key: &DateKey) -> bool {
        self.0.get(date_key).is_some_and(|day| !day.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of stored slots across all days.
    pub fn slot_count(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }

    /// Apply a confirmed write. Empty trimmed text removes the slot.
    pub fn apply(&mut self, date_key: &DateKey, hour: u8, text: &str) {
        match normalize_text(text) {
            Some(trimmed) => {
                self.0.entry(date_key.clone()).or_default().insert(hour, trimmed);
            }
            None => {
                if let Some(day) = self.0.get_mut(date_key) {
                    day.remove(&hour);
                    if day.is_empty() {
                        self.0.remove(date_key);
                    }
                }
            }
        }
    }

    /// Up to `limit` (hour, text) pairs for a day, hour ascending.
    pub fn preview(&self, date_key: &DateKey, limit: usize) -> Vec<(u8, &str)> {
        self.0
            .get(date_key)
            .map(|day| day.iter().take(limit).map(|(h, t)| (*h, t.as_str())).collect())
            .unwrap_or_default()
    }
}
