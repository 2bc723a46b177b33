//! Date and hour utilities.
//!
//! A `DateKey` is the canonical `YYYY-MM-DD` encoding of a calendar date.
//! It is the key the storage backends index by, so the invariant matters:
//! parsing a formatted key always reconstructs the date that produced it.

use crate::error::{DayGridError, DayGridResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// First hour slot of a day (7:00).
pub const FIRST_HOUR: u8 = 7;
/// Last hour slot of a day (22:00).
pub const LAST_HOUR: u8 = 22;

/// Canonical string encoding of a calendar date, e.g. `2024-03-05`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateKey(String);

impl DateKey {
    pub fn new(date: NaiveDate) -> Self {
        DateKey(date.format(DATE_KEY_FORMAT).to_string())
    }

    /// Parse a `YYYY-MM-DD` string. The result is re-formatted, so keys are
    /// always zero-padded even when the input was not.
    pub fn parse(s: &str) -> DayGridResult<Self> {
        let date = NaiveDate::parse_from_str(s.trim(), DATE_KEY_FORMAT)
            .map_err(|_| DayGridError::InvalidDate(s.to_string()))?;
        Ok(DateKey::new(date))
    }

    pub fn date(&self) -> NaiveDate {
        // unwrap safe: a DateKey is only ever built from a valid date
        NaiveDate::parse_from_str(&self.0, DATE_KEY_FORMAT).unwrap()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The fixed hour range shown for every day, 7:00 through 22:00.
pub fn day_hours() -> impl Iterator<Item = u8> {
    FIRST_HOUR..=LAST_HOUR
}

/// Parse an hour argument and check it against the displayed range.
pub fn parse_hour(s: &str) -> DayGridResult<u8> {
    let hour: u8 = s
        .trim()
        .parse()
        .map_err(|_| DayGridError::InvalidHour(s.to_string()))?;
    if !(FIRST_HOUR..=LAST_HOUR).contains(&hour) {
        return Err(DayGridError::InvalidHour(s.to_string()));
    }
    Ok(hour)
}

/// 12-hour clock label for a slot, e.g. `7 AM`, `12 PM`, `10 PM`.
pub fn hour_label(hour: u8) -> String {
    match hour {
        0 => "12 AM".to_string(),
        1..=11 => format!("{hour} AM"),
        12 => "12 PM".to_string(),
        _ => format!("{} PM", hour - 12),
    }
}

/// Compact label used in month-grid previews, e.g. `9am`, `1pm`.
pub fn hour_label_compact(hour: u8) -> String {
    match hour {
        0 => "12am".to_string(),
        1..=11 => format!("{hour}am"),
        12 => "12pm".to_string(),
        _ => format!("{}pm", hour - 12),
    }
}
