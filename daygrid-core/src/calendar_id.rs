//! Calendar identity and share links.
//!
//! A `CalendarId` scopes every stored slot to one shared calendar. It is
//! generated once, persisted into the config file, and carried in share
//! links so that anyone opening the link sees the same calendar.

use crate::error::{DayGridError, DayGridResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Base for share links; the calendar id rides in the `cal` query parameter.
const SHARE_BASE_URL: &str = "https://daygrid.app/";

/// Opaque identifier for one shared calendar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalendarId(String);

impl CalendarId {
    pub fn new(s: &str) -> DayGridResult<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DayGridError::Config("Calendar id cannot be empty".into()));
        }
        Ok(CalendarId(trimmed.to_string()))
    }

    /// Generate a fresh random id.
    pub fn generate() -> Self {
        CalendarId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build the shareable URL carrying this id.
    pub fn share_url(&self) -> String {
        // unwrap safe: the base is a static, valid URL
        let mut url = Url::parse(SHARE_BASE_URL).unwrap();
        url.query_pairs_mut().append_pair("cal", &self.0);
        url.to_string()
    }

    /// Accept either a full share URL or a bare calendar id.
    pub fn from_share_input(input: &str) -> DayGridResult<Self> {
        if let Ok(url) = Url::parse(input.trim()) {
            return match url.query_pairs().find(|(k, _)| k == "cal") {
                Some((_, id)) => CalendarId::new(&id),
                None => Err(DayGridError::Config(format!(
                    "No calendar id found in '{input}'"
                ))),
            };
        }
        CalendarId::new(input)
    }
}

impl fmt::Display for CalendarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_unique() {
        assert_ne!(CalendarId::generate(), CalendarId::generate());
    }

    #[test]
    fn test_share_url_roundtrip() {
        let id = CalendarId::new("team-standup-42").unwrap();
        let url = id.share_url();
        assert_eq!(CalendarId::from_share_input(&url).unwrap(), id);
    }

    #[test]
    fn test_from_share_input_accepts_bare_id() {
        let id = CalendarId::from_share_input("  my-calendar  ").unwrap();
        assert_eq!(id.as_str(), "my-calendar");
    }

    #[test]
    fn test_from_share_input_rejects_url_without_id() {
        assert!(CalendarId::from_share_input("https://daygrid.app/?foo=bar").is_err());
    }

    #[test]
    fn test_empty_id_rejected() {
        assert!(CalendarId::new("   ").is_err());
    }
}
