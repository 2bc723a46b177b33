//! Remote relational storage over a PostgREST-style endpoint.
//!
//! Every slot is a row of one `events` table keyed by
//! `(calendar_id, date_key, hour)`; the backend enforces the uniqueness
//! constraint that makes the upsert create-or-replace. Change notification
//! is an encapsulated poll of the calendar's rows: subscribers receive the
//! same opaque signal the local backend produces.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use crate::calendar_id::CalendarId;
use crate::config::RemoteConfig;
use crate::datekey::DateKey;
use crate::error::{DayGridError, DayGridResult};
use crate::events::{EventSlot, normalize_text};
use crate::store::change::{ChangeFeed, ChangeSignal};
use crate::store::{BackendKind, EventStore};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use url::Url;

/// Bound on every backend request. There is no automatic retry; the next
/// reload or save is the retry.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Wire shape of one `events` row.
#[derive(Debug, Serialize, Deserialize)]
struct EventRow {
    calendar_id: String,
    date_key: String,
    hour: u8,
    text: String,
}

impl EventRow {
    fn into_slot(self) -> DayGridResult<EventSlot> {
        let date_key = DateKey::parse(&self.date_key)
            .map_err(|_| DayGridError::Load(format!("Malformed date key '{}'", self.date_key)))?;
        Ok(EventSlot {
            calendar_id: CalendarId::new(&self.calendar_id)
                .map_err(|e| DayGridError::Load(e.to_string()))?,
            date_key,
            hour: self.hour,
            text: self.text,
        })
    }
}

pub struct RemoteStore {
    client: reqwest::Client,
    events_url: Url,
    poll_interval: Duration,
}

impl RemoteStore {
    pub fn new(config: &RemoteConfig) -> DayGridResult<Self> {
        let base = config.url.trim_end_matches('/');
        let events_url = Url::parse(&format!("{base}/events"))
            .map_err(|e| DayGridError::Init(format!("Invalid remote url '{}': {e}", config.url)))?;

        let mut headers = HeaderMap::new();
        let api_key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| DayGridError::Init("API key contains invalid characters".into()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| DayGridError::Init("API key contains invalid characters".into()))?;
        headers.insert("apikey", api_key);
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DayGridError::Init(format!("Could not build HTTP client: {e}")))?;

        Ok(RemoteStore {
            client,
            events_url,
            poll_interval: Duration::from_secs(config.poll_secs.max(1)),
        })
    }

    /// Rows of one calendar, ordered so responses are stable for the
    /// change-feed fingerprint.
    fn calendar_url(&self, calendar_id: &CalendarId) -> Url {
        let mut url = self.events_url.clone();
        url.query_pairs_mut()
            .append_pair("calendar_id", &format!("eq.{}", calendar_id.as_str()))
            .append_pair("order", "date_key.asc,hour.asc");
        url
    }
}

#[async_trait]
impl EventStore for RemoteStore {
    async fn load_all(&self, calendar_id: &CalendarId) -> DayGridResult<Vec<EventSlot>> {
        let response = self
            .client
            .get(self.calendar_url(calendar_id))
            .send()
            .await
            .map_err(|e| DayGridError::Load(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(DayGridError::Load(format!(
                "Backend returned {}",
                response.status()
            )));
        }

        let rows: Vec<EventRow> = response
            .json()
            .await
            .map_err(|e| DayGridError::Load(format!("Malformed response: {e}")))?;

        rows.into_iter().map(EventRow::into_slot).collect()
    }

    async fn upsert(
        &self,
        calendar_id: &CalendarId,
        date_key: &DateKey,
        hour: u8,
        text: &str,
    ) -> DayGridResult<()> {
        let response = match normalize_text(text) {
            Some(trimmed) => {
                let row = EventRow {
                    calendar_id: calendar_id.as_str().to_string(),
                    date_key: date_key.as_str().to_string(),
                    hour,
                    text: trimmed,
                };
                let mut url = self.events_url.clone();
                url.query_pairs_mut()
                    .append_pair("on_conflict", "calendar_id,date_key,hour");

                self.client
                    .post(url)
                    .header("Prefer", "resolution=merge-duplicates")
                    .json(&row)
                    .send()
                    .await
            }
            None => {
                let mut url = self.events_url.clone();
                url.query_pairs_mut()
                    .append_pair("calendar_id", &format!("eq.{}", calendar_id.as_str()))
                    .append_pair("date_key", &format!("eq.{}", date_key.as_str()))
                    .append_pair("hour", &format!("eq.{hour}"));

                self.client.delete(url).send().await
            }
        }
        .map_err(|e| DayGridError::Write(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(DayGridError::Write(format!(
                "Backend returned {}",
                response.status()
            )));
        }

        Ok(())
    }

    async fn subscribe(&self, calendar_id: &CalendarId) -> DayGridResult<ChangeFeed> {
        let (tx, rx) = mpsc::channel(8);
        let client = self.client.clone();
        let url = self.calendar_url(calendar_id);
        let interval = self.poll_interval;

        let task = tokio::spawn(async move {
            let mut last_fingerprint: Option<u64> = None;
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                let body = match client.get(url.clone()).send().await {
                    Ok(response) if response.status().is_success() => {
                        match response.text().await {
                            Ok(body) => body,
                            Err(err) => {
                                log::debug!("Change poll read failed: {err}");
                                continue;
                            }
                        }
                    }
                    Ok(response) => {
                        log::debug!("Change poll returned {}", response.status());
                        continue;
                    }
                    Err(err) => {
                        log::debug!("Change poll failed: {err}");
                        continue;
                    }
                };

                let mut hasher = DefaultHasher::new();
                body.hash(&mut hasher);
                let fingerprint = hasher.finish();

                // The first successful poll only establishes the baseline.
                if last_fingerprint.is_some_and(|f| f != fingerprint)
                    && tx.send(ChangeSignal).await.is_err()
                {
                    break;
                }
                last_fingerprint = Some(fingerprint);
            }
        });

        Ok(ChangeFeed::new(rx, task))
    }

    async fn probe(&self) -> DayGridResult<()> {
        let mut url = self.events_url.clone();
        url.query_pairs_mut()
            .append_pair("select", "calendar_id")
            .append_pair("limit", "1");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DayGridError::Load(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(DayGridError::Load(format!(
                "Backend returned {}",
                response.status()
            )));
        }

        Ok(())
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }
}
