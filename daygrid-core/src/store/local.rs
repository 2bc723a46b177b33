//! Local on-disk storage.
//!
//! Events live in one JSON blob per calendar under the data directory,
//! shaped `{ "YYYY-MM-DD": { "hour": "text" } }`. A sibling `ping` file is
//! rewritten after every mutation; other daygrid processes watch it to
//! learn that something changed. The ping names the writing instance so a
//! process can skip its own writes, and carries nothing else.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::calendar_id::CalendarId;
use crate::datekey::DateKey;
use crate::error::{DayGridError, DayGridResult};
use crate::events::{EventSlot, normalize_text};
use crate::store::change::{ChangeFeed, ChangeSignal};
use crate::store::{BackendKind, EventStore};
use async_trait::async_trait;
use notify::{RecursiveMode, Watcher};
use tokio::sync::{Mutex, mpsc};

const PING_FILE: &str = "ping";
const CALENDARS_DIR: &str = "calendars";

type Blob = BTreeMap<DateKey, BTreeMap<u8, String>>;

pub struct LocalStore {
    data_dir: PathBuf,
    /// Distinguishes this process's pings from other writers'.
    instance_id: String,
    /// Blob updates are read-modify-write; serializing them keeps
    /// concurrent slot saves from dropping each other's change.
    write_lock: Mutex<()>,
}

impl LocalStore {
    pub fn new(data_dir: PathBuf) -> DayGridResult<Self> {
        std::fs::create_dir_all(data_dir.join(CALENDARS_DIR))?;

        Ok(LocalStore {
            data_dir,
            instance_id: uuid::Uuid::new_v4().to_string(),
            write_lock: Mutex::new(()),
        })
    }

    fn blob_path(&self, calendar_id: &CalendarId) -> PathBuf {
        self.data_dir
            .join(CALENDARS_DIR)
            .join(format!("{}.json", calendar_id.as_str()))
    }

    fn ping_path(&self) -> PathBuf {
        self.data_dir.join(PING_FILE)
    }

    fn read_blob(path: &Path) -> DayGridResult<Blob> {
        if !path.exists() {
            return Ok(Blob::default());
        }
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|e| DayGridError::Serialization(e.to_string()))
    }

    /// Atomic write via temp file + rename.
    fn write_blob(path: &Path, blob: &Blob) -> DayGridResult<()> {
        let contents = serde_json::to_string_pretty(blob)
            .map_err(|e| DayGridError::Serialization(e.to_string()))?;
        let temp = path.with_extension("json.tmp");
        std::fs::write(&temp, contents)?;
        std::fs::rename(&temp, path)?;
        Ok(())
    }

    /// Rewrite the shared ping file so other processes reload.
    ///
    /// Written in place rather than renamed so file watchers stay attached.
    fn touch_ping(&self) -> DayGridResult<()> {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        std::fs::write(self.ping_path(), format!("{} {}", self.instance_id, millis))?;
        Ok(())
    }
}

#[async_trait]
impl EventStore for LocalStore {
    async fn load_all(&self, calendar_id: &CalendarId) -> DayGridResult<Vec<EventSlot>> {
        let blob = Self::read_blob(&self.blob_path(calendar_id))
            .map_err(|e| DayGridError::Load(e.to_string()))?;

        let slots = blob
            .into_iter()
            .flat_map(|(date_key, day)| {
                let calendar_id = calendar_id.clone();
                day.into_iter().map(move |(hour, text)| EventSlot {
                    calendar_id: calendar_id.clone(),
                    date_key: date_key.clone(),
                    hour,
                    text,
                })
            })
            .collect();

        Ok(slots)
    }

    async fn upsert(
        &self,
        calendar_id: &CalendarId,
        date_key: &DateKey,
        hour: u8,
        text: &str,
    ) -> DayGridResult<()> {
        let _guard = self.write_lock.lock().await;

        let path = self.blob_path(calendar_id);
        let mut blob = Self::read_blob(&path).map_err(|e| DayGridError::Write(e.to_string()))?;

        let changed = match normalize_text(text) {
            Some(trimmed) => {
                let day = blob.entry(date_key.clone()).or_default();
                let changed = day.get(&hour) != Some(&trimmed);
                day.insert(hour, trimmed);
                changed
            }
            None => {
                let removed = blob
                    .get_mut(date_key)
                    .and_then(|day| day.remove(&hour))
                    .is_some();
                if blob.get(date_key).is_some_and(BTreeMap::is_empty) {
                    blob.remove(date_key);
                }
                removed
            }
        };

        // An upsert that changed nothing skips the write and the ping.
        if changed {
            Self::write_blob(&path, &blob).map_err(|e| DayGridError::Write(e.to_string()))?;
            self.touch_ping().map_err(|e| DayGridError::Write(e.to_string()))?;
        }

        Ok(())
    }

    async fn subscribe(&self, calendar_id: &CalendarId) -> DayGridResult<ChangeFeed> {
        let ping_path = self.ping_path();

        // The watch target must exist before the watcher attaches.
        if !ping_path.exists() {
            std::fs::write(&ping_path, format!("{} 0", self.instance_id))?;
        }

        let (tx, rx) = mpsc::channel(8);
        let instance_id = self.instance_id.clone();
        let watched = ping_path.clone();

        let mut watcher =
            notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
                let Ok(event) = res else { return };
                if !event.kind.is_modify() && !event.kind.is_create() {
                    return;
                }
                // Skip our own pings; local state already reflects those
                // writes. Other instances' pings become reload signals.
                let Ok(contents) = std::fs::read_to_string(&watched) else {
                    return;
                };
                let writer = contents.split_whitespace().next().unwrap_or("");
                if writer == instance_id {
                    return;
                }
                let _ = tx.blocking_send(ChangeSignal);
            })
            .map_err(|e| DayGridError::Init(format!("Could not create file watcher: {e}")))?;

        watcher
            .watch(&ping_path, RecursiveMode::NonRecursive)
            .map_err(|e| {
                DayGridError::Init(format!("Could not watch {}: {e}", ping_path.display()))
            })?;

        log::debug!(
            "Watching {} for changes to calendar {calendar_id}",
            ping_path.display()
        );

        // The task exists to keep the watcher alive; aborting it via the
        // feed's Drop tears the watch down.
        let task = tokio::spawn(async move {
            let _watcher = watcher;
            std::future::pending::<()>().await;
        });

        Ok(ChangeFeed::new(rx, task))
    }

    async fn probe(&self) -> DayGridResult<()> {
        std::fs::metadata(self.data_dir.join(CALENDARS_DIR))
            .map(|_| ())
            .map_err(|e| DayGridError::Load(format!("Data directory unavailable: {e}")))
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }
}
