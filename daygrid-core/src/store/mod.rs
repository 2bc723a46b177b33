//! Storage backends for event slots.
//!
//! Both backends satisfy the same contract: load everything, upsert or
//! delete one slot, deliver opaque change signals, answer a connectivity
//! probe. The backend is chosen once at startup; outside this module
//! nothing branches on which one is active.

mod change;
mod local;
mod remote;

pub use change::{ChangeFeed, ChangeSignal};
pub use local::LocalStore;
pub use remote::RemoteStore;

use std::fmt;
use std::sync::Arc;

use crate::calendar_id::CalendarId;
use crate::config::GlobalConfig;
use crate::datekey::DateKey;
use crate::error::DayGridResult;
use crate::events::EventSlot;
use async_trait::async_trait;

/// Which backend variant is active. Exposed for the debug surface only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Remote,
    Local,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Remote => f.write_str("remote"),
            BackendKind::Local => f.write_str("local"),
        }
    }
}

/// Contract every storage backend satisfies.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Fetch every stored slot for the calendar.
    ///
    /// Failure means "go offline", never "the calendar is empty".
    async fn load_all(&self, calendar_id: &CalendarId) -> DayGridResult<Vec<EventSlot>>;

    /// Create-or-replace one slot, or delete it when the trimmed text is
    /// empty. Concurrent calls for different (date, hour) pairs must not
    /// interfere with each other.
    async fn upsert(
        &self,
        calendar_id: &CalendarId,
        date_key: &DateKey,
        hour: u8,
        text: &str,
    ) -> DayGridResult<()>;

    /// Register for change signals for this calendar. Dropping the returned
    /// feed cancels the subscription.
    async fn subscribe(&self, calendar_id: &CalendarId) -> DayGridResult<ChangeFeed>;

    /// Lightweight existence check against the backend.
    async fn probe(&self) -> DayGridResult<()>;

    fn kind(&self) -> BackendKind;
}

/// Pick the backend once at startup.
///
/// A configured remote that fails to construct logs the init error and
/// falls back to local storage instead of aborting; the calendar stays
/// usable on this machine either way.
pub fn open(config: &GlobalConfig) -> DayGridResult<Arc<dyn EventStore>> {
    if let Some(remote) = &config.remote {
        match RemoteStore::new(remote) {
            Ok(store) => return Ok(Arc::new(store)),
            Err(err) => {
                log::warn!("Remote backend unavailable, falling back to local storage: {err}");
            }
        }
    }

    Ok(Arc::new(LocalStore::new(config.data_path()?)?))
}
