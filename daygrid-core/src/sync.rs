//! Sync orchestration between application state and the storage backend.
//!
//! Slot writes are debounced: a new edit inside the quiet period replaces
//! the pending write for that slot, so only the latest value reaches the
//! backend. Reloads always replace state wholesale; there is no merging.
//! Local state is patched only after a write is confirmed.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::calendar_id::CalendarId;
use crate::datekey::DateKey;
use crate::error::{DayGridError, DayGridResult};
use crate::state::AppState;
use crate::store::EventStore;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// Quiet period before a queued slot edit is written out. Another edit to
/// the same slot inside this window cancels and reschedules the write.
pub const DEBOUNCE: Duration = Duration::from_millis(200);

type SlotKey = (DateKey, u8);

/// A debounced write waiting out its quiet period.
struct PendingWrite {
    handle: JoinHandle<()>,
    /// Set once the quiet period has elapsed and the write has gone to the
    /// backend. From that point the write can no longer be recalled.
    dispatched: Arc<AtomicBool>,
}

/// Orchestrates loads and saves for one calendar against one backend.
///
/// Owns the application state; commands take snapshots for rendering and
/// route every mutation through here.
pub struct SyncController {
    store: Arc<dyn EventStore>,
    state: Arc<RwLock<AppState>>,
    pending: HashMap<SlotKey, PendingWrite>,
}

impl SyncController {
    /// Load everything and build the initial state. A load failure keeps
    /// the empty mirror and starts offline; the UI stays interactive.
    pub async fn start(store: Arc<dyn EventStore>, calendar_id: CalendarId) -> Self {
        let mut state = AppState::new(calendar_id.clone());

        match store.load_all(&calendar_id).await {
            Ok(slots) => {
                state.events = crate::events::EventsByDate::from_slots(slots);
                state.online = true;
            }
            Err(err) => {
                log::warn!("Initial load failed, starting offline: {err}");
                state.online = false;
            }
        }

        SyncController {
            store,
            state: Arc::new(RwLock::new(state)),
            pending: HashMap::new(),
        }
    }

    /// Snapshot of the current state for rendering.
    pub async fn state(&self) -> AppState {
        self.state.read().await.clone()
    }

    /// Reload everything and replace state wholesale. On failure the stale
    /// mirror is kept and the offline flag is set.
    pub async fn reload(&mut self) -> DayGridResult<()> {
        let calendar_id = self.state.read().await.calendar_id.clone();

        match self.store.load_all(&calendar_id).await {
            Ok(slots) => {
                let mut state = self.state.write().await;
                state.events = crate::events::EventsByDate::from_slots(slots);
                state.online = true;
                Ok(())
            }
            Err(err) => {
                log::warn!("Reload failed, keeping stale state: {err}");
                self.state.write().await.online = false;
                Err(err)
            }
        }
    }

    /// Schedule a debounced write for one slot, replacing any pending write
    /// for the same slot.
    ///
    /// Only the quiet-period timer is cancellable. A write that already
    /// went out to the backend keeps running; the replacement fires after
    /// its own quiet period and wins by last-write-wins.
    pub fn queue_save(&mut self, date_key: DateKey, hour: u8, text: String) {
        let key = (date_key.clone(), hour);
        if let Some(previous) = self.pending.remove(&key)
            && !previous.dispatched.load(Ordering::SeqCst)
        {
            previous.handle.abort();
        }

        let dispatched = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&dispatched);
        let store = Arc::clone(&self.store);
        let state = Arc::clone(&self.state);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(DEBOUNCE).await;
            flag.store(true, Ordering::SeqCst);
            if let Err(err) = write_slot(&store, &state, &date_key, hour, &text).await {
                log::warn!("Debounced save failed: {err}");
            }
        });

        self.pending.insert(key, PendingWrite { handle, dispatched });
    }

    /// Await every pending debounced write. Called before the process goes
    /// away so queued writes still fire; a write is never tied to whether
    /// its slot is still on screen.
    pub async fn flush(&mut self) {
        for (_, pending) in self.pending.drain() {
            let _ = pending.handle.await;
        }
    }

    /// Save every slot of a day concurrently, fire-all await-all.
    ///
    /// Slots whose write succeeds are patched into local state; failures
    /// leave their slots untouched and are reported once, in aggregate.
    /// There is no rollback of the writes that did succeed.
    pub async fn save_day(
        &mut self,
        date_key: &DateKey,
        slots: Vec<(u8, String)>,
    ) -> DayGridResult<()> {
        let total = slots.len();
        let mut tasks = Vec::with_capacity(total);

        for (hour, text) in slots {
            let store = Arc::clone(&self.store);
            let state = Arc::clone(&self.state);
            let date_key = date_key.clone();
            tasks.push(tokio::spawn(async move {
                (hour, write_slot(&store, &state, &date_key, hour, &text).await)
            }));
        }

        let mut failed_hours = Vec::new();
        for task in tasks {
            match task.await {
                Ok((_, Ok(()))) => {}
                Ok((hour, Err(_))) => failed_hours.push(hour),
                Err(err) => log::error!("Save task failed to complete: {err}"),
            }
        }

        if failed_hours.is_empty() {
            Ok(())
        } else {
            failed_hours.sort_unstable();
            Err(DayGridError::DaySave {
                failed: failed_hours.len(),
                total,
                hours: failed_hours,
            })
        }
    }
}

/// Write one slot through the backend, patching state only on success.
/// Any failure flips the offline flag; the next success flips it back.
async fn write_slot(
    store: &Arc<dyn EventStore>,
    state: &Arc<RwLock<AppState>>,
    date_key: &DateKey,
    hour: u8,
    text: &str,
) -> DayGridResult<()> {
    let calendar_id = state.read().await.calendar_id.clone();

    match store.upsert(&calendar_id, date_key, hour, text).await {
        Ok(()) => {
            let mut state = state.write().await;
            state.events.apply(date_key, hour, text);
            state.online = true;
            Ok(())
        }
        Err(err) => {
            log::warn!("Write failed for {date_key} {hour}:00: {err}");
            state.write().await.online = false;
            Err(err)
        }
    }
}
