use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use daygrid_core::error::{DayGridError, DayGridResult};
use daygrid_core::store::{BackendKind, ChangeFeed, EventStore};
use daygrid_core::sync::SyncController;
use daygrid_core::{CalendarId, DateKey, EventSlot};
use tokio::sync::mpsc;

mod common;
use common::{cal, dk};

/// In-memory backend with injectable failures, standing in for either real
/// variant behind the same contract.
#[derive(Default)]
struct MockStore {
    rows: Mutex<BTreeMap<(String, u8), String>>,
    fail_load: AtomicBool,
    fail_hours: Mutex<HashSet<u8>>,
    writes: AtomicUsize,
}

impl MockStore {
    fn seed(&self, date_key: &str, hour: u8, text: &str) {
        self.rows
            .lock()
            .unwrap()
            .insert((date_key.to_string(), hour), text.to_string());
    }

    fn row(&self, date_key: &str, hour: u8) -> Option<String> {
        self.rows
            .lock()
            .unwrap()
            .get(&(date_key.to_string(), hour))
            .cloned()
    }

    fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventStore for MockStore {
    async fn load_all(&self, calendar_id: &CalendarId) -> DayGridResult<Vec<EventSlot>> {
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(DayGridError::Load("backend down".into()));
        }
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .map(|((date_key, hour), text)| EventSlot {
                calendar_id: calendar_id.clone(),
                date_key: DateKey::parse(date_key).unwrap(),
                hour: *hour,
                text: text.clone(),
            })
            .collect())
    }

    async fn upsert(
        &self,
        _calendar_id: &CalendarId,
        date_key: &DateKey,
        hour: u8,
        text: &str,
    ) -> DayGridResult<()> {
        if self.fail_hours.lock().unwrap().contains(&hour) {
            return Err(DayGridError::Write(format!("injected failure at {hour}")));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);

        let mut rows = self.rows.lock().unwrap();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            rows.remove(&(date_key.as_str().to_string(), hour));
        } else {
            rows.insert((date_key.as_str().to_string(), hour), trimmed.to_string());
        }
        Ok(())
    }

    async fn subscribe(&self, _calendar_id: &CalendarId) -> DayGridResult<ChangeFeed> {
        let (tx, rx) = mpsc::channel(1);
        let task = tokio::spawn(async move {
            let _tx = tx;
            std::future::pending::<()>().await;
        });
        Ok(ChangeFeed::new(rx, task))
    }

    async fn probe(&self) -> DayGridResult<()> {
        Ok(())
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }
}

fn mock() -> (Arc<MockStore>, Arc<dyn EventStore>) {
    let mock = Arc::new(MockStore::default());
    let store: Arc<dyn EventStore> = mock.clone();
    (mock, store)
}

#[tokio::test(start_paused = true)]
async fn test_rapid_edits_produce_one_write() {
    let (mock, store) = mock();
    let mut controller = SyncController::start(store, cal("cal1")).await;

    // Typing "Dentist" letter group by letter group, all inside the window.
    controller.queue_save(dk("2024-03-05"), 9, "D".into());
    controller.queue_save(dk("2024-03-05"), 9, "Dent".into());
    controller.queue_save(dk("2024-03-05"), 9, "Dentist".into());
    controller.flush().await;

    assert_eq!(mock.write_count(), 1);
    assert_eq!(mock.row("2024-03-05", 9).as_deref(), Some("Dentist"));
}

#[tokio::test(start_paused = true)]
async fn test_debounced_writes_to_different_slots_all_fire() {
    let (mock, store) = mock();
    let mut controller = SyncController::start(store, cal("cal1")).await;

    controller.queue_save(dk("2024-03-05"), 9, "Dentist".into());
    controller.queue_save(dk("2024-03-05"), 12, "Lunch".into());
    controller.flush().await;

    assert_eq!(mock.write_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_pending_write_fires_even_after_leaving_the_day() {
    let (mock, store) = mock();
    let mut controller = SyncController::start(store, cal("cal1")).await;

    controller.queue_save(dk("2024-03-05"), 9, "Dentist".into());
    // Switching to another day does not cancel the pending write.
    let _ = controller.state().await;
    controller.flush().await;

    assert_eq!(mock.row("2024-03-05", 9).as_deref(), Some("Dentist"));
}

#[tokio::test]
async fn test_upsert_then_reload_scenario() {
    let (_mock, store) = mock();
    let mut controller = SyncController::start(store, cal("cal1")).await;

    controller
        .save_day(&dk("2024-03-05"), vec![(9, "Dentist".into())])
        .await
        .unwrap();
    controller.reload().await.unwrap();

    let state = controller.state().await;
    assert_eq!(state.events.get(&dk("2024-03-05"), 9), Some("Dentist"));
    assert_eq!(state.events.slot_count(), 1);
}

#[tokio::test]
async fn test_whitespace_upsert_deletes_on_reload() {
    let (mock, store) = mock();
    mock.seed("2024-03-05", 9, "Dentist");
    let mut controller = SyncController::start(store, cal("cal1")).await;

    controller
        .save_day(&dk("2024-03-05"), vec![(9, "   ".into())])
        .await
        .unwrap();
    controller.reload().await.unwrap();

    let state = controller.state().await;
    assert_eq!(state.events.get(&dk("2024-03-05"), 9), None);
}

#[tokio::test]
async fn test_failed_reload_keeps_stale_state_and_goes_offline() {
    let (mock, store) = mock();
    mock.seed("2024-03-05", 9, "Dentist");
    let mut controller = SyncController::start(store, cal("cal1")).await;

    mock.fail_load.store(true, Ordering::SeqCst);
    assert!(controller.reload().await.is_err());

    let state = controller.state().await;
    assert!(!state.online);
    assert_eq!(state.events.get(&dk("2024-03-05"), 9), Some("Dentist"));
}

#[tokio::test]
async fn test_offline_flag_recovers_on_next_success() {
    let (mock, store) = mock();
    let mut controller = SyncController::start(store, cal("cal1")).await;

    mock.fail_load.store(true, Ordering::SeqCst);
    let _ = controller.reload().await;
    assert!(!controller.state().await.online);

    mock.fail_load.store(false, Ordering::SeqCst);
    controller.reload().await.unwrap();
    assert!(controller.state().await.online);
}

#[tokio::test]
async fn test_initial_load_failure_starts_offline_but_usable() {
    let (mock, store) = mock();
    mock.fail_load.store(true, Ordering::SeqCst);

    let controller = SyncController::start(store, cal("cal1")).await;
    let state = controller.state().await;
    assert!(!state.online);
    assert!(state.events.is_empty());
}

#[tokio::test]
async fn test_day_save_partial_failure() {
    let (mock, store) = mock();
    mock.seed("2024-03-05", 12, "old lunch");
    let mut controller = SyncController::start(store, cal("cal1")).await;

    mock.fail_hours.lock().unwrap().insert(12);

    let result = controller
        .save_day(
            &dk("2024-03-05"),
            vec![(9, "Dentist".into()), (12, "new lunch".into())],
        )
        .await;

    // One aggregate error naming the failed hour.
    match result {
        Err(DayGridError::DaySave {
            failed,
            total,
            hours,
        }) => {
            assert_eq!(failed, 1);
            assert_eq!(total, 2);
            assert_eq!(hours, vec![12]);
        }
        other => panic!("expected DaySave error, got {other:?}"),
    }

    let state = controller.state().await;
    // The succeeding slot is reflected locally; the failing slot keeps its
    // prior value. No rollback of the remote write that went through.
    assert_eq!(state.events.get(&dk("2024-03-05"), 9), Some("Dentist"));
    assert_eq!(state.events.get(&dk("2024-03-05"), 12), Some("old lunch"));
    assert!(!state.online);
}

#[tokio::test]
async fn test_write_patches_state_only_after_success() {
    let (mock, store) = mock();
    let mut controller = SyncController::start(store, cal("cal1")).await;

    mock.fail_hours.lock().unwrap().insert(9);
    let result = controller
        .save_day(&dk("2024-03-05"), vec![(9, "Dentist".into())])
        .await;

    assert!(result.is_err());
    let state = controller.state().await;
    assert_eq!(state.events.get(&dk("2024-03-05"), 9), None);
    assert!(!state.online);
}
