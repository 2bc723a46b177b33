use std::time::Duration;

use daygrid_core::store::{EventStore, LocalStore};
use tokio::time::timeout;

mod common;
use common::{cal, dk, temp_store};

#[tokio::test]
async fn test_upsert_then_load_roundtrip() {
    let (_dir, store) = temp_store();
    let calendar = cal("cal1");

    store
        .upsert(&calendar, &dk("2024-03-05"), 9, "Dentist")
        .await
        .unwrap();

    let slots = store.load_all(&calendar).await.unwrap();
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].date_key, dk("2024-03-05"));
    assert_eq!(slots[0].hour, 9);
    assert_eq!(slots[0].text, "Dentist");
}

#[tokio::test]
async fn test_upsert_trims_text() {
    let (_dir, store) = temp_store();
    let calendar = cal("cal1");

    store
        .upsert(&calendar, &dk("2024-03-05"), 9, "  Dentist  ")
        .await
        .unwrap();

    let slots = store.load_all(&calendar).await.unwrap();
    assert_eq!(slots[0].text, "Dentist");
}

#[tokio::test]
async fn test_whitespace_upsert_deletes() {
    let (_dir, store) = temp_store();
    let calendar = cal("cal1");

    store
        .upsert(&calendar, &dk("2024-03-05"), 9, "Dentist")
        .await
        .unwrap();
    store
        .upsert(&calendar, &dk("2024-03-05"), 9, "   ")
        .await
        .unwrap();

    let slots = store.load_all(&calendar).await.unwrap();
    assert!(slots.is_empty());
}

#[tokio::test]
async fn test_delete_of_missing_slot_is_noop() {
    let (_dir, store) = temp_store();
    let calendar = cal("cal1");

    store
        .upsert(&calendar, &dk("2024-03-05"), 9, "")
        .await
        .unwrap();

    assert!(store.load_all(&calendar).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_calendars_are_isolated() {
    let (_dir, store) = temp_store();

    store
        .upsert(&cal("cal1"), &dk("2024-03-05"), 9, "Dentist")
        .await
        .unwrap();

    assert!(store.load_all(&cal("cal2")).await.unwrap().is_empty());
    assert_eq!(store.load_all(&cal("cal1")).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_concurrent_upserts_to_different_slots() {
    let (_dir, store) = temp_store();
    let calendar = cal("cal1");
    let day = dk("2024-03-05");

    let (a, b, c) = tokio::join!(
        store.upsert(&calendar, &day, 9, "Dentist"),
        store.upsert(&calendar, &day, 12, "Lunch"),
        store.upsert(&calendar, &day, 15, "Review"),
    );
    a.unwrap();
    b.unwrap();
    c.unwrap();

    assert_eq!(store.load_all(&calendar).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_blob_shape_on_disk() {
    let (dir, store) = temp_store();
    let calendar = cal("cal1");

    store
        .upsert(&calendar, &dk("2024-03-05"), 9, "Dentist")
        .await
        .unwrap();

    let blob_path = dir.path().join("calendars").join("cal1.json");
    let contents = std::fs::read_to_string(blob_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(parsed["2024-03-05"]["9"], "Dentist");
}

#[tokio::test]
async fn test_load_fails_on_malformed_blob() {
    let (dir, store) = temp_store();
    let calendar = cal("cal1");

    std::fs::write(dir.path().join("calendars").join("cal1.json"), "not json").unwrap();

    assert!(store.load_all(&calendar).await.is_err());
}

#[tokio::test]
async fn test_probe_checks_data_dir() {
    let (dir, store) = temp_store();
    store.probe().await.unwrap();

    std::fs::remove_dir_all(dir.path().join("calendars")).unwrap();
    assert!(store.probe().await.is_err());
}

// Two stores over one data dir stand in for two processes sharing a
// machine: a write in one shows up as a change signal in the other.
#[tokio::test]
async fn test_other_instance_write_produces_signal() {
    let dir = tempfile::TempDir::new().unwrap();
    let writer = LocalStore::new(dir.path().to_path_buf()).unwrap();
    let reader = LocalStore::new(dir.path().to_path_buf()).unwrap();
    let calendar = cal("cal1");

    let mut feed = reader.subscribe(&calendar).await.unwrap();

    writer
        .upsert(&calendar, &dk("2024-03-05"), 9, "Dentist")
        .await
        .unwrap();

    let signal = timeout(Duration::from_secs(5), feed.recv()).await;
    assert!(signal.is_ok(), "expected a change signal within 5s");
}

#[tokio::test]
async fn test_own_writes_are_suppressed() {
    let (_dir, store) = temp_store();
    let calendar = cal("cal1");

    let mut feed = store.subscribe(&calendar).await.unwrap();

    store
        .upsert(&calendar, &dk("2024-03-05"), 9, "Dentist")
        .await
        .unwrap();

    // The writing instance must not be notified of its own ping.
    let signal = timeout(Duration::from_millis(500), feed.recv()).await;
    assert!(signal.is_err(), "did not expect a signal for our own write");
}
