#![allow(dead_code)]

use daygrid_core::store::LocalStore;
use daygrid_core::{CalendarId, DateKey};
use tempfile::TempDir;

/// Fresh local store backed by a temp data dir. The TempDir must outlive
/// the store, so both are returned.
pub fn temp_store() -> (TempDir, LocalStore) {
    let dir = TempDir::new().expect("create temp dir");
    let store = LocalStore::new(dir.path().to_path_buf()).expect("open local store");
    (dir, store)
}

pub fn cal(id: &str) -> CalendarId {
    CalendarId::new(id).unwrap()
}

pub fn dk(s: &str) -> DateKey {
    DateKey::parse(s).unwrap()
}
