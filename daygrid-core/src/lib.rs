//! Core types and storage for the daygrid ecosystem.
//!
//! daygrid is a shareable month calendar with free-text notes attached to
//! hourly slots. This crate carries everything the CLI builds on:
//! - `datekey` and `calendar_id` for the canonical identifiers
//! - `events` for the slot model and its in-memory mirror
//! - `store` for the pluggable storage backends (remote table or local blob)
//! - `sync` for the controller that keeps state and backend consistent

pub mod calendar_id;
pub mod config;
pub mod datekey;
pub mod error;
pub mod events;
pub mod state;
pub mod store;
pub mod sync;

pub use calendar_id::CalendarId;
pub use datekey::DateKey;
pub use error::{DayGridError, DayGridResult};
pub use events::{EventSlot, EventsByDate};
pub use state::AppState;
