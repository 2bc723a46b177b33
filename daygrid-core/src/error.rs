//! Error types for the daygrid ecosystem.

use thiserror::Error;

/// Errors that can occur in daygrid operations.
///
/// None of these are fatal to the UI: load and write failures fold into the
/// online/offline indicator, init failures fall back to local storage, and
/// clipboard failures degrade to a manual copy prompt.
#[derive(Error, Debug)]
pub enum DayGridError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Backend init error: {0}")]
    Init(String),

    #[error("Load error: {0}")]
    Load(String),

    #[error("Write error: {0}")]
    Write(String),

    #[error("Failed to save {failed} of {total} slots (hours {hours:?})")]
    DaySave {
        failed: usize,
        total: usize,
        hours: Vec<u8>,
    },

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid hour '{0}', expected a number between 7 and 22")]
    InvalidHour(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for daygrid operations.
pub type DayGridResult<T> = Result<T, DayGridError>;
