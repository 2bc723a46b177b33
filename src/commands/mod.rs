pub mod day;
pub mod edit;
pub mod info;
pub mod month;
pub mod open;
pub mod ping;
pub mod set;
pub mod share;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use chrono::{Datelike, Local, NaiveDate};
use daygrid_core::CalendarId;
use daygrid_core::config::GlobalConfig;
use daygrid_core::store::{self, EventStore};
use daygrid_core::DateKey;

/// Resolved invocation context shared by the commands: loaded config, the
/// calendar to operate on, and the backend picked for this run.
pub struct Context {
    pub config: GlobalConfig,
    pub calendar_id: CalendarId,
    pub store: Arc<dyn EventStore>,
}

impl Context {
    pub fn resolve(calendar_flag: Option<&str>, data_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = GlobalConfig::load().context("Failed to load configuration")?;

        if data_dir.is_some() {
            config.data_dir = data_dir;
        }

        let calendar_id = config.resolve_calendar(calendar_flag)?;
        let store = store::open(&config)?;

        Ok(Context {
            config,
            calendar_id,
            store,
        })
    }
}

/// Parse a `YYYY-MM` argument into the first day of that month; defaults to
/// the current month.
pub fn parse_month_arg(arg: Option<&str>) -> Result<NaiveDate> {
    match arg {
        None => {
            let today = Local::now().date_naive();
            // unwrap safe: the first of the current month always exists
            Ok(today.with_day(1).unwrap())
        }
        Some(s) => NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
            .map_err(|_| anyhow::anyhow!("Invalid month '{s}', expected YYYY-MM")),
    }
}

/// Parse a `YYYY-MM-DD` argument; defaults to today.
pub fn parse_date_arg(arg: Option<&str>) -> Result<DateKey> {
    match arg {
        None => Ok(DateKey::new(Local::now().date_naive())),
        Some(s) => Ok(DateKey::parse(s)?),
    }
}
