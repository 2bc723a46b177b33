use anyhow::{Context, Result};
use daygrid_core::CalendarId;
use daygrid_core::config::GlobalConfig;
use owo_colors::OwoColorize;

/// Adopt a shared calendar id into the local config.
pub fn run(link: &str) -> Result<()> {
    let id = CalendarId::from_share_input(link)?;

    let mut config = GlobalConfig::load().context("Failed to load configuration")?;
    config.set_calendar(&id)?;

    println!("Now using calendar {}", id.to_string().bold());
    Ok(())
}
