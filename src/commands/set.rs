use std::sync::Arc;

use anyhow::Result;
use daygrid_core::datekey::{self, DateKey};
use daygrid_core::sync::SyncController;

/// Write one slot through the debounced save path. Flushing before exit
/// makes the queued write fire even though the process is about to go away.
pub async fn run(ctx: &super::Context, date: &str, hour: &str, text: &str) -> Result<()> {
    let date_key = DateKey::parse(date)?;
    let hour = datekey::parse_hour(hour)?;

    let mut controller =
        SyncController::start(Arc::clone(&ctx.store), ctx.calendar_id.clone()).await;

    controller.queue_save(date_key.clone(), hour, text.to_string());
    controller.flush().await;

    let state = controller.state().await;
    if !state.online {
        anyhow::bail!("Could not save {} {}", date_key, datekey::hour_label(hour));
    }

    match state.events.get(&date_key, hour) {
        Some(saved) => println!("{} {}: {}", date_key, datekey::hour_label(hour), saved),
        None => println!("{} {}: cleared", date_key, datekey::hour_label(hour)),
    }

    Ok(())
}
