use std::sync::Arc;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use daygrid_core::AppState;
use daygrid_core::sync::SyncController;
use owo_colors::OwoColorize;
use tokio::signal;

use crate::render;
use crate::utils::tui;

/// Live month view: reload and re-render on every backend change signal.
pub async fn run(ctx: &super::Context, month: Option<&str>) -> Result<()> {
    let first_of_month = super::parse_month_arg(month)?;

    let spinner = tui::create_spinner("Loading events");
    let mut controller =
        SyncController::start(Arc::clone(&ctx.store), ctx.calendar_id.clone()).await;
    spinner.finish_and_clear();

    let mut feed = ctx.store.subscribe(&ctx.calendar_id).await?;

    draw(&controller.state().await, first_of_month, Local::now().date_naive());

    loop {
        tokio::select! {
            signal = feed.recv() => {
                if signal.is_none() {
                    log::warn!("Change feed closed, stopping watch");
                    break;
                }
                // Opaque signal: reload everything, then re-render.
                let _ = controller.reload().await;
                draw(&controller.state().await, first_of_month, Local::now().date_naive());
            }
            _ = signal::ctrl_c() => break,
        }
    }

    // Queued writes still fire even though the view is going away.
    controller.flush().await;

    Ok(())
}

fn draw(state: &AppState, first_of_month: NaiveDate, today: NaiveDate) {
    // Clear the screen and redraw from scratch; the grid is a pure
    // projection of the state, so a full redraw is always correct.
    print!("\x1b[2J\x1b[H");
    println!("{}", render::month_grid(state, first_of_month, today));
    println!();
    println!("{}", "Watching for changes. Ctrl-C to exit.".dimmed());
}
