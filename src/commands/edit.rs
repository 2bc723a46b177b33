use std::sync::Arc;

use anyhow::Result;
use daygrid_core::datekey;
use daygrid_core::sync::SyncController;
use dialoguer::Input;
use owo_colors::OwoColorize;

use crate::render;

/// Walk through every slot of a day and then save the whole day at once.
///
/// The save is fire-all await-all: slots that went through are kept
/// locally even when others fail, and the failure is reported once.
pub async fn run(ctx: &super::Context, date: Option<&str>) -> Result<()> {
    let date_key = super::parse_date_arg(date)?;

    let mut controller =
        SyncController::start(Arc::clone(&ctx.store), ctx.calendar_id.clone()).await;
    let state = controller.state().await;

    if !state.online {
        println!("{}\n", render::offline_banner());
    }
    println!("{}\n", date_key.date().format("%A, %B %-d %Y").to_string().bold());

    let mut slots = Vec::new();
    for hour in datekey::day_hours() {
        let current = state.events.get(&date_key, hour).unwrap_or("").to_string();
        let text: String = Input::new()
            .with_prompt(format!("{:>5}", datekey::hour_label(hour)))
            .with_initial_text(&current)
            .allow_empty(true)
            .interact_text()?;
        slots.push((hour, text));
    }

    let result = controller.save_day(&date_key, slots).await;

    let state = controller.state().await;
    println!("\n{}", render::day_view(&state, &date_key));

    match result {
        Ok(()) => {
            println!("\nSaved {date_key}");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
