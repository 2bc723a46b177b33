use std::sync::Arc;

use anyhow::Result;
use chrono::Local;
use daygrid_core::sync::SyncController;

use crate::render;

pub async fn run(ctx: &super::Context, month: Option<&str>) -> Result<()> {
    let first_of_month = super::parse_month_arg(month)?;

    let controller =
        SyncController::start(Arc::clone(&ctx.store), ctx.calendar_id.clone()).await;
    let state = controller.state().await;

    let today = Local::now().date_naive();
    println!("{}", render::month_grid(&state, first_of_month, today));

    Ok(())
}
