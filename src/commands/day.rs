use std::sync::Arc;

use anyhow::Result;
use daygrid_core::sync::SyncController;

use crate::render;

pub async fn run(ctx: &super::Context, date: Option<&str>) -> Result<()> {
    let date_key = super::parse_date_arg(date)?;

    let controller =
        SyncController::start(Arc::clone(&ctx.store), ctx.calendar_id.clone()).await;
    let state = controller.state().await;

    println!("{}", render::day_view(&state, &date_key));

    Ok(())
}
