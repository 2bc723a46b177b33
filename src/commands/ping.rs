use anyhow::{Context, Result};
use owo_colors::OwoColorize;

/// Connectivity probe against the active backend.
pub async fn run(ctx: &super::Context) -> Result<()> {
    ctx.store
        .probe()
        .await
        .with_context(|| format!("{} backend unreachable", ctx.store.kind()))?;

    println!("{} {} backend reachable", "ok".green(), ctx.store.kind());
    Ok(())
}
