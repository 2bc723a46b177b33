use anyhow::Result;
use owo_colors::OwoColorize;

use crate::utils::clipboard;

/// Copy the calendar's share link to the clipboard, falling back to a
/// manual copy prompt when no clipboard is reachable.
pub async fn run(ctx: &super::Context) -> Result<()> {
    let url = ctx.calendar_id.share_url();

    match clipboard::copy(&url).await {
        Ok(()) => {
            println!("Share link copied to the clipboard:");
        }
        Err(err) => {
            log::warn!("Clipboard copy failed: {err}");
            println!("Could not reach the clipboard. Copy the link manually:");
        }
    }
    println!("  {}", url.bold());
    println!();
    println!("On another machine, join this calendar with:");
    println!("  daygrid open \"{url}\"");

    Ok(())
}
