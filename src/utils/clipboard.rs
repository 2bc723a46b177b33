//! Clipboard access through the platform's copy utility.
//!
//! There is no in-process clipboard dependency; the text is piped to the
//! first copy command that works. Callers treat any failure as a cue to
//! show the text for manual copying.

use daygrid_core::{DayGridError, DayGridResult};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

#[cfg(target_os = "macos")]
const COPY_COMMANDS: &[&[&str]] = &[&["pbcopy"]];

#[cfg(not(target_os = "macos"))]
const COPY_COMMANDS: &[&[&str]] = &[
    &["wl-copy"],
    &["xclip", "-selection", "clipboard"],
    &["xsel", "--clipboard", "--input"],
];

pub async fn copy(text: &str) -> DayGridResult<()> {
    for command in COPY_COMMANDS {
        match try_copy(command, text).await {
            Ok(()) => return Ok(()),
            Err(err) => log::debug!("{} failed: {err}", command[0]),
        }
    }
    Err(DayGridError::Clipboard(
        "No clipboard utility available".into(),
    ))
}

async fn try_copy(command: &[&str], text: &str) -> DayGridResult<()> {
    let mut child = Command::new(command[0])
        .args(&command[1..])
        .stdin(std::process::Stdio::piped())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .map_err(|e| DayGridError::Clipboard(format!("Failed to spawn {}: {e}", command[0])))?;

    // unwrap safe: we piped stdin above
    let mut stdin = child.stdin.take().unwrap();
    stdin
        .write_all(text.as_bytes())
        .await
        .map_err(|e| DayGridError::Clipboard(e.to_string()))?;
    drop(stdin);

    let status = child
        .wait()
        .await
        .map_err(|e| DayGridError::Clipboard(e.to_string()))?;

    if !status.success() {
        return Err(DayGridError::Clipboard(format!(
            "{} exited with status {}",
            command[0],
            status.code().unwrap_or(-1)
        )));
    }

    Ok(())
}
