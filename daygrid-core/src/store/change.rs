//! Change notification plumbing shared by both backends.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Opaque "something changed" signal. It carries no payload on purpose:
/// consumers reload everything rather than interpreting the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeSignal;

/// A live subscription to backend changes.
///
/// The feed owns the background task producing the signals; dropping the
/// feed aborts it, which is the unsubscribe capability.
pub struct ChangeFeed {
    rx: mpsc::Receiver<ChangeSignal>,
    task: JoinHandle<()>,
}

impl ChangeFeed {
    pub fn new(rx: mpsc::Receiver<ChangeSignal>, task: JoinHandle<()>) -> Self {
        ChangeFeed { rx, task }
    }

    /// Wait for the next change signal. `None` means the backend side of
    /// the feed has gone away.
    pub async fn recv(&mut self) -> Option<ChangeSignal> {
        self.rx.recv().await
    }
}

impl Drop for ChangeFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}
