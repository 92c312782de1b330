//! Exclusive access to a session's output queue.

use tokio::sync::{mpsc, MutexGuard};
use tokio::time::Instant;
use tracing::debug;

/// Outcome of waiting for the next output line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextLine {
    /// A line arrived.
    Line(String),
    /// The reader has exited; no further lines will ever arrive.
    Closed,
    /// The deadline passed first.
    Deadline,
}

/// Output queue plus the end marker of the last abandoned invocation.
///
/// The interpreter runs commands one after another, so everything it
/// prints before an abandoned command's end marker belongs to that
/// command, however late it arrives.
pub(crate) struct QueueState {
    rx: mpsc::UnboundedReceiver<String>,
    abandoned: Option<String>,
}

impl QueueState {
    pub(crate) fn new(rx: mpsc::UnboundedReceiver<String>) -> Self {
        Self {
            rx,
            abandoned: None,
        }
    }

    pub(crate) fn drain(&mut self) -> usize {
        let mut discarded = 0;
        while let Ok(line) = self.rx.try_recv() {
            if self
                .abandoned
                .as_deref()
                .is_some_and(|end| line.contains(end))
            {
                debug!("abandoned command finished");
                self.abandoned = None;
            }
            discarded += 1;
        }
        discarded
    }
}

/// Lease on the output queue.
///
/// Only one lease exists at a time per session. Whoever holds it owns the
/// logical command stream: draining, writing and collecting a command's
/// output all happen under the same lease.
pub struct OutputLease<'a> {
    state: MutexGuard<'a, QueueState>,
}

impl<'a> OutputLease<'a> {
    pub(crate) fn new(state: MutexGuard<'a, QueueState>) -> Self {
        Self { state }
    }

    /// Discard every line currently queued. Never blocks.
    ///
    /// Returns the number of discarded lines.
    pub fn drain(&mut self) -> usize {
        self.state.drain()
    }

    /// Wait for the next line, giving up at `deadline`.
    pub async fn next_line(&mut self, deadline: Instant) -> NextLine {
        match tokio::time::timeout_at(deadline, self.state.rx.recv()).await {
            Ok(Some(line)) => NextLine::Line(line),
            Ok(None) => NextLine::Closed,
            Err(_) => NextLine::Deadline,
        }
    }

    /// Record that the invocation ending with `end_token` was given up on.
    ///
    /// Replaces any earlier record: the interpreter finishes commands in
    /// order, so the newest end marker is the last stale line.
    pub fn abandon(&mut self, end_token: impl Into<String>) {
        self.state.abandoned = Some(end_token.into());
    }

    /// End marker of an abandoned invocation whose output may still arrive.
    pub fn take_abandoned(&mut self) -> Option<String> {
        self.state.abandoned.take()
    }
}
