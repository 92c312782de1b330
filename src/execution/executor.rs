//! Framed command execution.
//!
//! Every invocation follows the same sequence under the session's output
//! lease: drain stale output, generate fresh tokens, send the framed
//! command, then collect lines until the end marker or the deadline.
//!
//! A timed-out command is abandoned, not cancelled. The interpreter keeps
//! running it and its side effects may still happen. The lease remembers
//! its end marker, and the next invocation discards every line up to that
//! marker before collecting its own output.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, trace, warn};

use super::result::RunResult;
use super::tokens::CorrelationTokens;
use crate::output::OutputSanitizer;
use crate::session::{NextLine, Session};

/// Default execution timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Stand-in deadline for budgets too large to add to the clock.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Executor tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorOptions {
    /// Budget used when a call does not pass one.
    pub default_timeout: Duration,
    /// Remove terminal escape sequences from collected lines.
    pub strip_ansi: bool,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            default_timeout: DEFAULT_TIMEOUT,
            strip_ansi: false,
        }
    }
}

/// Sorts the lines of one invocation into output and trapped errors.
#[derive(Debug)]
struct Collector<'a> {
    tokens: &'a CorrelationTokens,
    strip_ansi: bool,
    /// End marker of an abandoned invocation still being skipped.
    stale_end: Option<String>,
    output: Vec<String>,
    errors: Vec<String>,
}

impl<'a> Collector<'a> {
    fn new(tokens: &'a CorrelationTokens, strip_ansi: bool) -> Self {
        Self {
            tokens,
            strip_ansi,
            stale_end: None,
            output: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Discard lines until `end` has passed.
    fn skip_until(mut self, end: Option<String>) -> Self {
        self.stale_end = end;
        self
    }

    fn is_skipping(&self) -> bool {
        self.stale_end.is_some()
    }

    /// Record one line. Returns `true` once the end marker is seen.
    ///
    /// Text in front of a marker is output the command printed without a
    /// trailing newline, so it is kept.
    fn accept(&mut self, line: &str) -> bool {
        let line = if self.strip_ansi {
            OutputSanitizer::strip_ansi_str(line)
        } else {
            line.to_string()
        };
        let line = line.trim_end();

        if let Some(stale) = &self.stale_end {
            if line.contains(stale.as_str()) {
                debug!("abandoned command finished");
                self.stale_end = None;
            } else {
                trace!(line, "skipping abandoned command output");
            }
            return false;
        }

        if let Some(idx) = line.find(&self.tokens.end) {
            self.push_output(&line[..idx]);
            return true;
        }

        if let Some(idx) = line.find(&self.tokens.error) {
            self.push_output(&line[..idx]);
            let message = &line[idx + self.tokens.error.len()..];
            self.errors.push(message.to_string());
            return false;
        }

        self.output.push(line.to_string());
        false
    }

    fn push_output(&mut self, prefix: &str) {
        let prefix = prefix.trim_end();
        if !prefix.is_empty() {
            self.output.push(prefix.to_string());
        }
    }
}

/// Synchronous call/response on top of a [`Session`].
///
/// Invocations are serialized through the session's output lease, so
/// concurrent callers queue up instead of interleaving their output.
#[derive(Debug, Clone)]
pub struct Executor {
    session: Arc<Session>,
    options: ExecutorOptions,
}

impl Executor {
    /// Create an executor with default options.
    pub fn new(session: Arc<Session>) -> Self {
        Self::with_options(session, ExecutorOptions::default())
    }

    pub fn with_options(session: Arc<Session>, options: ExecutorOptions) -> Self {
        Self { session, options }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn options(&self) -> ExecutorOptions {
        self.options
    }

    /// Run `command` and wait for its end marker.
    ///
    /// Never fails: a stopped interpreter, a trapped error and a timeout
    /// are all reported through the returned [`RunResult`].
    pub async fn run(&self, command: &str, timeout: Option<Duration>) -> RunResult {
        if !self.session.is_running() {
            return RunResult::not_active();
        }

        let timeout = timeout.unwrap_or(self.options.default_timeout);
        let start = Instant::now();
        let deadline = start
            .checked_add(timeout)
            .unwrap_or_else(|| start + FAR_FUTURE);

        // Waiting behind another command counts against the budget.
        let Ok(mut lease) = tokio::time::timeout_at(deadline, self.session.lease()).await else {
            warn!(?timeout, "command timed out waiting for the session");
            return RunResult::timeout(start.elapsed());
        };

        // Stopped while an earlier command held the lease.
        if !self.session.is_running() {
            return RunResult::not_active();
        }

        let stale = lease.drain();
        if stale > 0 {
            debug!(stale, "discarded stale output");
        }
        let abandoned = lease.take_abandoned();

        let tokens = CorrelationTokens::generate();
        let wire = self.session.dialect().frame(command, &tokens);
        debug!(bytes = command.len(), "dispatching command");
        trace!(command, "command text");

        let Some(delivery) = self.session.write(&wire) else {
            return RunResult::not_active();
        };
        // The interpreter only drains its input between commands; a busy
        // interpreter and a large command can block the pipe.
        match tokio::time::timeout_at(deadline, delivery.delivered()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(?timeout, "command not delivered, interpreter input closed: {}", e);
                tokio::time::sleep_until(deadline).await;
                return RunResult::timeout(start.elapsed());
            }
            Err(_) => {
                lease.abandon(tokens.end.as_str());
                warn!(?timeout, "command timed out waiting for interpreter input");
                return RunResult::timeout(start.elapsed());
            }
        }

        let mut collector =
            Collector::new(&tokens, self.options.strip_ansi).skip_until(abandoned);
        loop {
            match lease.next_line(deadline).await {
                NextLine::Line(line) => {
                    if collector.accept(&line) {
                        break;
                    }
                }
                NextLine::Closed => {
                    // The reader is gone; nothing can arrive before the deadline.
                    lease.abandon(tokens.end.as_str());
                    tokio::time::sleep_until(deadline).await;
                    warn!(?timeout, "interpreter output closed, command timed out");
                    return RunResult::timeout(start.elapsed());
                }
                NextLine::Deadline => {
                    lease.abandon(tokens.end.as_str());
                    warn!(
                        ?timeout,
                        behind_abandoned = collector.is_skipping(),
                        "command timed out"
                    );
                    return RunResult::timeout(start.elapsed());
                }
            }
        }

        let result = RunResult::completed(&collector.output, &collector.errors, start.elapsed());
        debug!(
            outcome = ?result.outcome,
            lines = collector.output.len(),
            elapsed_ms = result.duration.as_millis() as u64,
            "command finished"
        );
        result
    }
}
