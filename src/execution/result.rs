//! Execution result types.

use std::time::Duration;

use serde::Serialize;

/// Error text reported when no end marker arrived in time.
pub const TIMEOUT_MESSAGE: &str = "Timeout";

/// Error text reported when the interpreter is not running.
pub const NOT_ACTIVE_MESSAGE: &str = "session not active";

/// How an invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// End marker seen, no trapped errors.
    Completed,
    /// End marker seen after the interpreter trapped at least one error.
    InterpreterError,
    /// No end marker within the budget. The command may still run.
    TimedOut,
    /// The interpreter was not running; nothing was sent.
    NotActive,
}

/// Result of one command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    /// True iff the end marker arrived and no error was trapped.
    pub ok: bool,
    /// Output lines joined by `\n`, in emission order.
    pub output: String,
    /// Trapped error messages joined by `\n`, or a fixed sentinel.
    pub errors: String,
    pub outcome: Outcome,
    /// Time spent waiting, including queue acquisition.
    pub duration: Duration,
}

impl RunResult {
    /// Result of an invocation whose end marker arrived.
    pub fn completed(output: &[String], errors: &[String], duration: Duration) -> Self {
        let outcome = if errors.is_empty() {
            Outcome::Completed
        } else {
            Outcome::InterpreterError
        };

        Self {
            ok: errors.is_empty(),
            output: output.join("\n"),
            errors: errors.join("\n"),
            outcome,
            duration,
        }
    }

    /// Create a result indicating timeout.
    pub fn timeout(duration: Duration) -> Self {
        Self {
            ok: false,
            output: String::new(),
            errors: TIMEOUT_MESSAGE.to_string(),
            outcome: Outcome::TimedOut,
            duration,
        }
    }

    /// Create a result indicating the interpreter is not running.
    pub fn not_active() -> Self {
        Self {
            ok: false,
            output: String::new(),
            errors: NOT_ACTIVE_MESSAGE.to_string(),
            outcome: Outcome::NotActive,
            duration: Duration::ZERO,
        }
    }

    pub fn timed_out(&self) -> bool {
        self.outcome == Outcome::TimedOut
    }

    /// Get output lines.
    pub fn output_lines(&self) -> impl Iterator<Item = &str> {
        self.output.lines()
    }

    /// Parse the first JSON document embedded in the output.
    pub fn json(&self) -> Vec<serde_json::Value> {
        crate::output::extract_json(&self.output)
    }
}
