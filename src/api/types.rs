//! API request and response types.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::execution::{Outcome, RunResult};
use crate::session::Session;

/// Request to run a command.
#[derive(Debug, Clone, Deserialize)]
pub struct RunRequest {
    /// Command text, sent verbatim.
    pub command: String,
    /// Timeout in seconds; the executor default when absent.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Also return the JSON document embedded in the output.
    #[serde(default)]
    pub parse_json: bool,
}

impl RunRequest {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.filter(|s| *s > 0).map(Duration::from_secs)
    }
}

/// Response for a command run.
#[derive(Debug, Clone, Serialize)]
pub struct RunResponse {
    pub ok: bool,
    pub output: String,
    pub errors: String,
    pub outcome: Outcome,
    pub duration_ms: u64,
    /// Parsed JSON payload, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<Vec<serde_json::Value>>,
}

impl RunResponse {
    pub fn from_result(result: &RunResult, parse_json: bool) -> Self {
        Self {
            ok: result.ok,
            output: result.output.clone(),
            errors: result.errors.clone(),
            outcome: result.outcome,
            duration_ms: result.duration.as_millis() as u64,
            json: parse_json.then(|| result.json()),
        }
    }
}

/// Response for session status query.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatusResponse {
    pub state: String,
    pub dialect: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
}

impl SessionStatusResponse {
    pub fn from_session(session: &Session) -> Self {
        Self {
            state: session.state().as_str().to_string(),
            dialect: session.dialect().name().to_string(),
            pid: session.pid(),
        }
    }
}

/// Generic API error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "BAD_REQUEST").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }
}
