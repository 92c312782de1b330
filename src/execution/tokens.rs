//! Per-invocation correlation tokens.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Tie-breaker for invocations within one clock tick.
static SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Marker pair framing one command invocation.
///
/// `end` is printed unconditionally after the command; `error` prefixes
/// the message of an error trapped by the interpreter. Both embed the
/// wall-clock time in nanoseconds plus a process-wide sequence number, so
/// no two invocations ever share a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationTokens {
    pub end: String,
    pub error: String,
}

impl CorrelationTokens {
    /// Generate a fresh token pair.
    pub fn generate() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let stamp = format!("{nanos:x}-{seq:x}");

        Self {
            end: format!("##RB-END-{stamp}##"),
            error: format!("##RB-ERR-{stamp}##"),
        }
    }
}
