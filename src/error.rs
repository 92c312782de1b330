//! Error types for repl-bridge.
//!
//! Only lifecycle operations surface these. Command execution reports
//! every failure as a [`RunResult`](crate::execution::RunResult) value.

use thiserror::Error;

/// Main error type for repl-bridge operations.
#[derive(Error, Debug)]
pub enum ReplBridgeError {
    /// The interpreter process could not be started.
    #[error("failed to spawn interpreter '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Session has been stopped and cannot be restarted.
    #[error("session terminated")]
    SessionTerminated,

    /// Invalid state transition attempted.
    #[error("invalid state transition from {from:?} to {to:?}")]
    InvalidStateTransition {
        from: crate::session::SessionState,
        to: crate::session::SessionState,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal lock was poisoned.
    #[error("internal lock poisoned")]
    LockPoisoned,

    /// Configuration could not be loaded or applied.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience Result type for repl-bridge operations.
pub type Result<T> = std::result::Result<T, ReplBridgeError>;
