//! # repl-bridge
//!
//! Synchronous call/response execution on top of a long-lived,
//! line-oriented interpreter such as PowerShell or `/bin/sh`.
//!
//! The interpreter speaks no protocol of its own. Each command is framed
//! in the interpreter's language so that it reports trapped errors and an
//! end-of-command marker in-band, and the executor collects output until
//! that marker appears or a timeout elapses.
//!
//! ## Features
//!
//! - **Session**: child process lifecycle, merged stdout/stderr, background reader
//! - **Executor**: sentinel-framed commands with timeout, one in flight at a time
//! - **Dialects**: PowerShell and POSIX shell framing
//! - **HTTP API**: optional remote surface with API key authentication
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use repl_bridge::{DialectKind, Executor, Session, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> repl_bridge::Result<()> {
//!     repl_bridge::logging::try_init().ok();
//!
//!     let session = Arc::new(Session::new(SessionConfig::new(DialectKind::Posix)));
//!     session.start()?;
//!
//!     let executor = Executor::new(Arc::clone(&session));
//!     let result = executor.run("echo hello", Some(Duration::from_secs(5))).await;
//!     assert!(result.ok);
//!     println!("{}", result.output);
//!
//!     session.stop();
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod execution;
pub mod interpreter;
pub mod logging;
pub mod output;
pub mod session;

// Re-export commonly used types
pub use error::{ReplBridgeError, Result};
pub use execution::{CorrelationTokens, Executor, ExecutorOptions, Outcome, RunResult};
pub use interpreter::{Dialect, DialectKind};
pub use output::{extract_json, OutputSanitizer};
pub use session::{Session, SessionConfig, SessionState};
