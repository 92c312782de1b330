//! Framed command execution.
//!
//! This module turns a line-oriented interpreter into a call/response
//! service:
//! - Per-invocation correlation tokens
//! - Timeout-bounded collection of output and trapped errors
//! - Results as values, never as errors
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use repl_bridge::{DialectKind, Executor, Session, SessionConfig};
//!
//! # async fn demo() -> repl_bridge::Result<()> {
//! let session = Arc::new(Session::new(SessionConfig::new(DialectKind::PowerShell)));
//! session.start()?;
//!
//! let executor = Executor::new(session);
//! let result = executor
//!     .run("Get-Date -Format o", Some(Duration::from_secs(30)))
//!     .await;
//! println!("ok={} output={}", result.ok, result.output);
//! # Ok(())
//! # }
//! ```

mod executor;
mod result;
mod tokens;

pub use executor::{Executor, ExecutorOptions, DEFAULT_TIMEOUT};
pub use result::{Outcome, RunResult, NOT_ACTIVE_MESSAGE, TIMEOUT_MESSAGE};
pub use tokens::CorrelationTokens;
