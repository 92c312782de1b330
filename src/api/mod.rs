//! HTTP API for repl-bridge.
//!
//! Exposes one interpreter session to remote callers. Commands are
//! serialized by the executor, so concurrent requests queue up.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check (never authenticated)
//! - `GET /api/v1` - API information
//! - `GET /api/v1/session` - Session state, dialect and PID
//! - `POST /api/v1/session/stop` - Stop the interpreter
//! - `POST /api/v1/run` - Run a command and wait for its result
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use repl_bridge::api::{serve, AppState, ServerConfig};
//! use repl_bridge::{DialectKind, Executor, Session, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> repl_bridge::Result<()> {
//!     let session = Arc::new(Session::new(SessionConfig::new(DialectKind::PowerShell)));
//!     session.start()?;
//!     let state = AppState::new(Executor::new(session));
//!     serve(ServerConfig::new("127.0.0.1", 3030), state, std::future::pending()).await
//! }
//! ```

pub mod auth;
pub mod handlers;
pub mod router;
pub mod types;

// Re-export commonly used types
pub use auth::{auth_middleware, ApiKeyStore, API_KEY_HEADER};
pub use handlers::AppState;
pub use router::{create_router, serve, ServerConfig};
pub use types::{ErrorResponse, RunRequest, RunResponse, SessionStatusResponse};
