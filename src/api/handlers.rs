//! REST API handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use tracing::info;

use super::auth::ApiKeyStore;
use super::types::{ErrorResponse, RunRequest, RunResponse, SessionStatusResponse};
use crate::execution::Executor;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub executor: Arc<Executor>,
    pub auth: Arc<ApiKeyStore>,
}

impl AppState {
    /// State without authentication.
    pub fn new(executor: Executor) -> Self {
        Self::with_auth(executor, ApiKeyStore::disabled())
    }

    pub fn with_auth(executor: Executor, auth: ApiKeyStore) -> Self {
        Self {
            executor: Arc::new(executor),
            auth: Arc::new(auth),
        }
    }
}

/// Health check endpoint.
pub async fn health() -> &'static str {
    "OK"
}

/// API information endpoint.
pub async fn api_info() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "repl-bridge",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

/// Report the interpreter session's state.
pub async fn session_status(State(state): State<AppState>) -> Json<SessionStatusResponse> {
    Json(SessionStatusResponse::from_session(
        state.executor.session(),
    ))
}

/// Stop the interpreter session. Further runs report it as not active.
pub async fn stop_session(State(state): State<AppState>) -> StatusCode {
    info!("session stop requested over API");
    state.executor.session().stop();
    StatusCode::NO_CONTENT
}

/// Run a command and wait for its result.
///
/// Interpreter errors and timeouts are part of a successful response;
/// only malformed requests are rejected.
pub async fn run_command(
    State(state): State<AppState>,
    Json(req): Json<RunRequest>,
) -> Result<Json<RunResponse>, (StatusCode, Json<ErrorResponse>)> {
    if req.command.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("command must not be empty")),
        ));
    }

    let result = state.executor.run(&req.command, req.timeout()).await;
    Ok(Json(RunResponse::from_result(&result, req.parse_json)))
}
