//! API key authentication.
//!
//! Every command sent through the API runs with the interpreter's
//! privileges, so any non-health route requires a valid key once
//! authentication is enabled.

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;

use super::types::ErrorResponse;

/// Alternative header carrying the bare key.
pub const API_KEY_HEADER: &str = "x-api-key";

const BEARER_PREFIX: &str = "Bearer ";

/// Immutable set of accepted API keys.
#[derive(Debug, Default)]
pub struct ApiKeyStore {
    keys: HashSet<String>,
}

impl ApiKeyStore {
    /// Create a store accepting `keys`. An empty store disables authentication.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys
                .into_iter()
                .map(Into::into)
                .filter(|k: &String| !k.is_empty())
                .collect(),
        }
    }

    /// Create a store with authentication disabled.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Check if authentication is enabled.
    pub fn is_enabled(&self) -> bool {
        !self.keys.is_empty()
    }

    /// Check if a key is valid.
    pub fn is_valid(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Get the number of registered keys.
    pub fn count(&self) -> usize {
        self.keys.len()
    }

    /// Extract the key from an `Authorization: Bearer` value.
    pub fn extract_bearer(header_value: &str) -> Option<&str> {
        header_value.strip_prefix(BEARER_PREFIX).map(str::trim)
    }
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::new("UNAUTHORIZED", message)),
    )
        .into_response()
}

/// Authentication middleware for axum.
pub async fn auth_middleware(
    State(store): State<Arc<ApiKeyStore>>,
    request: Request,
    next: Next,
) -> Response {
    if !store.is_enabled() || request.uri().path() == "/health" {
        return next.run(request).await;
    }

    let headers = request.headers();
    let key = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(ApiKeyStore::extract_bearer)
        .or_else(|| headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()));

    let rejection = match key {
        Some(key) if store.is_valid(key) => None,
        Some(_) => Some("invalid API key"),
        None => Some("missing API key"),
    };

    match rejection {
        None => next.run(request).await,
        Some(reason) => {
            warn!(path = %request.uri().path(), reason, "request rejected");
            unauthorized(reason)
        }
    }
}
