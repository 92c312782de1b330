//! API integration tests.
//!
//! These verify the complete API flow end-to-end using axum's test utilities.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;

use repl_bridge::api::{create_router, ApiKeyStore, AppState};
use repl_bridge::{DialectKind, Executor, Session, SessionConfig};

/// Helper to create a JSON request.
fn json_request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");

    match body {
        Some(json) => builder.body(Body::from(json.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Helper to extract body as string.
async fn response_text(response: axum::response::Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8_lossy(&body).to_string()
}

/// Helper to extract JSON from response.
async fn response_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}

fn unstarted_executor() -> Executor {
    Executor::new(Arc::new(Session::new(SessionConfig::new(DialectKind::Posix))))
}

fn open_app() -> axum::Router {
    create_router(AppState::new(unstarted_executor()))
}

fn secured_app() -> axum::Router {
    create_router(AppState::with_auth(
        unstarted_executor(),
        ApiKeyStore::new(["test-key"]),
    ))
}

// ============================================================================
// Health & Info Tests
// ============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let response = open_app()
        .oneshot(json_request(Method::GET, "/health", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_text(response).await, "OK");
}

#[tokio::test]
async fn test_api_info_endpoint() {
    let response = open_app()
        .oneshot(json_request(Method::GET, "/api/v1", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["name"], "repl-bridge");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_unknown_route() {
    let response = open_app()
        .oneshot(json_request(Method::GET, "/api/v1/nope", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Session & Run Tests
// ============================================================================

#[tokio::test]
async fn test_session_status_unstarted() {
    let response = open_app()
        .oneshot(json_request(Method::GET, "/api/v1/session", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["state"], "unstarted");
    assert_eq!(json["dialect"], "posix");
    assert!(json.get("pid").is_none());
}

#[tokio::test]
async fn test_run_on_unstarted_session() {
    let response = open_app()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/run",
            Some(json!({ "command": "echo hi" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["ok"], false);
    assert_eq!(json["outcome"], "not_active");
    assert_eq!(json["errors"], "session not active");
}

#[tokio::test]
async fn test_run_empty_command_rejected() {
    let response = open_app()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/run",
            Some(json!({ "command": "  " })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_run_malformed_body_rejected() {
    let response = open_app()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/run",
            Some(json!({ "timeout_secs": 5 })),
        ))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_stop_session() {
    let state = AppState::new(unstarted_executor());
    let app = create_router(state.clone());

    let response = app
        .oneshot(json_request(Method::POST, "/api/v1/session/stop", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(state.executor.session().state().as_str(), "stopped");
}

#[cfg(unix)]
#[tokio::test]
async fn test_run_with_json_parsing() {
    let session = Arc::new(Session::new(SessionConfig::new(DialectKind::Posix)));
    session.start().unwrap();
    let state = AppState::new(Executor::new(Arc::clone(&session)));

    let response = create_router(state)
        .oneshot(json_request(
            Method::POST,
            "/api/v1/run",
            Some(json!({
                "command": r#"echo '{"user":"alice","enabled":true}'"#,
                "timeout_secs": 10,
                "parse_json": true
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["ok"], true);
    assert_eq!(json["outcome"], "completed");
    assert_eq!(json["json"][0]["user"], "alice");

    session.stop();
}

// ============================================================================
// Authentication Tests
// ============================================================================

#[tokio::test]
async fn test_auth_missing_key() {
    let response = secured_app()
        .oneshot(json_request(Method::GET, "/api/v1/session", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = response_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_auth_invalid_key() {
    let request = Request::builder()
        .uri("/api/v1/session")
        .header(header::AUTHORIZATION, "Bearer wrong-key")
        .body(Body::empty())
        .unwrap();

    let response = secured_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_bearer_key() {
    let request = Request::builder()
        .uri("/api/v1/session")
        .header(header::AUTHORIZATION, "Bearer test-key")
        .body(Body::empty())
        .unwrap();

    let response = secured_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_auth_api_key_header() {
    let request = Request::builder()
        .uri("/api/v1/session")
        .header("x-api-key", "test-key")
        .body(Body::empty())
        .unwrap();

    let response = secured_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_exempt_from_auth() {
    let response = secured_app()
        .oneshot(json_request(Method::GET, "/health", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
