//! Integration tests for the REST endpoints.

use axum::http::StatusCode;
use serde_json::json;

use spotlight_core::types::id::UserId;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "alice", "password": "alice-pass" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["data"]["user_id"], 1);
    assert_eq!(response.body["data"]["username"], "alice");
}

#[tokio::test]
async fn test_login_invalid_password() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "alice", "password": "wrong" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_login_requires_username() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "", "password": "x" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_conversation_history_both_directions() {
    let app = TestApp::new().await;
    let log = app.realtime.message_log();
    log.append(UserId(1), UserId(2), "hi bob").await.expect("append");
    log.append(UserId(2), UserId(1), "hi alice").await.expect("append");
    log.append(UserId(1), UserId(3), "unrelated").await.expect("append");

    let response = app
        .request("GET", "/api/messages?user_a=2&user_b=1", None)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let messages = response.body["data"].as_array().expect("array");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["content"], "hi bob");
    assert_eq!(messages[1]["content"], "hi alice");
}

#[tokio::test]
async fn test_conversation_rejects_zero_user() {
    let app = TestApp::new().await;

    let response = app
        .request("GET", "/api/messages?user_a=0&user_b=1", None)
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_detailed_health_check() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/health/detailed", None).await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["status"], "ok");
    assert_eq!(data["database"], "not_configured");
    assert_eq!(data["online_users"], 0);
    assert_eq!(data["realtime"]["messages_routed"], 0);
}
