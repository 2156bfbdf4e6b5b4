//! Integration tests for WebSocket connection and messaging.

use spotlight_core::types::id::UserId;

use crate::helpers::{
    ALLOWED_ORIGIN, TestApp, assert_silent, connect, connect_with_origin, expect_closed, recv_json,
    rejected_status, send,
};

#[tokio::test]
async fn test_message_reaches_recipient_and_echoes_to_sender() {
    let app = TestApp::new().await;
    let url = app.spawn().await;
    let mut alice = connect(&app, &url, 1).await;
    let mut bob = connect(&app, &url, 2).await;

    send(&mut alice, r#"{"to":2,"content":"hi"}"#).await;

    for frame in [recv_json(&mut bob).await, recv_json(&mut alice).await] {
        assert_eq!(frame["from"], 1);
        assert_eq!(frame["to"], 2);
        assert_eq!(frame["content"], "hi");
        assert!(frame["timestamp"].is_string());
    }
    assert_silent(&mut alice).await;
    assert_silent(&mut bob).await;

    let logged = app.wait_logged(1).await;
    assert_eq!(logged[0].sender_id, UserId(1));
    assert_eq!(logged[0].receiver_id, UserId(2));
    assert_eq!(logged[0].content, "hi");
}

#[tokio::test]
async fn test_message_to_disconnected_user_is_dropped() {
    let app = TestApp::new().await;
    let url = app.spawn().await;
    let mut alice = connect(&app, &url, 1).await;
    let mut bob = connect(&app, &url, 2).await;

    bob.close(None).await.expect("close bob");
    app.wait_online(2, false).await;

    send(&mut alice, r#"{"to":2,"content":"still there?"}"#).await;
    assert_silent(&mut alice).await;

    // The connection is still usable afterwards.
    send(&mut alice, r#"{"to":1,"content":"note to self"}"#).await;
    let frame = recv_json(&mut alice).await;
    assert_eq!(frame["content"], "note to self");
    assert_silent(&mut alice).await;

    assert_eq!(app.realtime.metrics().snapshot().routing_misses, 1);
    // Persistence is independent of delivery.
    assert_eq!(app.wait_logged(2).await.len(), 2);
}

#[tokio::test]
async fn test_malformed_frames_are_skipped() {
    let app = TestApp::new().await;
    let url = app.spawn().await;
    let mut alice = connect(&app, &url, 1).await;
    let mut bob = connect(&app, &url, 2).await;

    send(&mut alice, r#"{"to":0,"content":"x"}"#).await;
    send(&mut alice, r#"{"to":2,"content":""}"#).await;
    send(&mut alice, r#"{"to":2,"content":"after the bad ones"}"#).await;

    let frame = recv_json(&mut bob).await;
    assert_eq!(frame["content"], "after the bad ones");
    assert_silent(&mut bob).await;
    assert_eq!(app.realtime.metrics().snapshot().frames_rejected, 2);
}

#[tokio::test]
async fn test_sender_cannot_be_forged() {
    let app = TestApp::new().await;
    let url = app.spawn().await;
    let mut alice = connect(&app, &url, 1).await;
    let mut bob = connect(&app, &url, 2).await;

    send(&mut alice, r#"{"from":2,"to":2,"content":"it's me, bob"}"#).await;

    let frame = recv_json(&mut bob).await;
    assert_eq!(frame["from"], 1);
}

#[tokio::test]
async fn test_undecodable_frame_closes_connection() {
    let app = TestApp::new().await;
    let url = app.spawn().await;
    let mut alice = connect(&app, &url, 1).await;

    send(&mut alice, "definitely not json").await;

    expect_closed(&mut alice).await;
    app.wait_online(1, false).await;
}

#[tokio::test]
async fn test_second_connection_supersedes_first() {
    let app = TestApp::new().await;
    let url = app.spawn().await;
    let mut first = connect(&app, &url, 1).await;
    let mut second = connect(&app, &url, 1).await;
    let mut bob = connect(&app, &url, 2).await;

    expect_closed(&mut first).await;

    send(&mut bob, r#"{"to":1,"content":"which one?"}"#).await;
    let frame = recv_json(&mut second).await;
    assert_eq!(frame["content"], "which one?");
    app.wait_online(1, true).await;
}

#[tokio::test]
async fn test_upgrade_rejects_foreign_origin() {
    let app = TestApp::new().await;
    let url = app.spawn().await;

    let status = rejected_status(&format!("{url}?user_id=1"), Some("http://evil.example")).await;
    assert_eq!(status, 403);

    let _client = connect_with_origin(&app, &url, 1, ALLOWED_ORIGIN).await;
}

#[tokio::test]
async fn test_upgrade_requires_valid_user_id() {
    let app = TestApp::new().await;
    let url = app.spawn().await;

    assert_eq!(rejected_status(&url, None).await, 400);
    assert_eq!(rejected_status(&format!("{url}?user_id=abc"), None).await, 400);
    assert_eq!(rejected_status(&format!("{url}?user_id=0"), None).await, 400);
}

#[tokio::test]
async fn test_shutdown_closes_every_connection() {
    let app = TestApp::new().await;
    let url = app.spawn().await;
    let mut alice = connect(&app, &url, 1).await;
    let mut bob = connect(&app, &url, 2).await;

    app.realtime.shutdown().await.expect("shutdown");

    expect_closed(&mut alice).await;
    expect_closed(&mut bob).await;
    assert!(app.realtime.is_shutting_down());
    assert_eq!(rejected_status(&format!("{url}?user_id=3"), None).await, 503);
}
