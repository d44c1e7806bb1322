//! websocket tests for the real-time channel
//!
//! these run against a real listening server so the upgrade handshake and
//! relay delivery are exercised end to end

mod common;

use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use futures_util::{SinkExt, StreamExt};
use selvage_types::{LicenseStatus, Tier};
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite};
use tower::ServiceExt;

use common::{body_json, create_test_context, post_json_bearer, seed_license, spawn_test_server};

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// read the next text message, failing the test after two seconds.
async fn recv_text(ws: &mut WsStream) -> String {
    let msg = timeout(Duration::from_secs(2), ws.next())
        .await
        .expect("timed out waiting for message")
        .expect("stream ended")
        .expect("failed to read message");
    match msg {
        tungstenite::Message::Text(text) => text.to_string(),
        other => panic!("expected text message, got {:?}", other),
    }
}

/// connect a session and wait for its heartbeat to answer, which proves the
/// session is attached to the relay actor.
async fn connect_session(addr: std::net::SocketAddr, key: &str) -> WsStream {
    let url = format!("ws://{}/ws?key={}", addr, key);
    let (mut ws, response) = connect_async(&url)
        .await
        .expect("failed to connect WebSocket");
    assert_eq!(response.status(), http::StatusCode::SWITCHING_PROTOCOLS);

    ws.send(tungstenite::Message::Text("ping".into()))
        .await
        .expect("failed to send ping");
    assert_eq!(recv_text(&mut ws).await, "pong");

    ws
}

/// test that a plain GET without upgrade headers is refused with 426
#[tokio::test]
async fn test_plain_get_is_upgrade_required() {
    let ctx = create_test_context().await;

    let request = Request::builder()
        .method("GET")
        .uri("/ws?key=slv-live")
        .body(Body::empty())
        .expect("failed to build request");

    let response = ctx.app.oneshot(request).await.expect("request failed");

    assert_eq!(response.status(), StatusCode::UPGRADE_REQUIRED);
    let json = body_json(response).await;
    assert_eq!(
        json["error"],
        "real-time channel requires a websocket upgrade"
    );
}

/// test that an upgrade without a key query parameter is rejected
#[tokio::test]
async fn test_upgrade_without_key_is_rejected() {
    let ctx = create_test_context().await;
    let (addr, server_handle) = spawn_test_server(ctx.app.clone()).await;

    let err = connect_async(format!("ws://{}/ws", addr))
        .await
        .expect_err("connect should fail without a key");
    match err {
        tungstenite::Error::Http(response) => {
            assert_eq!(response.status(), http::StatusCode::BAD_REQUEST);
        }
        other => panic!("expected http error, got {:?}", other),
    }

    server_handle.abort();
}

/// test that a ping message is answered with a pong
#[tokio::test]
async fn test_ping_gets_pong() {
    let ctx = create_test_context().await;
    let (addr, server_handle) = spawn_test_server(ctx.app.clone()).await;

    // connect_session already runs one ping/pong round; run another to make
    // sure the session stays attached after answering
    let mut ws = connect_session(addr, "slv-live").await;
    ws.send(tungstenite::Message::Text("ping".into()))
        .await
        .expect("failed to send ping");
    assert_eq!(recv_text(&mut ws).await, "pong");

    ws.close(None).await.ok();
    server_handle.abort();
}

/// test that an accepted pattern batch reaches every live session for the key
#[tokio::test]
async fn test_pattern_sync_reaches_live_sessions() {
    let ctx = create_test_context().await;
    seed_license(&ctx.db, "slv-live", Tier::Pro, LicenseStatus::Active).await;
    let (addr, server_handle) = spawn_test_server(ctx.app.clone()).await;

    let mut first = connect_session(addr, "slv-live").await;
    let mut second = connect_session(addr, "slv-live").await;

    let response = ctx
        .app
        .clone()
        .oneshot(post_json_bearer(
            "/sync/patterns",
            "slv-live",
            serde_json::json!({"patterns": [{"a": 1}]}),
        ))
        .await
        .expect("request failed");
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["synced"], 1);

    let expected = serde_json::json!({"type": "pattern-sync", "patterns": [{"a": 1}]});
    for ws in [&mut first, &mut second] {
        let text = recv_text(ws).await;
        let envelope: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(envelope, expected);
    }

    first.close(None).await.ok();
    second.close(None).await.ok();
    server_handle.abort();
}

/// test that sessions under other keys do not see the batch
#[tokio::test]
async fn test_sessions_under_other_keys_see_nothing() {
    let ctx = create_test_context().await;
    seed_license(&ctx.db, "slv-live", Tier::Pro, LicenseStatus::Active).await;
    let (addr, server_handle) = spawn_test_server(ctx.app.clone()).await;

    let mut subscribed = connect_session(addr, "slv-live").await;
    let mut bystander = connect_session(addr, "slv-other").await;

    let response = ctx
        .app
        .clone()
        .oneshot(post_json_bearer(
            "/sync/patterns",
            "slv-live",
            serde_json::json!({"patterns": [{"a": 1}]}),
        ))
        .await
        .expect("request failed");
    assert_eq!(response.status(), StatusCode::OK);

    // the subscribed session receives the batch
    let text = recv_text(&mut subscribed).await;
    assert!(text.contains("pattern-sync"));

    // the bystander hears nothing
    let silence = timeout(Duration::from_millis(300), bystander.next()).await;
    assert!(silence.is_err(), "bystander should receive no message");

    subscribed.close(None).await.ok();
    bystander.close(None).await.ok();
    server_handle.abort();
}

/// test that a closed session is detached and the rest keep receiving
#[tokio::test]
async fn test_closed_session_is_detached() {
    let ctx = create_test_context().await;
    seed_license(&ctx.db, "slv-live", Tier::Pro, LicenseStatus::Active).await;
    let (addr, server_handle) = spawn_test_server(ctx.app.clone()).await;

    let mut survivor = connect_session(addr, "slv-live").await;
    let mut quitter = connect_session(addr, "slv-live").await;

    quitter.close(None).await.expect("failed to close");
    // let the server notice the close before broadcasting
    tokio::time::sleep(Duration::from_millis(100)).await;

    let response = ctx
        .app
        .clone()
        .oneshot(post_json_bearer(
            "/sync/patterns",
            "slv-live",
            serde_json::json!({"patterns": [{"b": 2}]}),
        ))
        .await
        .expect("request failed");
    assert_eq!(response.status(), StatusCode::OK);

    let text = recv_text(&mut survivor).await;
    assert!(text.contains("pattern-sync"));

    survivor.close(None).await.ok();
    server_handle.abort();
}
