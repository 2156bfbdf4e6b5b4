//! Shared test helpers for integration tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use futures::StreamExt;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tower::ServiceExt;

use spotlight_api::{AppState, build_router};
use spotlight_core::config::{AppConfig, DatabaseConfig, LoggingConfig, RealtimeConfig, ServerConfig};
use spotlight_core::error::AppError;
use spotlight_core::result::AppResult;
use spotlight_core::traits::identity::IdentityResolver;
use spotlight_core::traits::message_log::{MessageLog, StoredMessage};
use spotlight_core::types::id::{MessageId, UserId};
use spotlight_realtime::RealtimeEngine;

/// A connected test client
pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Origin the test server accepts
pub const ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// How long to wait for something that should happen
const WAIT: Duration = Duration::from_secs(2);

/// In-memory message log
#[derive(Debug, Default)]
pub struct MemoryMessageLog {
    messages: Mutex<Vec<StoredMessage>>,
}

impl MemoryMessageLog {
    /// All appended messages, in append order
    pub fn all(&self) -> Vec<StoredMessage> {
        self.messages.lock().expect("log lock").clone()
    }
}

#[async_trait]
impl MessageLog for MemoryMessageLog {
    async fn append(&self, sender: UserId, receiver: UserId, content: &str) -> AppResult<()> {
        let mut messages = self.messages.lock().expect("log lock");
        let id = MessageId(messages.len() as i64 + 1);
        messages.push(StoredMessage {
            id,
            sender_id: sender,
            receiver_id: receiver,
            content: content.to_string(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn conversation(&self, user_a: UserId, user_b: UserId) -> AppResult<Vec<StoredMessage>> {
        Ok(self
            .all()
            .into_iter()
            .filter(|m| {
                (m.sender_id == user_a && m.receiver_id == user_b)
                    || (m.sender_id == user_b && m.receiver_id == user_a)
            })
            .collect())
    }
}

/// In-memory identity store with plain-text passwords
#[derive(Debug, Default)]
pub struct MemoryIdentity {
    users: HashMap<String, (UserId, String)>,
}

impl MemoryIdentity {
    /// Add a user
    pub fn with_user(mut self, id: i64, username: &str, password: &str) -> Self {
        self.users
            .insert(username.to_string(), (UserId(id), password.to_string()));
        self
    }
}

#[async_trait]
impl IdentityResolver for MemoryIdentity {
    async fn username_for_id(&self, user_id: UserId) -> AppResult<String> {
        self.users
            .iter()
            .find(|(_, (id, _))| *id == user_id)
            .map(|(name, _)| name.clone())
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))
    }

    async fn authenticate(&self, username: &str, password: &str) -> AppResult<UserId> {
        match self.users.get(username) {
            Some((id, stored)) if stored == password => Ok(*id),
            _ => Err(AppError::authentication("Invalid username or password")),
        }
    }
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// The realtime engine behind the router
    pub realtime: Arc<RealtimeEngine>,
    /// The message log shared with the engine
    pub log: Arc<MemoryMessageLog>,
}

/// Parsed response of a test request
pub struct TestResponse {
    /// HTTP status
    pub status: StatusCode,
    /// JSON body (`Null` when empty)
    pub body: Value,
}

impl TestApp {
    /// Create a new test application with two users, alice (1) and bob (2)
    pub async fn new() -> Self {
        let config = AppConfig {
            server: ServerConfig::default(),
            database: DatabaseConfig::new("postgres://unused@localhost/spotlight_test"),
            realtime: RealtimeConfig {
                allowed_origin: ALLOWED_ORIGIN.to_string(),
                ..RealtimeConfig::default()
            },
            logging: LoggingConfig::default(),
        };

        let log = Arc::new(MemoryMessageLog::default());
        let identity = Arc::new(
            MemoryIdentity::default()
                .with_user(1, "alice", "alice-pass")
                .with_user(2, "bob", "bob-pass"),
        );

        let realtime = Arc::new(RealtimeEngine::new(config.realtime.clone(), log.clone()));
        let state = AppState::new(config, Arc::clone(&realtime), identity, None);

        Self {
            router: build_router(state),
            realtime,
            log,
        }
    }

    /// Serve the router on an ephemeral port and return the WebSocket base URL
    pub async fn spawn(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("local addr");
        let router = self.router.clone();

        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("test server");
        });

        format!("ws://{addr}/ws")
    }

    /// Make an HTTP request to the test app
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Request failed");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Block until the hub reports the user online (or offline)
    pub async fn wait_online(&self, user: i64, online: bool) {
        tokio::time::timeout(WAIT, async {
            loop {
                let current = self
                    .realtime
                    .hub()
                    .is_online(UserId(user))
                    .await
                    .expect("hub query");
                if current == online {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("user {user} never became online={online}"));
    }

    /// Block until the message log holds at least `count` messages
    pub async fn wait_logged(&self, count: usize) -> Vec<StoredMessage> {
        tokio::time::timeout(WAIT, async {
            loop {
                let all = self.log.all();
                if all.len() >= count {
                    return all;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("messages never reached the log")
    }
}

/// Open a WebSocket as `user` and wait until it is routable
pub async fn connect(app: &TestApp, url: &str, user: i64) -> WsClient {
    let (client, _) = tokio_tungstenite::connect_async(format!("{url}?user_id={user}"))
        .await
        .expect("WebSocket connect");
    app.wait_online(user, true).await;
    client
}

/// Open a WebSocket as `user` with a browser `Origin` header
pub async fn connect_with_origin(app: &TestApp, url: &str, user: i64, origin: &str) -> WsClient {
    let mut request = format!("{url}?user_id={user}")
        .into_client_request()
        .expect("client request");
    request
        .headers_mut()
        .insert("Origin", origin.parse().expect("origin header"));

    let (client, _) = tokio_tungstenite::connect_async(request)
        .await
        .expect("WebSocket connect");
    app.wait_online(user, true).await;
    client
}

/// Attempt an upgrade and return the HTTP status of the rejection
pub async fn rejected_status(url: &str, origin: Option<&str>) -> u16 {
    let mut request = url.into_client_request().expect("client request");
    if let Some(origin) = origin {
        request
            .headers_mut()
            .insert("Origin", origin.parse().expect("origin header"));
    }

    match tokio_tungstenite::connect_async(request).await {
        Ok(_) => panic!("upgrade to {url} unexpectedly succeeded"),
        Err(tokio_tungstenite::tungstenite::Error::Http(response)) => response.status().as_u16(),
        Err(e) => panic!("unexpected handshake error: {e}"),
    }
}

/// Send a raw text frame
pub async fn send(client: &mut WsClient, text: &str) {
    use futures::SinkExt;

    client
        .send(Message::text(text))
        .await
        .expect("send frame");
}

/// Receive the next text frame as JSON
pub async fn recv_json(client: &mut WsClient) -> Value {
    loop {
        let frame = tokio::time::timeout(WAIT, client.next())
            .await
            .expect("no frame received in time")
            .expect("stream ended")
            .expect("read error");

        match frame {
            Message::Text(text) => return serde_json::from_str(text.as_str()).expect("JSON frame"),
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("unexpected frame: {other:?}"),
        }
    }
}

/// Assert nothing but control frames arrives within a short window
pub async fn assert_silent(client: &mut WsClient) {
    let result = tokio::time::timeout(Duration::from_millis(300), client.next()).await;
    if let Ok(Some(Ok(Message::Text(text)))) = result {
        panic!("unexpected frame: {text}");
    }
}

/// Wait until the server closes the connection
pub async fn expect_closed(client: &mut WsClient) {
    tokio::time::timeout(WAIT, async {
        while let Some(frame) = client.next().await {
            match frame {
                Ok(Message::Close(_)) | Err(_) => return,
                Ok(_) => continue,
            }
        }
    })
    .await
    .expect("connection was not closed");
}
