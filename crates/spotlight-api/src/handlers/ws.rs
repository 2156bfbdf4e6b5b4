//! WebSocket upgrade handler and per-connection read loop.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::http::{HeaderMap, header};
use axum::response::{IntoResponse, Response};
use futures::{Sink, SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use spotlight_core::error::AppError;
use spotlight_core::result::AppResult;
use spotlight_core::types::id::UserId;
use spotlight_realtime::{Outbound, RealtimeEngine};

use crate::dto::request::WsQuery;
use crate::error::ApiResult;
use crate::state::AppState;

/// How long the writer may take to flush its close frame after the read
/// loop ends.
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// GET /ws?user_id={id} — WebSocket upgrade
pub async fn ws_upgrade(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<WsQuery>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> ApiResult<Response> {
    check_origin(&headers, &state.realtime.config().allowed_origin)?;
    let user_id = parse_user_id(query.user_id.as_deref())?;

    if state.realtime.is_shutting_down() {
        return Err(AppError::service_unavailable("Server is shutting down").into());
    }

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return Ok(rejection.into_response()),
    };

    let engine = Arc::clone(&state.realtime);
    Ok(ws.on_upgrade(move |socket| handle_ws_connection(engine, user_id, socket)))
}

/// Reject browsers whose `Origin` is not the configured one.
///
/// Requests without an `Origin` header are not from a browser and pass.
pub fn check_origin(headers: &HeaderMap, allowed_origin: &str) -> AppResult<()> {
    let Some(origin) = headers.get(header::ORIGIN) else {
        return Ok(());
    };

    if allowed_origin == "*" || origin.as_bytes() == allowed_origin.as_bytes() {
        return Ok(());
    }

    let origin = String::from_utf8_lossy(origin.as_bytes());
    warn!(origin = %origin, "Rejected WebSocket upgrade from disallowed origin");
    Err(AppError::authorization(format!(
        "Origin '{origin}' is not allowed"
    )))
}

/// Parse the `user_id` query parameter into a routable identifier.
pub fn parse_user_id(raw: Option<&str>) -> AppResult<UserId> {
    let raw = raw.ok_or_else(|| AppError::validation("user_id query parameter is required"))?;

    let user_id: UserId = raw
        .parse()
        .map_err(|_| AppError::validation(format!("Invalid user_id '{raw}'")))?;

    if !user_id.is_valid() {
        return Err(AppError::validation("user_id must be non-zero"));
    }

    Ok(user_id)
}

/// Handles an established WebSocket connection.
async fn handle_ws_connection(engine: Arc<RealtimeEngine>, user_id: UserId, socket: WebSocket) {
    let (mut session, outbound_rx) = match engine.open_session(user_id) {
        Ok(opened) => opened,
        Err(e) => {
            warn!(user_id = %user_id, error = %e, "Failed to register WebSocket connection");
            return;
        }
    };
    let conn_id = session.connection_id();
    let (ws_tx, mut ws_rx) = socket.split();
    let write_timeout = Duration::from_secs(engine.config().write_timeout_seconds.max(1));

    info!(conn_id = %conn_id, user_id = %user_id, "WebSocket connection established");

    let mut writer = tokio::spawn(forward_outbound(outbound_rx, ws_tx, write_timeout));
    let mut writer_done = false;

    let shutdown = engine.shutdown_token();

    loop {
        tokio::select! {
            frame = ws_rx.next() => {
                let text = match frame {
                    Some(Ok(Message::Text(text))) => text.as_str().to_owned(),
                    Some(Ok(Message::Binary(data))) => match String::from_utf8(data.to_vec()) {
                        Ok(text) => text,
                        Err(_) => {
                            debug!(conn_id = %conn_id, "Binary frame is not UTF-8, closing");
                            break;
                        }
                    },
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        debug!(conn_id = %conn_id, error = %e, "WebSocket read error");
                        break;
                    }
                };

                if let Err(e) = session.handle_frame(&text) {
                    warn!(conn_id = %conn_id, user_id = %user_id, error = %e, "Closing connection");
                    break;
                }
            }
            _ = &mut writer, if !writer_done => {
                writer_done = true;
                debug!(conn_id = %conn_id, "Outbound writer ended");
                break;
            }
            _ = shutdown.cancelled() => break,
        }
    }

    session.close();

    if !writer_done && tokio::time::timeout(WRITER_DRAIN_TIMEOUT, &mut writer).await.is_err() {
        writer.abort();
    }

    info!(conn_id = %conn_id, user_id = %user_id, "WebSocket connection closed");
}

/// Forward hub output to the socket until the hub drops or closes the
/// connection, a write fails, or a write stalls past `write_timeout`.
///
/// Returning drops the receiver, so the hub's next write to this connection
/// fails and purges it.
pub async fn forward_outbound<S>(
    mut outbound_rx: mpsc::Receiver<Outbound>,
    mut sink: S,
    write_timeout: Duration,
) where
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    while let Some(outbound) = outbound_rx.recv().await {
        let (frame, last) = match outbound {
            Outbound::Text(text) => (Message::Text(text.into()), false),
            Outbound::Close => (Message::Close(None), true),
        };

        match tokio::time::timeout(write_timeout, sink.send(frame)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                debug!(error = %e, "WebSocket write failed");
                return;
            }
            Err(_) => {
                warn!(
                    timeout_ms = write_timeout.as_millis() as u64,
                    "WebSocket write timed out, dropping connection"
                );
                return;
            }
        }

        if last {
            break;
        }
    }

    let _ = tokio::time::timeout(write_timeout, sink.close()).await;
}
