//! Connection session lifecycle: register, validate, submit, release.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use spotlight_core::config::RealtimeConfig;
use spotlight_core::error::{AppError, ErrorKind};
use spotlight_core::result::AppResult;
use spotlight_core::traits::message_log::MessageLog;
use spotlight_core::types::id::UserId;

use crate::hub::HubHandle;
use crate::message::types::{ChatMessage, InboundFrame};
use crate::message::validator::{FrameRejection, check_frame_size, normalize_frame};
use crate::metrics::RealtimeMetrics;

use super::handle::{ConnectionHandle, ConnectionId, Outbound};

/// Lifecycle state of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Upgrade accepted, not yet registered.
    Connecting,
    /// Registered with the hub; routable.
    Registered,
    /// Reading inbound frames.
    Reading,
    /// Released. Terminal.
    Closed,
}

/// Result of handling one inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The message was submitted to the hub.
    Submitted(ChatMessage),
    /// The frame was invalid and skipped; keep reading.
    Skipped(FrameRejection),
}

/// The hub-facing half of one WebSocket connection.
///
/// Created registered. Releases its hub entry exactly once, on [`close`] or
/// on drop, whichever comes first.
///
/// [`close`]: ConnectionSession::close
pub struct ConnectionSession {
    user_id: UserId,
    connection_id: ConnectionId,
    state: ConnectionState,
    max_frame_bytes: usize,
    hub: HubHandle,
    /// Feeds this connection's log writer, which appends in submission order.
    log_queue: mpsc::Sender<ChatMessage>,
    metrics: Arc<RealtimeMetrics>,
}

impl std::fmt::Debug for ConnectionSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSession")
            .field("user_id", &self.user_id)
            .field("connection_id", &self.connection_id)
            .field("state", &self.state)
            .finish()
    }
}

impl ConnectionSession {
    /// Register a new connection for `user_id`.
    ///
    /// Returns the session and the receiver the connection's writer task
    /// must drain. Also spawns the connection's log writer, which ends once
    /// the session is dropped and its queue drained.
    pub fn open(
        user_id: UserId,
        config: &RealtimeConfig,
        hub: HubHandle,
        message_log: Arc<dyn MessageLog>,
        metrics: Arc<RealtimeMetrics>,
    ) -> AppResult<(Self, mpsc::Receiver<Outbound>)> {
        if !user_id.is_valid() {
            return Err(AppError::validation("user_id must be non-zero"));
        }

        let (handle, outbound) = ConnectionHandle::channel(user_id, config.connection_buffer_size);
        let connection_id = handle.id;
        let (log_queue, pending) = mpsc::channel(config.log_queue_size.max(1));

        let mut session = Self {
            user_id,
            connection_id,
            state: ConnectionState::Connecting,
            max_frame_bytes: config.max_frame_bytes,
            hub,
            log_queue,
            metrics,
        };

        session.hub.register(handle)?;
        tokio::spawn(append_in_order(
            pending,
            message_log,
            Arc::clone(&session.metrics),
        ));
        session.state = ConnectionState::Registered;
        session.metrics.connection_opened();

        debug!(user_id = %user_id, conn_id = %connection_id, "Connection session opened");

        Ok((session, outbound))
    }

    /// Authenticated user of this connection
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Connection ID
    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Current lifecycle state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Handle one inbound text frame.
    ///
    /// Invalid frames, and frames arriving while the hub is saturated, are
    /// skipped. An error means the connection must close:
    /// the frame could not be decoded, the session is already closed, or the
    /// hub has stopped.
    pub fn handle_frame(&mut self, raw: &str) -> AppResult<FrameOutcome> {
        if self.state == ConnectionState::Closed {
            return Err(AppError::transport("Connection session is closed"));
        }
        self.state = ConnectionState::Reading;
        self.metrics.frame_received();

        if let Err(rejection) = check_frame_size(raw, self.max_frame_bytes) {
            return Ok(self.skip(rejection));
        }

        let frame: InboundFrame = serde_json::from_str(raw).map_err(|e| {
            AppError::with_source(ErrorKind::Serialization, "Malformed message frame", e)
        })?;

        let message = match normalize_frame(frame, self.user_id) {
            Ok(message) => message,
            Err(rejection) => return Ok(self.skip(rejection)),
        };

        if !self.hub.route(message.clone())? {
            return Ok(self.skip(FrameRejection::HubBusy));
        }
        self.persist(&message);

        Ok(FrameOutcome::Submitted(message))
    }

    /// Release the hub entry. Idempotent.
    pub fn close(&mut self) {
        if self.state == ConnectionState::Closed {
            return;
        }
        let was_registered = self.state != ConnectionState::Connecting;
        self.state = ConnectionState::Closed;
        if !was_registered {
            return;
        }

        if let Err(e) = self.hub.release(self.user_id, self.connection_id) {
            debug!(
                user_id = %self.user_id,
                conn_id = %self.connection_id,
                error = %e,
                "Hub unavailable during release"
            );
        }
        self.metrics.connection_closed();

        info!(
            user_id = %self.user_id,
            conn_id = %self.connection_id,
            "Connection session closed"
        );
    }

    fn skip(&self, rejection: FrameRejection) -> FrameOutcome {
        self.metrics.frame_rejected();
        debug!(
            user_id = %self.user_id,
            conn_id = %self.connection_id,
            reason = %rejection,
            "Skipping invalid frame"
        );
        FrameOutcome::Skipped(rejection)
    }

    /// Hand the message to the log writer without waiting for the append.
    fn persist(&self, message: &ChatMessage) {
        if let Err(e) = self.log_queue.try_send(message.clone()) {
            self.metrics.log_failure();
            warn!(
                from = %message.from,
                to = %message.to,
                reason = %e,
                "Message log queue unavailable, message not persisted"
            );
        }
    }
}

/// Append queued messages one at a time. Failures are logged and skipped.
async fn append_in_order(
    mut pending: mpsc::Receiver<ChatMessage>,
    log: Arc<dyn MessageLog>,
    metrics: Arc<RealtimeMetrics>,
) {
    while let Some(message) = pending.recv().await {
        if let Err(e) = log.append(message.from, message.to, &message.content).await {
            metrics.log_failure();
            warn!(
                from = %message.from,
                to = %message.to,
                error = %e,
                "Failed to append message to log"
            );
        }
    }
}

impl Drop for ConnectionSession {
    fn drop(&mut self) {
        self.close();
    }
}
