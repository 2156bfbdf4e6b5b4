//! Individual WebSocket connection handle.

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use spotlight_core::types::id::UserId;

/// Unique connection identifier
pub type ConnectionId = Uuid;

/// Instruction for a connection's writer task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Write a text frame.
    Text(String),
    /// Send a close frame and stop writing.
    Close,
}

/// Result of a non-blocking write to a connection's outbound queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The frame was queued for the writer.
    Queued,
    /// The queue was full; the frame was dropped.
    Full,
    /// The writer is gone; the connection is dead.
    Closed,
}

/// The hub's handle to a single WebSocket connection.
///
/// Holds the sender half of the connection's outbound queue. The writer
/// task owns the receiver; once every handle is dropped the writer drains
/// and stops.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID
    pub id: ConnectionId,
    /// User who owns this connection
    pub user_id: UserId,
    /// When the connection was established
    pub connected_at: DateTime<Utc>,
    /// Sender for outbound frames
    sender: mpsc::Sender<Outbound>,
}

impl ConnectionHandle {
    /// Create a handle around an existing outbound sender
    pub fn new(user_id: UserId, sender: mpsc::Sender<Outbound>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            connected_at: Utc::now(),
            sender,
        }
    }

    /// Create a handle together with the receiver its writer task will drain
    pub fn channel(user_id: UserId, buffer: usize) -> (Self, mpsc::Receiver<Outbound>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (Self::new(user_id, tx), rx)
    }

    /// Queue a text frame without waiting.
    pub fn deliver(&self, frame: &str) -> Delivery {
        match self.sender.try_send(Outbound::Text(frame.to_owned())) {
            Ok(()) => Delivery::Queued,
            Err(mpsc::error::TrySendError::Full(_)) => Delivery::Full,
            Err(mpsc::error::TrySendError::Closed(_)) => Delivery::Closed,
        }
    }

    /// Whether the writer side has gone away
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Ask the writer to send a close frame, then release the handle.
    ///
    /// If the queue is full the close frame is skipped; dropping the sender
    /// still ends the writer once it drains.
    pub fn close(self) {
        if self.sender.try_send(Outbound::Close).is_err() {
            debug!(conn_id = %self.id, "Close frame not queued; dropping sender");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deliver_queues_text() {
        let (handle, mut rx) = ConnectionHandle::channel(UserId(1), 4);
        assert_eq!(handle.deliver("hello"), Delivery::Queued);
        assert_eq!(rx.recv().await, Some(Outbound::Text("hello".to_string())));
    }

    #[tokio::test]
    async fn test_deliver_reports_full_without_blocking() {
        let (handle, _rx) = ConnectionHandle::channel(UserId(1), 1);
        assert_eq!(handle.deliver("one"), Delivery::Queued);
        assert_eq!(handle.deliver("two"), Delivery::Full);
    }

    #[tokio::test]
    async fn test_deliver_reports_closed_after_receiver_drop() {
        let (handle, rx) = ConnectionHandle::channel(UserId(1), 4);
        drop(rx);
        assert!(handle.is_closed());
        assert_eq!(handle.deliver("late"), Delivery::Closed);
    }

    #[tokio::test]
    async fn test_close_sends_close_then_ends_stream() {
        let (handle, mut rx) = ConnectionHandle::channel(UserId(1), 4);
        handle.close();
        assert_eq!(rx.recv().await, Some(Outbound::Close));
        assert_eq!(rx.recv().await, None);
    }
}
