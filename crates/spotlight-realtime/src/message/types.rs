//! Inbound and outbound WebSocket message type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use spotlight_core::types::id::UserId;

/// A frame as sent by the client.
///
/// Absent fields decode to their zero values so that an incomplete frame is
/// rejected by validation rather than by the decoder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundFrame {
    /// Sender as declared by the client. Never trusted.
    #[serde(default)]
    pub from: Option<UserId>,
    /// Addressee.
    #[serde(default)]
    pub to: UserId,
    /// Message body.
    #[serde(default)]
    pub content: String,
}

/// A validated direct message, as routed by the hub and written to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Authenticated sender.
    pub from: UserId,
    /// Addressee.
    pub to: UserId,
    /// Message body, never empty.
    pub content: String,
    /// When the server accepted the message.
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a message stamped with the current time.
    pub fn new(from: UserId, to: UserId, content: impl Into<String>) -> Self {
        Self {
            from,
            to,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Whether the sender addressed the message to itself.
    pub fn is_self_addressed(&self) -> bool {
        self.from == self.to
    }
}
