//! Durable direct-message log consumed by the real-time router.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::result::AppResult;
use crate::types::id::{MessageId, UserId};

/// A direct message as stored in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StoredMessage {
    /// Row identifier.
    pub id: MessageId,
    /// Author of the message.
    pub sender_id: UserId,
    /// Addressee of the message.
    pub receiver_id: UserId,
    /// Message body.
    pub content: String,
    /// When the message was appended.
    pub created_at: DateTime<Utc>,
}

/// Append-only store of direct messages.
///
/// Appends are issued concurrently by every connection handler and impose
/// no ordering requirement on the hub.
#[async_trait]
pub trait MessageLog: Send + Sync + 'static {
    /// Append one message to the log.
    async fn append(&self, sender: UserId, receiver: UserId, content: &str) -> AppResult<()>;

    /// Return the conversation between two users in both directions, oldest first.
    async fn conversation(&self, user_a: UserId, user_b: UserId) -> AppResult<Vec<StoredMessage>>;
}
