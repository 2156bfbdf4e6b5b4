//! Direct-message repository: the durable log behind real-time delivery.

use async_trait::async_trait;
use sqlx::PgPool;

use spotlight_core::error::{AppError, ErrorKind};
use spotlight_core::result::AppResult;
use spotlight_core::traits::message_log::{MessageLog, StoredMessage};
use spotlight_core::types::id::UserId;

/// Repository for the `messages` table.
#[derive(Debug, Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    /// Create a new message repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a message and return the stored row.
    pub async fn insert(
        &self,
        sender: UserId,
        receiver: UserId,
        content: &str,
    ) -> AppResult<StoredMessage> {
        sqlx::query_as::<_, StoredMessage>(
            "INSERT INTO messages (sender_id, receiver_id, content) VALUES ($1, $2, $3) \
             RETURNING id, sender_id, receiver_id, content, created_at",
        )
        .bind(sender)
        .bind(receiver)
        .bind(content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert message", e))
    }

    /// Messages exchanged between two users in either direction, oldest first.
    pub async fn find_conversation(
        &self,
        user_a: UserId,
        user_b: UserId,
    ) -> AppResult<Vec<StoredMessage>> {
        sqlx::query_as::<_, StoredMessage>(
            "SELECT id, sender_id, receiver_id, content, created_at FROM messages \
             WHERE (sender_id = $1 AND receiver_id = $2) OR (sender_id = $2 AND receiver_id = $1) \
             ORDER BY created_at ASC, id ASC",
        )
        .bind(user_a)
        .bind(user_b)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load conversation", e))
    }
}

#[async_trait]
impl MessageLog for MessageRepository {
    async fn append(&self, sender: UserId, receiver: UserId, content: &str) -> AppResult<()> {
        self.insert(sender, receiver, content).await.map(|_| ())
    }

    async fn conversation(&self, user_a: UserId, user_b: UserId) -> AppResult<Vec<StoredMessage>> {
        self.find_conversation(user_a, user_b).await
    }
}
