//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use spotlight_core::types::id::UserId;

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username.
    #[validate(length(min = 1, max = 100, message = "Username is required"))]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Query for the conversation between two users.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConversationQuery {
    /// One participant.
    pub user_a: UserId,
    /// The other participant.
    pub user_b: UserId,
}

/// Query parameters of the WebSocket upgrade.
///
/// `user_id` is kept raw so that a missing or malformed value is reported
/// by the handler instead of the extractor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WsQuery {
    /// Authenticated user id, established upstream.
    pub user_id: Option<String>,
}
