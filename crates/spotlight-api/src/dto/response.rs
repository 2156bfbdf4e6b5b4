//! Response DTOs.

use serde::{Deserialize, Serialize};

use spotlight_core::types::id::UserId;
use spotlight_realtime::MetricsSnapshot;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Identifier to pass as `user_id` when opening `/ws`.
    pub user_id: UserId,
    /// Canonical username.
    pub username: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status.
    pub status: String,
    /// Version.
    pub version: String,
    /// Uptime in seconds.
    pub uptime_seconds: u64,
}

/// Detailed health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedHealthResponse {
    /// Overall status: `ok` or `degraded`.
    pub status: String,
    /// Database status.
    pub database: String,
    /// Users with a live WebSocket connection.
    pub online_users: usize,
    /// Whether the server is shutting down.
    pub shutting_down: bool,
    /// Router counters.
    pub realtime: MetricsSnapshot,
}
