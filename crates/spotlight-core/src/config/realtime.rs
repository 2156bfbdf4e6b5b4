//! Real-time WebSocket router configuration.

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) router configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// The single origin allowed to open a WebSocket.
    ///
    /// Upgrades without an `Origin` header (non-browser clients) are accepted.
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,
    /// Outbound buffer per connection. A connection whose buffer is full
    /// is treated as dead and purged.
    #[serde(default = "default_connection_buffer")]
    pub connection_buffer_size: usize,
    /// Seconds a single socket write may take before the connection's
    /// writer gives up and the connection is torn down.
    #[serde(default = "default_write_timeout")]
    pub write_timeout_seconds: u64,
    /// Messages that may wait in the hub's routing queue. Frames arriving
    /// while it is saturated are skipped.
    #[serde(default = "default_hub_queue")]
    pub hub_queue_size: usize,
    /// Messages that may wait for the message log per connection.
    #[serde(default = "default_log_queue")]
    pub log_queue_size: usize,
    /// Largest inbound frame accepted, in bytes. Larger frames are skipped.
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            allowed_origin: default_allowed_origin(),
            connection_buffer_size: default_connection_buffer(),
            write_timeout_seconds: default_write_timeout(),
            hub_queue_size: default_hub_queue(),
            log_queue_size: default_log_queue(),
            max_frame_bytes: default_max_frame_bytes(),
        }
    }
}

fn default_allowed_origin() -> String {
    "http://localhost:3000".to_string()
}

fn default_connection_buffer() -> usize {
    64
}

fn default_write_timeout() -> u64 {
    10
}

fn default_hub_queue() -> usize {
    1024
}

fn default_log_queue() -> usize {
    256
}

fn default_max_frame_bytes() -> usize {
    65_536
}
