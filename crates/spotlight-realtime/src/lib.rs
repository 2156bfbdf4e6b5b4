//! # spotlight-realtime
//!
//! Real-time direct-message router for SpotLight. Provides:
//!
//! - A hub actor that owns the user → connection registry and serializes
//!   every register, unregister, and routing decision
//! - Per-connection handles with bounded, non-blocking outbound queues
//! - The connection session lifecycle (register, validate, submit, release)
//! - Wire message types and inbound frame validation
//! - Router metrics

pub mod connection;
pub mod hub;
pub mod message;
pub mod metrics;
pub mod server;

pub use connection::handle::{ConnectionHandle, ConnectionId, Delivery, Outbound};
pub use connection::session::{ConnectionSession, ConnectionState, FrameOutcome};
pub use hub::{Hub, HubHandle, RouteOutcome};
pub use message::types::{ChatMessage, InboundFrame};
pub use message::validator::FrameRejection;
pub use metrics::{MetricsSnapshot, RealtimeMetrics};
pub use server::RealtimeEngine;
