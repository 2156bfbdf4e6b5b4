//! Router metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Router-level metrics counters.
#[derive(Debug, Default)]
pub struct RealtimeMetrics {
    connections_opened: AtomicU64,
    connections_closed: AtomicU64,
    frames_received: AtomicU64,
    frames_rejected: AtomicU64,
    messages_routed: AtomicU64,
    echoes_sent: AtomicU64,
    routing_misses: AtomicU64,
    frames_dropped: AtomicU64,
    stale_purged: AtomicU64,
    log_failures: AtomicU64,
}

impl RealtimeMetrics {
    /// Create new zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn connection_opened(&self) {
        self.connections_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn connection_closed(&self) {
        self.connections_closed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn frame_received(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn frame_rejected(&self) {
        self.frames_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn message_routed(&self) {
        self.messages_routed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn echo_sent(&self) {
        self.echoes_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn routing_miss(&self) {
        self.routing_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn frame_dropped(&self) {
        self.frames_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn stale_purged(&self) {
        self.stale_purged.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn log_failure(&self) {
        self.log_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_opened: self.connections_opened.load(Ordering::Relaxed),
            connections_closed: self.connections_closed.load(Ordering::Relaxed),
            frames_received: self.frames_received.load(Ordering::Relaxed),
            frames_rejected: self.frames_rejected.load(Ordering::Relaxed),
            messages_routed: self.messages_routed.load(Ordering::Relaxed),
            echoes_sent: self.echoes_sent.load(Ordering::Relaxed),
            routing_misses: self.routing_misses.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            stale_purged: self.stale_purged.load(Ordering::Relaxed),
            log_failures: self.log_failures.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Connections registered since startup
    pub connections_opened: u64,
    /// Connections released since startup
    pub connections_closed: u64,
    /// Inbound frames read
    pub frames_received: u64,
    /// Inbound frames skipped by validation
    pub frames_rejected: u64,
    /// Messages delivered to their recipient
    pub messages_routed: u64,
    /// Messages echoed back to their sender
    pub echoes_sent: u64,
    /// Messages addressed to an offline user
    pub routing_misses: u64,
    /// Outbound frames dropped on a full connection buffer
    pub frames_dropped: u64,
    /// Registry entries removed after a failed write
    pub stale_purged: u64,
    /// Message log appends that failed
    pub log_failures: u64,
}
