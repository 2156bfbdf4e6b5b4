//! The hub task and its registry.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use spotlight_core::types::id::UserId;

use crate::connection::handle::{ConnectionHandle, ConnectionId, Delivery};
use crate::message::types::ChatMessage;
use crate::metrics::RealtimeMetrics;

use super::command::HubCommand;
use super::handle::HubHandle;

/// What happened to a routed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Queued for the recipient (and echoed to the sender when applicable).
    Delivered,
    /// The recipient has no registered connection; the message was dropped.
    Missed,
    /// The recipient's connection was dead or its outbound queue full; its
    /// entry was purged and the message lost.
    Purged,
    /// The message could not be encoded.
    Dropped,
}

/// Owns the user → connection map. Only the hub task touches it.
#[derive(Debug)]
pub struct Hub {
    /// One live connection per user.
    connections: HashMap<UserId, ConnectionHandle>,
    /// Command queue shared by every [`HubHandle`].
    commands: mpsc::UnboundedReceiver<HubCommand>,
    /// Metrics.
    metrics: Arc<RealtimeMetrics>,
}

impl Hub {
    /// Create an empty hub and a handle for submitting commands to it.
    ///
    /// At most `route_capacity` routed messages wait in the queue at once.
    pub fn new(metrics: Arc<RealtimeMetrics>, route_capacity: usize) -> (Self, HubHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let hub = Self {
            connections: HashMap::new(),
            commands: rx,
            metrics,
        };
        (hub, HubHandle::new(tx, route_capacity))
    }

    /// Process commands until shutdown or until every handle is dropped.
    pub async fn run(mut self) {
        info!("Message hub started");

        while let Some(command) = self.commands.recv().await {
            match command {
                HubCommand::Register { handle } => self.register(handle),
                HubCommand::Unregister {
                    user_id,
                    connection,
                } => {
                    self.unregister(user_id, connection);
                }
                HubCommand::Route { message, permit } => {
                    self.route(&message);
                    drop(permit);
                }
                HubCommand::IsOnline { user_id, reply } => {
                    let _ = reply.send(self.is_online(user_id));
                }
                HubCommand::OnlineUsers { reply } => {
                    let _ = reply.send(self.online_users());
                }
                HubCommand::Shutdown { reply } => {
                    let closed = self.close_all();
                    let _ = reply.send(closed);
                    break;
                }
            }
        }

        info!("Message hub stopped");
    }

    /// Install a connection, superseding any previous one for the same user.
    ///
    /// The superseded handle is dropped, not closed: its writer drains and
    /// ends, and its own session tears down the socket.
    pub fn register(&mut self, handle: ConnectionHandle) {
        let user_id = handle.user_id;
        let conn_id = handle.id;

        match self.connections.insert(user_id, handle) {
            Some(previous) => {
                info!(
                    user_id = %user_id,
                    old_conn_id = %previous.id,
                    conn_id = %conn_id,
                    "Connection superseded"
                );
            }
            None => {
                info!(user_id = %user_id, conn_id = %conn_id, "User connected");
            }
        }
    }

    /// Remove and close a user's connection.
    ///
    /// Returns `false` (and does nothing) when the user has no entry, or when
    /// `connection` names a connection other than the registered one.
    pub fn unregister(&mut self, user_id: UserId, connection: Option<ConnectionId>) -> bool {
        let Some(current) = self.connections.get(&user_id) else {
            debug!(user_id = %user_id, "Unregister for user with no connection");
            return false;
        };

        if let Some(conn_id) = connection {
            if conn_id != current.id {
                debug!(
                    user_id = %user_id,
                    conn_id = %conn_id,
                    current_conn_id = %current.id,
                    "Ignoring release from superseded connection"
                );
                return false;
            }
        }

        match self.connections.remove(&user_id) {
            Some(handle) => {
                info!(user_id = %user_id, conn_id = %handle.id, "User disconnected");
                handle.close();
                true
            }
            None => false,
        }
    }

    /// Deliver a message to its recipient, then echo it to the sender.
    ///
    /// The echo is skipped on a routing miss and for self-addressed
    /// messages. A failed echo purges the sender the same way a failed
    /// delivery purges the recipient.
    pub fn route(&mut self, message: &ChatMessage) -> RouteOutcome {
        let frame = match serde_json::to_string(message) {
            Ok(frame) => frame,
            Err(e) => {
                error!(error = %e, "Failed to serialize outbound message");
                return RouteOutcome::Dropped;
            }
        };

        let outcome = match self.write(message.to, &frame) {
            None => {
                self.metrics.routing_miss();
                debug!(
                    from = %message.from,
                    to = %message.to,
                    "Recipient offline, message dropped"
                );
                RouteOutcome::Missed
            }
            Some(Delivery::Closed | Delivery::Full) => RouteOutcome::Purged,
            Some(Delivery::Queued) => {
                self.metrics.message_routed();
                RouteOutcome::Delivered
            }
        };

        if outcome != RouteOutcome::Missed && !message.is_self_addressed() {
            if let Some(Delivery::Queued) = self.write(message.from, &frame) {
                self.metrics.echo_sent();
            }
        }

        outcome
    }

    /// Whether the user has a registered connection.
    pub fn is_online(&self, user_id: UserId) -> bool {
        self.connections.contains_key(&user_id)
    }

    /// All registered users, in ascending id order.
    pub fn online_users(&self) -> Vec<UserId> {
        let mut users: Vec<UserId> = self.connections.keys().copied().collect();
        users.sort_unstable();
        users
    }

    /// Number of registered connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Close and remove every connection. Returns how many were closed.
    pub fn close_all(&mut self) -> usize {
        let count = self.connections.len();
        for (_, handle) in self.connections.drain() {
            handle.close();
        }
        info!(count, "All connections closed");
        count
    }

    /// Write a frame to a user's connection, applying the failure policy.
    ///
    /// A closed or full connection counts as a failed write: the entry is
    /// purged and closed. Returns `None` when the user has no entry.
    fn write(&mut self, user_id: UserId, frame: &str) -> Option<Delivery> {
        let delivery = self.connections.get(&user_id)?.deliver(frame);
        if delivery == Delivery::Queued {
            return Some(delivery);
        }

        if delivery == Delivery::Full {
            self.metrics.frame_dropped();
        }
        if let Some(stale) = self.connections.remove(&user_id) {
            self.metrics.stale_purged();
            warn!(
                user_id = %user_id,
                conn_id = %stale.id,
                delivery = ?delivery,
                "Write to unresponsive connection, entry purged"
            );
            stale.close();
        }

        Some(delivery)
    }
}
