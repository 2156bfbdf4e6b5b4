//! Commands consumed by the hub task.

use tokio::sync::{OwnedSemaphorePermit, oneshot};

use spotlight_core::types::id::UserId;

use crate::connection::handle::{ConnectionHandle, ConnectionId};
use crate::message::types::ChatMessage;

/// A request queued to the hub. Processed strictly in arrival order.
#[derive(Debug)]
pub enum HubCommand {
    /// Install or replace the connection for a user.
    Register {
        /// The new connection.
        handle: ConnectionHandle,
    },
    /// Remove and close a user's connection.
    ///
    /// With `connection` set, only that specific connection is removed, so a
    /// superseded session cannot evict its replacement.
    Unregister {
        /// User to remove.
        user_id: UserId,
        /// Connection the caller owns, if any.
        connection: Option<ConnectionId>,
    },
    /// Deliver a message to its recipient and echo it to the sender.
    Route {
        /// Validated message.
        message: ChatMessage,
        /// Routing queue slot, released once the hub has handled the message.
        permit: OwnedSemaphorePermit,
    },
    /// Whether a user currently has a registered connection.
    IsOnline {
        /// User to look up.
        user_id: UserId,
        /// Reply channel.
        reply: oneshot::Sender<bool>,
    },
    /// All users with a registered connection.
    OnlineUsers {
        /// Reply channel.
        reply: oneshot::Sender<Vec<UserId>>,
    },
    /// Close every connection and stop the hub.
    Shutdown {
        /// Receives the number of connections closed.
        reply: oneshot::Sender<usize>,
    },
}
