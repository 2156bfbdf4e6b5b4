//! Cloneable handle for submitting commands to the hub.

use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc, oneshot};

use spotlight_core::error::AppError;
use spotlight_core::result::AppResult;
use spotlight_core::types::id::UserId;

use crate::connection::handle::{ConnectionHandle, ConnectionId};
use crate::message::types::ChatMessage;

use super::command::HubCommand;

/// Submits commands to the hub task.
///
/// Submission never blocks. Every method fails with
/// `ServiceUnavailable` once the hub has stopped.
///
/// Routed messages are bounded by a fixed number of queue slots. Control
/// commands are not, as there is at most one register and one release per
/// connection.
#[derive(Debug, Clone)]
pub struct HubHandle {
    commands: mpsc::UnboundedSender<HubCommand>,
    route_slots: Arc<Semaphore>,
}

impl HubHandle {
    pub(crate) fn new(commands: mpsc::UnboundedSender<HubCommand>, route_capacity: usize) -> Self {
        Self {
            commands,
            route_slots: Arc::new(Semaphore::new(route_capacity.max(1))),
        }
    }

    /// Install or replace the connection for `handle.user_id`.
    pub fn register(&self, handle: ConnectionHandle) -> AppResult<()> {
        self.submit(HubCommand::Register { handle })
    }

    /// Remove and close whatever connection the user has registered.
    pub fn unregister(&self, user_id: UserId) -> AppResult<()> {
        self.submit(HubCommand::Unregister {
            user_id,
            connection: None,
        })
    }

    /// Remove the user's entry only if it is still `connection`.
    pub fn release(&self, user_id: UserId, connection: ConnectionId) -> AppResult<()> {
        self.submit(HubCommand::Unregister {
            user_id,
            connection: Some(connection),
        })
    }

    /// Queue a validated message for routing.
    ///
    /// Returns `false` without queuing when every routing slot is taken.
    pub fn route(&self, message: ChatMessage) -> AppResult<bool> {
        if self.is_closed() {
            return Err(Self::stopped());
        }
        let Ok(permit) = Arc::clone(&self.route_slots).try_acquire_owned() else {
            return Ok(false);
        };
        self.submit(HubCommand::Route { message, permit })?;
        Ok(true)
    }

    /// Whether the user currently has a registered connection.
    pub async fn is_online(&self, user_id: UserId) -> AppResult<bool> {
        let (reply, rx) = oneshot::channel();
        self.submit(HubCommand::IsOnline { user_id, reply })?;
        rx.await.map_err(|_| Self::stopped())
    }

    /// All users with a registered connection, in ascending id order.
    pub async fn online_users(&self) -> AppResult<Vec<UserId>> {
        let (reply, rx) = oneshot::channel();
        self.submit(HubCommand::OnlineUsers { reply })?;
        rx.await.map_err(|_| Self::stopped())
    }

    /// Close every connection and stop the hub. Returns the number closed.
    pub async fn shutdown(&self) -> AppResult<usize> {
        let (reply, rx) = oneshot::channel();
        self.submit(HubCommand::Shutdown { reply })?;
        rx.await.map_err(|_| Self::stopped())
    }

    /// Whether the hub task has stopped.
    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    fn submit(&self, command: HubCommand) -> AppResult<()> {
        self.commands.send(command).map_err(|_| Self::stopped())
    }

    fn stopped() -> AppError {
        AppError::service_unavailable("Message hub is not running")
    }
}
