//! Top-level real-time engine that ties the hub, sessions, and metrics together.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use spotlight_core::config::RealtimeConfig;
use spotlight_core::result::AppResult;
use spotlight_core::traits::message_log::MessageLog;
use spotlight_core::types::id::UserId;

use crate::connection::handle::Outbound;
use crate::connection::session::ConnectionSession;
use crate::hub::{Hub, HubHandle};
use crate::metrics::RealtimeMetrics;

/// Central real-time engine, constructed once at startup and shared by
/// every connection handler.
pub struct RealtimeEngine {
    /// Configuration.
    config: RealtimeConfig,
    /// Handle to the hub task.
    hub: HubHandle,
    /// Durable message log.
    message_log: Arc<dyn MessageLog>,
    /// Metrics collector.
    metrics: Arc<RealtimeMetrics>,
    /// Cancelled when the engine shuts down.
    shutdown: CancellationToken,
    /// The running hub task, taken on shutdown.
    hub_task: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("config", &self.config)
            .field("shutting_down", &self.shutdown.is_cancelled())
            .finish()
    }
}

impl RealtimeEngine {
    /// Create the engine and spawn its hub task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(config: RealtimeConfig, message_log: Arc<dyn MessageLog>) -> Self {
        let metrics = Arc::new(RealtimeMetrics::new());
        let (hub, handle) = Hub::new(metrics.clone(), config.hub_queue_size);
        let hub_task = tokio::spawn(hub.run());

        info!(
            allowed_origin = %config.allowed_origin,
            buffer = config.connection_buffer_size,
            "Real-time engine initialized"
        );

        Self {
            config,
            hub: handle,
            message_log,
            metrics,
            shutdown: CancellationToken::new(),
            hub_task: Mutex::new(Some(hub_task)),
        }
    }

    /// Register a new connection for an authenticated user.
    pub fn open_session(
        &self,
        user_id: UserId,
    ) -> AppResult<(ConnectionSession, mpsc::Receiver<Outbound>)> {
        ConnectionSession::open(
            user_id,
            &self.config,
            self.hub.clone(),
            Arc::clone(&self.message_log),
            Arc::clone(&self.metrics),
        )
    }

    /// Handle to the hub
    pub fn hub(&self) -> &HubHandle {
        &self.hub
    }

    /// Real-time configuration
    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }

    /// The durable message log
    pub fn message_log(&self) -> &Arc<dyn MessageLog> {
        &self.message_log
    }

    /// Metrics collector
    pub fn metrics(&self) -> &Arc<RealtimeMetrics> {
        &self.metrics
    }

    /// A token cancelled when the engine shuts down.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Whether shutdown has begun
    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Close every connection and stop the hub. Safe to call more than once.
    pub async fn shutdown(&self) -> AppResult<()> {
        let Some(task) = self.hub_task.lock().await.take() else {
            return Ok(());
        };

        info!("Shutting down real-time engine");

        let closed = match self.hub.shutdown().await {
            Ok(closed) => closed,
            Err(e) => {
                warn!(error = %e, "Hub already stopped");
                0
            }
        };
        self.shutdown.cancel();

        if let Err(e) = task.await {
            warn!(error = %e, "Hub task ended abnormally");
        }

        info!(closed, "Real-time engine shut down");
        Ok(())
    }
}
