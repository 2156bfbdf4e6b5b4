//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use spotlight_core::config::AppConfig;
use spotlight_core::traits::identity::IdentityResolver;
use spotlight_core::traits::message_log::MessageLog;
use spotlight_database::DatabasePool;
use spotlight_realtime::RealtimeEngine;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are cheap to clone across tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// WebSocket realtime engine
    pub realtime: Arc<RealtimeEngine>,
    /// Identity resolution (login, username lookup)
    pub identity: Arc<dyn IdentityResolver>,
    /// Durable direct-message log
    pub message_log: Arc<dyn MessageLog>,
    /// PostgreSQL pool, absent when running against in-memory collaborators
    pub database: Option<DatabasePool>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("realtime", &self.realtime)
            .field("database", &self.database.is_some())
            .finish()
    }
}

impl AppState {
    /// Assemble the state. The message log is shared with the realtime engine.
    pub fn new(
        config: AppConfig,
        realtime: Arc<RealtimeEngine>,
        identity: Arc<dyn IdentityResolver>,
        database: Option<DatabasePool>,
    ) -> Self {
        let message_log = Arc::clone(realtime.message_log());
        Self {
            config: Arc::new(config),
            realtime,
            identity,
            message_log,
            database,
            started_at: Instant::now(),
        }
    }
}
