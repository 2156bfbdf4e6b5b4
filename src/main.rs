//! SpotLight Server — real-time direct messaging for the SpotLight feed.
//!
//! Main entry point that wires all crates together and starts the server.

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

use spotlight_api::{AppState, build_router};
use spotlight_core::config::AppConfig;
use spotlight_core::error::{AppError, ErrorKind};
use spotlight_core::traits::identity::IdentityResolver;
use spotlight_core::traits::message_log::MessageLog;
use spotlight_database::migration::run_migrations;
use spotlight_database::{DatabasePool, MessageRepository, UserRepository};
use spotlight_realtime::RealtimeEngine;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load configuration from files and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("SPOTLIGHT_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting SpotLight v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let database = DatabasePool::connect(&config.database).await?;

    if config.database.run_migrations {
        tracing::info!("Running database migrations...");
        run_migrations(database.pool()).await?;
        tracing::info!("Database migrations complete");
    }

    // ── Step 2: Repositories ─────────────────────────────────────
    let message_log: Arc<dyn MessageLog> =
        Arc::new(MessageRepository::new(database.pool().clone()));
    let identity: Arc<dyn IdentityResolver> =
        Arc::new(UserRepository::new(database.pool().clone()));

    // ── Step 3: Realtime engine ──────────────────────────────────
    let realtime = Arc::new(RealtimeEngine::new(config.realtime.clone(), message_log));

    // ── Step 4: Build and start HTTP server ──────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let state = AppState::new(
        config,
        Arc::clone(&realtime),
        identity,
        Some(database.clone()),
    );
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        AppError::with_source(ErrorKind::Internal, format!("Failed to bind {addr}"), e)
    })?;

    tracing::info!("SpotLight server listening on {}", addr);

    let shutdown_engine = Arc::clone(&realtime);
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        // Closing every WebSocket lets the graceful drain finish.
        if let Err(e) = shutdown_engine.shutdown().await {
            tracing::warn!(error = %e, "Realtime shutdown failed");
        }
    });

    // Upgraded WebSocket tasks are not tracked by the graceful drain, so
    // bound the drain once the engine has shut down.
    let drained = realtime.shutdown_token();
    let server = std::pin::pin!(server.into_future());
    tokio::select! {
        result = server => result.map_err(AppError::from)?,
        _ = async {
            drained.cancelled().await;
            tokio::time::sleep(grace).await;
        } => {
            tracing::warn!(grace_seconds = grace.as_secs(), "Graceful shutdown timed out");
        }
    }

    realtime.shutdown().await?;
    database.close().await;

    tracing::info!("SpotLight server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
