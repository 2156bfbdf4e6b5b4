//! Health check handlers.

use axum::Json;
use axum::extract::State;
use tracing::warn;

use crate::dto::response::{ApiResponse, DetailedHealthResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    }))
}

/// GET /api/health/detailed
pub async fn health_detailed(
    State(state): State<AppState>,
) -> Json<ApiResponse<DetailedHealthResponse>> {
    let mut healthy = true;

    let database = match &state.database {
        Some(pool) => match pool.health_check().await {
            Ok(true) => "connected",
            Ok(false) | Err(_) => {
                healthy = false;
                "disconnected"
            }
        },
        None => "not_configured",
    };

    let online_users = match state.realtime.hub().online_users().await {
        Ok(users) => users.len(),
        Err(e) => {
            warn!(error = %e, "Hub did not answer health query");
            healthy = false;
            0
        }
    };

    Json(ApiResponse::ok(DetailedHealthResponse {
        status: if healthy { "ok" } else { "degraded" }.to_string(),
        database: database.to_string(),
        online_users,
        shutting_down: state.realtime.is_shutting_down(),
        realtime: state.realtime.metrics().snapshot(),
    }))
}
