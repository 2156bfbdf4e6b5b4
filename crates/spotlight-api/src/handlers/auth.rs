//! Auth handlers.

use axum::Json;
use axum::extract::State;
use tracing::info;
use validator::Validate;

use spotlight_core::error::AppError;

use crate::dto::request::LoginRequest;
use crate::dto::response::{ApiResponse, LoginResponse};
use crate::error::ApiResult;
use crate::state::AppState;

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<ApiResponse<LoginResponse>>> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let user_id = state.identity.authenticate(&req.username, &req.password).await?;
    let username = state.identity.username_for_id(user_id).await?;

    info!(user_id = %user_id, "User logged in");

    Ok(Json(ApiResponse::ok(LoginResponse { user_id, username })))
}
