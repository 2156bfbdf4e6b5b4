//! Direct-message history handlers.

use axum::Json;
use axum::extract::{Query, State};

use spotlight_core::error::AppError;
use spotlight_core::traits::message_log::StoredMessage;

use crate::dto::request::ConversationQuery;
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::state::AppState;

/// GET /api/messages?user_a={id}&user_b={id}
pub async fn conversation(
    State(state): State<AppState>,
    Query(query): Query<ConversationQuery>,
) -> ApiResult<Json<ApiResponse<Vec<StoredMessage>>>> {
    if !query.user_a.is_valid() || !query.user_b.is_valid() {
        return Err(AppError::validation("user_a and user_b must be non-zero").into());
    }

    let messages = state
        .message_log
        .conversation(query.user_a, query.user_b)
        .await?;

    Ok(Json(ApiResponse::ok(messages)))
}
