//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
};

use crate::{
    domain::{ConversationId, MessageId, UserId},
    infrastructure::dto::{
        http::{ErrorResponseDto, MessageHistoryDto, PresenceDto},
        websocket::MessageDto,
    },
    ui::state::AppState,
    usecase::{ErrorCode, MessageHistoryError},
};

use super::bearer_token;

type ErrorResponse = (StatusCode, Json<ErrorResponseDto>);

fn error_response(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> ErrorResponse {
    (
        status,
        Json(ErrorResponseDto {
            code: code.as_str().to_string(),
            message: message.into(),
        }),
    )
}

/// Resolve the caller from the `Authorization: Bearer` header
fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<UserId, ErrorResponse> {
    let token = bearer_token(headers);
    state
        .connect_user_usecase
        .authenticate(token.as_deref())
        .map_err(|e| error_response(StatusCode::UNAUTHORIZED, e.code(), e.to_string()))
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Users with at least one live connection
pub async fn get_presence(State(state): State<Arc<AppState>>) -> Json<PresenceDto> {
    let user_ids = state
        .get_presence_usecase
        .list_online()
        .await
        .into_iter()
        .map(UserId::into_string)
        .collect();

    Json(PresenceDto { user_ids })
}

/// Message history visible to the caller
pub async fn get_messages(
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<MessageHistoryDto>, ErrorResponse> {
    let viewer = authenticate(&state, &headers)?;
    let conversation_id = ConversationId::new(conversation_id).map_err(|e| {
        error_response(StatusCode::BAD_REQUEST, ErrorCode::InvalidPayload, e.to_string())
    })?;

    let history = state
        .message_history_usecase
        .fetch(&conversation_id, &viewer)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch history of '{}': {}", conversation_id, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.code(), e.to_string())
        })?;

    // Domain Model から DTO への変換
    let messages = history
        .iter()
        .map(|(message, sender)| MessageDto::from_domain(message, sender))
        .collect();

    Ok(Json(MessageHistoryDto {
        conversation_id: conversation_id.into_string(),
        messages,
    }))
}

/// Hide a message for the caller only
pub async fn delete_message(
    State(state): State<Arc<AppState>>,
    Path(message_id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, ErrorResponse> {
    let user_id = authenticate(&state, &headers)?;
    let message_id = MessageId::new(message_id).map_err(|e| {
        error_response(StatusCode::BAD_REQUEST, ErrorCode::InvalidPayload, e.to_string())
    })?;

    match state
        .message_history_usecase
        .remove_for(&message_id, &user_id)
        .await
    {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e @ MessageHistoryError::MessageNotFound(_)) => Err(error_response(
            StatusCode::NOT_FOUND,
            e.code(),
            e.to_string(),
        )),
        Err(e) => {
            tracing::error!("Failed to remove message {}: {}", message_id, e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                e.code(),
                e.to_string(),
            ))
        }
    }
}
