//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

use super::websocket::MessageDto;

/// `GET /api/presence`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceDto {
    pub user_ids: Vec<String>,
}

/// `GET /api/conversations/{conversation_id}/messages`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageHistoryDto {
    pub conversation_id: String,
    pub messages: Vec<MessageDto>,
}

/// Error body for HTTP endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponseDto {
    pub code: String,
    pub message: String,
}
