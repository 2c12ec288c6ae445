//! WebSocket event DTOs.
//!
//! Every frame is a JSON envelope `{"event": "<name>", "data": {...}}`.

use serde::{Deserialize, Serialize};

/// Client → Server events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEventDto {
    #[serde(rename = "chat:join")]
    ChatJoin(ConversationPayload),
    #[serde(rename = "chat:leave")]
    ChatLeave(ConversationPayload),
    #[serde(rename = "chat:read")]
    ChatRead(ConversationPayload),
    #[serde(rename = "message:send")]
    MessageSend(MessageSendPayload),
    #[serde(rename = "typing:start")]
    TypingStart(TypingPayload),
    #[serde(rename = "typing:stop")]
    TypingStop(TypingPayload),
}

/// Server → Client events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEventDto {
    #[serde(rename = "presence:list")]
    PresenceList(PresenceListPayload),
    #[serde(rename = "presence:online")]
    PresenceOnline(UserPayload),
    #[serde(rename = "presence:offline")]
    PresenceOffline(UserPayload),
    #[serde(rename = "chat:join")]
    ChatJoin(ConversationPayload),
    #[serde(rename = "chat:leave")]
    ChatLeave(ConversationPayload),
    #[serde(rename = "chat:read")]
    ChatRead(ConversationUserPayload),
    #[serde(rename = "message:receive")]
    MessageReceive(MessageReceivePayload),
    #[serde(rename = "message:status")]
    MessageStatus(MessageStatusPayload),
    #[serde(rename = "typing:start")]
    TypingStart(ConversationUserPayload),
    #[serde(rename = "typing:stop")]
    TypingStop(ConversationUserPayload),
    #[serde(rename = "error")]
    Error(ErrorPayload),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationPayload {
    pub conversation_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSendPayload {
    pub conversation_id: String,
    pub content: String,
    #[serde(default, alias = "isForwarded")]
    pub forwarded: bool,
}

/// Typing payload sent by clients. `user_id` is accepted but the server
/// always relays the authenticated identity instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingPayload {
    pub conversation_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceListPayload {
    pub user_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationUserPayload {
    pub conversation_id: String,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SenderDto {
    pub id: String,
    pub name: String,
    pub avatar: Option<String>,
}

/// Fully-resolved message (sender display identity embedded)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: String,
    pub sender: SenderDto,
    pub conversation_id: String,
    pub content: String,
    pub status: String,
    /// RFC 3339 (UTC)
    pub created_at: String,
    /// RFC 3339 (UTC)
    pub updated_at: String,
    pub is_forwarded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageReceivePayload {
    pub message: MessageDto,
    pub conversation_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageStatusPayload {
    pub conversation_id: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
}
