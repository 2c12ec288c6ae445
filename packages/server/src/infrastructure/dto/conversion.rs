//! Conversion logic between domain models and DTOs.

use hiroba_shared::time::timestamp_to_rfc3339;

use crate::domain::{Message, ServerEvent, UserProfile};
use crate::infrastructure::dto::websocket as dto;

// ========================================
// Domain → DTO
// ========================================

impl From<&UserProfile> for dto::SenderDto {
    fn from(profile: &UserProfile) -> Self {
        Self {
            id: profile.id.as_str().to_string(),
            name: profile.name.clone(),
            avatar: profile.avatar.clone(),
        }
    }
}

impl dto::MessageDto {
    pub fn from_domain(message: &Message, sender: &UserProfile) -> Self {
        Self {
            id: message.id.as_str().to_string(),
            sender: sender.into(),
            conversation_id: message.conversation_id.as_str().to_string(),
            content: message.content.as_str().to_string(),
            status: message.status.as_str().to_string(),
            created_at: timestamp_to_rfc3339(message.created_at.value()),
            updated_at: timestamp_to_rfc3339(message.updated_at.value()),
            is_forwarded: message.forwarded,
        }
    }
}

impl From<&ServerEvent> for dto::ServerEventDto {
    fn from(event: &ServerEvent) -> Self {
        match event {
            ServerEvent::PresenceList { user_ids } => {
                Self::PresenceList(dto::PresenceListPayload {
                    user_ids: user_ids.iter().map(|id| id.as_str().to_string()).collect(),
                })
            }
            ServerEvent::PresenceOnline { user_id } => Self::PresenceOnline(dto::UserPayload {
                user_id: user_id.as_str().to_string(),
            }),
            ServerEvent::PresenceOffline { user_id } => Self::PresenceOffline(dto::UserPayload {
                user_id: user_id.as_str().to_string(),
            }),
            ServerEvent::ConversationJoined { conversation_id } => {
                Self::ChatJoin(dto::ConversationPayload {
                    conversation_id: conversation_id.as_str().to_string(),
                })
            }
            ServerEvent::ConversationLeft { conversation_id } => {
                Self::ChatLeave(dto::ConversationPayload {
                    conversation_id: conversation_id.as_str().to_string(),
                })
            }
            ServerEvent::MessageReceived { message, sender } => {
                Self::MessageReceive(dto::MessageReceivePayload {
                    message: dto::MessageDto::from_domain(message, sender),
                    conversation_id: message.conversation_id.as_str().to_string(),
                })
            }
            ServerEvent::MessageStatusChanged {
                conversation_id,
                status,
            } => Self::MessageStatus(dto::MessageStatusPayload {
                conversation_id: conversation_id.as_str().to_string(),
                status: status.as_str().to_string(),
            }),
            ServerEvent::ConversationRead {
                conversation_id,
                user_id,
            } => Self::ChatRead(conversation_user(conversation_id.as_str(), user_id.as_str())),
            ServerEvent::TypingStarted {
                conversation_id,
                user_id,
            } => Self::TypingStart(conversation_user(conversation_id.as_str(), user_id.as_str())),
            ServerEvent::TypingStopped {
                conversation_id,
                user_id,
            } => Self::TypingStop(conversation_user(conversation_id.as_str(), user_id.as_str())),
            ServerEvent::Error { code, message } => Self::Error(dto::ErrorPayload {
                code: code.clone(),
                message: message.clone(),
            }),
        }
    }
}

fn conversation_user(conversation_id: &str, user_id: &str) -> dto::ConversationUserPayload {
    dto::ConversationUserPayload {
        conversation_id: conversation_id.to_string(),
        user_id: user_id.to_string(),
    }
}

/// Encode a domain event into the JSON frame sent over the wire.
pub fn encode_server_event(event: &ServerEvent) -> Result<String, serde_json::Error> {
    serde_json::to_string(&dto::ServerEventDto::from(event))
}
