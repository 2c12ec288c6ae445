//! サーバーからクライアントへ送るリアルタイムイベント
//!
//! ワイヤーフォーマットへの変換は Infrastructure 層の DTO が担当します。

use super::{
    entity::{Message, UserProfile},
    value_object::{ConversationId, MessageStatus, UserId},
};

/// Server → Client イベント
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// 接続直後に一度だけ送るオンラインユーザーの全量スナップショット
    PresenceList { user_ids: Vec<UserId> },
    PresenceOnline { user_id: UserId },
    PresenceOffline { user_id: UserId },
    /// join 要求への応答（要求したコネクションのみ）
    ConversationJoined { conversation_id: ConversationId },
    /// leave 要求への応答（要求したコネクションのみ）
    ConversationLeft { conversation_id: ConversationId },
    /// 送信者の表示情報を解決済みのメッセージ
    MessageReceived {
        message: Message,
        sender: UserProfile,
    },
    MessageStatusChanged {
        conversation_id: ConversationId,
        status: MessageStatus,
    },
    ConversationRead {
        conversation_id: ConversationId,
        user_id: UserId,
    },
    TypingStarted {
        conversation_id: ConversationId,
        user_id: UserId,
    },
    TypingStopped {
        conversation_id: ConversationId,
        user_id: UserId,
    },
    /// 要求元コネクションだけに返す失敗通知
    Error { code: String, message: String },
}

impl ServerEvent {
    /// ワイヤー上のイベント名
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::PresenceList { .. } => "presence:list",
            ServerEvent::PresenceOnline { .. } => "presence:online",
            ServerEvent::PresenceOffline { .. } => "presence:offline",
            ServerEvent::ConversationJoined { .. } => "chat:join",
            ServerEvent::ConversationLeft { .. } => "chat:leave",
            ServerEvent::MessageReceived { .. } => "message:receive",
            ServerEvent::MessageStatusChanged { .. } => "message:status",
            ServerEvent::ConversationRead { .. } => "chat:read",
            ServerEvent::TypingStarted { .. } => "typing:start",
            ServerEvent::TypingStopped { .. } => "typing:stop",
            ServerEvent::Error { .. } => "error",
        }
    }
}
