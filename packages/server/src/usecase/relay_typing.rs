//! UseCase: 入力中インジケーターの中継
//!
//! 永続化は行わず、ルームのメンバーにそのまま中継します。
//! ユーザー ID はクライアントの申告ではなく、認証済みのセッションのものを使います。

use std::sync::Arc;

use crate::domain::{
    ConnectionId, ConversationId, MessagePusher, RoomRepository, ServerEvent, UserId,
};

/// 入力中通知の中継ユースケース
pub struct RelayTypingUseCase {
    rooms: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl RelayTypingUseCase {
    pub fn new(rooms: Arc<dyn RoomRepository>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            rooms,
            message_pusher,
        }
    }

    /// 入力開始を中継し、送れたコネクション数を返す
    pub async fn start(&self, conversation_id: ConversationId, user_id: UserId) -> usize {
        let targets = self.rooms.members(&conversation_id).await;
        self.relay(
            targets,
            ServerEvent::TypingStarted {
                conversation_id,
                user_id,
            },
        )
        .await
    }

    /// 入力終了を中継し、送れたコネクション数を返す
    pub async fn stop(&self, conversation_id: ConversationId, user_id: UserId) -> usize {
        let targets = self.rooms.members(&conversation_id).await;
        self.relay(
            targets,
            ServerEvent::TypingStopped {
                conversation_id,
                user_id,
            },
        )
        .await
    }

    async fn relay(&self, targets: Vec<ConnectionId>, event: ServerEvent) -> usize {
        match self.message_pusher.broadcast(targets, &event).await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!("Failed to relay {}: {}", event.name(), e);
                0
            }
        }
    }
}
