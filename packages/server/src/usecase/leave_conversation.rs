//! UseCase: 会話ルームからの退出

use std::sync::Arc;

use crate::domain::{ConnectionId, ConversationId, MessagePusher, RoomRepository, ServerEvent};

/// 会話退出のユースケース
pub struct LeaveConversationUseCase {
    rooms: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl LeaveConversationUseCase {
    pub fn new(rooms: Arc<dyn RoomRepository>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            rooms,
            message_pusher,
        }
    }

    /// ルームから退出し、要求元に chat:leave を返す
    ///
    /// 参加していないルームからの退出も成功として扱う。
    pub async fn execute(&self, connection_id: ConnectionId, conversation_id: ConversationId) -> bool {
        let left = self
            .rooms
            .leave(connection_id, conversation_id.clone())
            .await;

        let ack = ServerEvent::ConversationLeft { conversation_id };
        if let Err(e) = self.message_pusher.push_to(&connection_id, &ack).await {
            tracing::warn!("Failed to acknowledge leave to {}: {}", connection_id, e);
        }

        left
    }
}
