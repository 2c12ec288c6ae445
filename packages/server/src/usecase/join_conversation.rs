//! UseCase: 会話ルームへの参加
//!
//! 参加と同時に、本人宛ての未配信（`sent`）メッセージを `delivered` に一括更新します。
//!
//! ### 何をテストしているか
//! - JoinConversationUseCase::execute() メソッド
//! - 配信済みへの一括更新と message:status のブロードキャスト
//!
//! ### どのような状況を想定しているか
//! - 正常系：相手の未配信メッセージがある会話への参加
//! - 自分が送ったメッセージは更新対象外
//! - 更新対象が 0 件の場合はブロードキャストしない
//! - 異常系：ストレージ障害

use std::sync::Arc;

use hiroba_shared::time::Clock;

use crate::domain::{
    ConnectionId, ConversationId, MessagePusher, MessageRepository, MessageStatus,
    RoomRepository, ServerEvent, StatusFilter, Timestamp, UserId,
};

use super::error::ReconcileError;

/// 会話参加のユースケース
pub struct JoinConversationUseCase {
    rooms: Arc<dyn RoomRepository>,
    messages: Arc<dyn MessageRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl JoinConversationUseCase {
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        messages: Arc<dyn MessageRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            rooms,
            messages,
            message_pusher,
            clock,
        }
    }

    /// ルームに参加し、配信済みへの一括更新を行う
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - `delivered` に更新したメッセージ数
    /// * `Err(ReconcileError)` - 更新に失敗（参加自体は成立している）
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        user_id: &UserId,
        conversation_id: ConversationId,
    ) -> Result<usize, ReconcileError> {
        self.rooms
            .join(connection_id, conversation_id.clone())
            .await;

        let ack = ServerEvent::ConversationJoined {
            conversation_id: conversation_id.clone(),
        };
        if let Err(e) = self.message_pusher.push_to(&connection_id, &ack).await {
            tracing::warn!("Failed to acknowledge join to {}: {}", connection_id, e);
        }

        let updated = self
            .messages
            .bulk_update_status(
                &conversation_id,
                user_id,
                StatusFilter::Exactly(MessageStatus::Sent),
                MessageStatus::Delivered,
                Timestamp::new(self.clock.now_millis()),
            )
            .await?;

        if updated > 0 {
            let targets = self.rooms.members(&conversation_id).await;
            let event = ServerEvent::MessageStatusChanged {
                conversation_id: conversation_id.clone(),
                status: MessageStatus::Delivered,
            };
            if let Err(e) = self.message_pusher.broadcast(targets, &event).await {
                tracing::warn!("Failed to broadcast delivered status: {}", e);
            }
        }

        tracing::debug!(
            "User '{}' joined '{}' ({} message(s) delivered)",
            user_id,
            conversation_id,
            updated
        );

        Ok(updated)
    }
}
