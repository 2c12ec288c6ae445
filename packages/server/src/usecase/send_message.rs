//! UseCase: メッセージ送信処理
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - 永続化 → 会話の最新メッセージ更新 → 送信者情報の解決 → ルームへの配信 の順序
//!
//! ### どのような状況を想定しているか
//! - 正常系：ルームのメンバー全員（送信者自身を含む）に message:receive が届く
//! - 異常系：空・長すぎる本文は永続化せずに INVALID_PAYLOAD
//! - 異常系：永続化に失敗した場合は何も配信しない
//! - 異常系：保存後の最新メッセージ更新に失敗した場合は、保存済みの ID をエラーで返す
//! - エッジケース：プロフィール未登録の送信者は ID を表示名にする

use std::sync::Arc;

use hiroba_shared::time::Clock;

use crate::domain::{
    ConversationId, ConversationRepository, Message, MessageContent, MessagePusher,
    MessageRepository, RoomRepository, ServerEvent, Timestamp, UserId, UserProfile,
    UserRepository,
};

use super::error::SendMessageError;

/// 送信結果
#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub message: Message,
    pub sender: UserProfile,
    /// message:receive を実際に送れたコネクション数
    pub delivered_to: usize,
}

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    messages: Arc<dyn MessageRepository>,
    conversations: Arc<dyn ConversationRepository>,
    users: Arc<dyn UserRepository>,
    rooms: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
    pub fn new(
        messages: Arc<dyn MessageRepository>,
        conversations: Arc<dyn ConversationRepository>,
        users: Arc<dyn UserRepository>,
        rooms: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            messages,
            conversations,
            users,
            rooms,
            message_pusher,
            clock,
        }
    }

    /// メッセージを永続化し、会話ルームに配信する
    ///
    /// 配信はメッセージの永続化が完了してから行う。永続化に失敗した場合は配信しない。
    /// ルームに誰もいない場合でも永続化は成功として扱う（履歴取得で補完される）。
    pub async fn execute(
        &self,
        sender_id: UserId,
        conversation_id: ConversationId,
        content: String,
        forwarded: bool,
    ) -> Result<SentMessage, SendMessageError> {
        // 1. 本文の検証
        let content = MessageContent::new(content)
            .map_err(|e| SendMessageError::InvalidPayload(e.to_string()))?;

        // 2. 永続化（status = sent）
        let now = Timestamp::new(self.clock.now_millis());
        let message = self
            .messages
            .create_message(
                conversation_id.clone(),
                sender_id.clone(),
                content,
                forwarded,
                now,
            )
            .await?;

        // 3. 会話の最新メッセージを更新
        if let Err(source) = self
            .conversations
            .set_latest_message(&conversation_id, &message.id, message.created_at)
            .await
        {
            return Err(SendMessageError::StoredNotDelivered {
                message_id: message.id,
                source,
            });
        }

        // 4. 送信者の表示情報を解決
        let sender = self.resolve_sender(&sender_id).await;

        // 5. 配信（送信時点のルームメンバーのスナップショット）
        let targets = self.rooms.members(&conversation_id).await;
        if targets.is_empty() {
            tracing::debug!(
                "No live members in '{}'; message {} is stored only",
                conversation_id,
                message.id
            );
        }
        let event = ServerEvent::MessageReceived {
            message: message.clone(),
            sender: sender.clone(),
        };
        let delivered_to = match self.message_pusher.broadcast(targets, &event).await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!("Failed to broadcast message {}: {}", message.id, e);
                0
            }
        };

        tracing::info!(
            "Message {} from '{}' in '{}' delivered to {} connection(s)",
            message.id,
            sender_id,
            conversation_id,
            delivered_to
        );

        Ok(SentMessage {
            message,
            sender,
            delivered_to,
        })
    }

    async fn resolve_sender(&self, sender_id: &UserId) -> UserProfile {
        match self.users.find_profile(sender_id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => UserProfile::fallback(sender_id.clone()),
            Err(e) => {
                tracing::warn!("Failed to load profile of '{}': {}", sender_id, e);
                UserProfile::fallback(sender_id.clone())
            }
        }
    }
}
