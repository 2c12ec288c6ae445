//! UseCase: メッセージ履歴の取得と「自分だけ削除」
//!
//! リアルタイム配信を取りこぼしたクライアントは、ここで履歴を取り直します。

use std::{collections::HashMap, sync::Arc};

use crate::domain::{
    ConversationId, Message, MessageId, MessageRepository, UserId, UserProfile, UserRepository,
};

use super::error::MessageHistoryError;

/// 履歴のユースケース
pub struct MessageHistoryUseCase {
    messages: Arc<dyn MessageRepository>,
    users: Arc<dyn UserRepository>,
}

impl MessageHistoryUseCase {
    pub fn new(messages: Arc<dyn MessageRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { messages, users }
    }

    /// 閲覧者から見える会話のメッセージを送信者情報付きで返す
    pub async fn fetch(
        &self,
        conversation_id: &ConversationId,
        viewer: &UserId,
    ) -> Result<Vec<(Message, UserProfile)>, MessageHistoryError> {
        let messages = self.messages.list_messages(conversation_id, viewer).await?;

        let mut profiles: HashMap<UserId, UserProfile> = HashMap::new();
        let mut history = Vec::with_capacity(messages.len());
        for message in messages {
            let profile = match profiles.get(&message.sender) {
                Some(profile) => profile.clone(),
                None => {
                    let profile = self
                        .users
                        .find_profile(&message.sender)
                        .await?
                        .unwrap_or_else(|| UserProfile::fallback(message.sender.clone()));
                    profiles.insert(message.sender.clone(), profile.clone());
                    profile
                }
            };
            history.push((message, profile));
        }

        Ok(history)
    }

    /// 指定ユーザーに対してのみメッセージを非表示にする
    pub async fn remove_for(
        &self,
        message_id: &MessageId,
        user_id: &UserId,
    ) -> Result<(), MessageHistoryError> {
        self.messages.remove_for(message_id, user_id).await?;
        tracing::debug!("Message {} removed for '{}'", message_id, user_id);
        Ok(())
    }
}
