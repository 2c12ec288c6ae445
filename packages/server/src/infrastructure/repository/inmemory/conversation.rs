//! InMemory Conversation Repository 実装

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConversationId, ConversationRepository, MessageId, RepositoryError, Timestamp};

/// 会話ごとの最新メッセージと更新時刻
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestMessage {
    pub message_id: MessageId,
    pub updated_at: Timestamp,
}

#[derive(Default)]
pub struct InMemoryConversationRepository {
    latest: Arc<Mutex<HashMap<ConversationId, LatestMessage>>>,
}

impl InMemoryConversationRepository {
    pub fn new(latest: Arc<Mutex<HashMap<ConversationId, LatestMessage>>>) -> Self {
        Self { latest }
    }

    /// 最新メッセージと会話の更新時刻の組を取得
    pub async fn latest_entry(&self, conversation_id: &ConversationId) -> Option<LatestMessage> {
        let latest = self.latest.lock().await;
        latest.get(conversation_id).cloned()
    }
}

#[async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn set_latest_message(
        &self,
        conversation_id: &ConversationId,
        message_id: &MessageId,
        updated_at: Timestamp,
    ) -> Result<(), RepositoryError> {
        let mut latest = self.latest.lock().await;
        latest.insert(
            conversation_id.clone(),
            LatestMessage {
                message_id: message_id.clone(),
                updated_at,
            },
        );
        Ok(())
    }

    async fn latest_message(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Option<MessageId>, RepositoryError> {
        let latest = self.latest.lock().await;
        Ok(latest.get(conversation_id).map(|entry| entry.message_id.clone()))
    }
}
