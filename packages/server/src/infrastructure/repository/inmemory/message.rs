//! InMemory Message Repository 実装
//!
//! メッセージを作成順に Vec で保持します。ステータスの真の値はここだけにあり、
//! 呼び出し側でキャッシュしません。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ConversationId, Message, MessageContent, MessageId, MessageRepository, MessageStatus,
    RepositoryError, StatusFilter, Timestamp, UserId,
};

#[derive(Default)]
pub struct InMemoryMessageRepository {
    messages: Arc<Mutex<Vec<Message>>>,
}

impl InMemoryMessageRepository {
    pub fn new(messages: Arc<Mutex<Vec<Message>>>) -> Self {
        Self { messages }
    }

    /// ID でメッセージを取得（非表示設定は考慮しない）
    pub async fn find(&self, message_id: &MessageId) -> Option<Message> {
        let messages = self.messages.lock().await;
        messages.iter().find(|m| &m.id == message_id).cloned()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn create_message(
        &self,
        conversation_id: ConversationId,
        sender: UserId,
        content: MessageContent,
        forwarded: bool,
        created_at: Timestamp,
    ) -> Result<Message, RepositoryError> {
        let message = Message::new(
            MessageId::generate(),
            conversation_id,
            sender,
            content,
            forwarded,
            created_at,
        );

        let mut messages = self.messages.lock().await;
        messages.push(message.clone());
        Ok(message)
    }

    async fn bulk_update_status(
        &self,
        conversation_id: &ConversationId,
        exclude_sender: &UserId,
        filter: StatusFilter,
        to: MessageStatus,
        updated_at: Timestamp,
    ) -> Result<usize, RepositoryError> {
        let mut messages = self.messages.lock().await;

        let updated = messages
            .iter_mut()
            .filter(|m| &m.conversation_id == conversation_id)
            .filter(|m| &m.sender != exclude_sender)
            .filter(|m| filter.matches(m.status))
            .map(|m| m.advance_status(to, updated_at))
            .filter(|changed| *changed)
            .count();

        Ok(updated)
    }

    async fn list_messages(
        &self,
        conversation_id: &ConversationId,
        viewer: &UserId,
    ) -> Result<Vec<Message>, RepositoryError> {
        let messages = self.messages.lock().await;
        Ok(messages
            .iter()
            .filter(|m| &m.conversation_id == conversation_id && m.is_visible_to(viewer))
            .cloned()
            .collect())
    }

    async fn remove_for(
        &self,
        message_id: &MessageId,
        user_id: &UserId,
    ) -> Result<(), RepositoryError> {
        let mut messages = self.messages.lock().await;
        let message = messages
            .iter_mut()
            .find(|m| &m.id == message_id)
            .ok_or_else(|| RepositoryError::MessageNotFound(message_id.to_string()))?;
        message.removed_for.insert(user_id.clone());
        Ok(())
    }
}
