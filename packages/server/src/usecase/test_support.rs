//! UseCase のテストで共有するテストダブル

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    domain::{
        ConnectionId, ConversationId, MessagePushError, MessagePusher, PusherChannel,
        ServerEvent, UserId,
    },
    infrastructure::repository::{
        InMemoryConnectionRepository, InMemoryConversationRepository, InMemoryMessageRepository,
        InMemoryRoomRepository, InMemoryUserRepository,
    },
};

/// 送信されたイベント
#[derive(Debug, Clone, PartialEq)]
pub enum Pushed {
    To(ConnectionId, ServerEvent),
    Broadcast(Vec<ConnectionId>, ServerEvent),
}

/// 送信内容を記録するだけの MessagePusher
#[derive(Default)]
pub struct RecordingPusher {
    pushed: Mutex<Vec<Pushed>>,
}

impl RecordingPusher {
    pub async fn pushed(&self) -> Vec<Pushed> {
        self.pushed.lock().await.clone()
    }

    /// 指定コネクションが受け取ったイベント（個別送信とブロードキャストの両方）
    pub async fn received_by(&self, connection_id: &ConnectionId) -> Vec<ServerEvent> {
        self.pushed
            .lock()
            .await
            .iter()
            .filter_map(|pushed| match pushed {
                Pushed::To(target, event) if target == connection_id => Some(event.clone()),
                Pushed::Broadcast(targets, event) if targets.contains(connection_id) => {
                    Some(event.clone())
                }
                _ => None,
            })
            .collect()
    }

    /// 指定名のイベントのブロードキャスト
    pub async fn broadcasts_named(&self, name: &str) -> Vec<(Vec<ConnectionId>, ServerEvent)> {
        self.pushed
            .lock()
            .await
            .iter()
            .filter_map(|pushed| match pushed {
                Pushed::Broadcast(targets, event) if event.name() == name => {
                    Some((targets.clone(), event.clone()))
                }
                _ => None,
            })
            .collect()
    }

    pub async fn clear(&self) {
        self.pushed.lock().await.clear();
    }
}

#[async_trait]
impl MessagePusher for RecordingPusher {
    async fn register_connection(&self, _connection_id: ConnectionId, _sender: PusherChannel) {}

    async fn unregister_connection(&self, _connection_id: &ConnectionId) {}

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        event: &ServerEvent,
    ) -> Result<(), MessagePushError> {
        self.pushed
            .lock()
            .await
            .push(Pushed::To(*connection_id, event.clone()));
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        event: &ServerEvent,
    ) -> Result<usize, MessagePushError> {
        let delivered = targets.len();
        self.pushed
            .lock()
            .await
            .push(Pushed::Broadcast(targets, event.clone()));
        Ok(delivered)
    }
}

/// テスト用のインメモリ依存一式
#[derive(Default)]
pub struct TestDeps {
    pub connections: Arc<InMemoryConnectionRepository>,
    pub rooms: Arc<InMemoryRoomRepository>,
    pub messages: Arc<InMemoryMessageRepository>,
    pub conversations: Arc<InMemoryConversationRepository>,
    pub users: Arc<InMemoryUserRepository>,
    pub pusher: Arc<RecordingPusher>,
}

pub fn user(id: &str) -> UserId {
    UserId::new(id.to_string()).unwrap()
}

pub fn conversation(id: &str) -> ConversationId {
    ConversationId::new(id.to_string()).unwrap()
}
