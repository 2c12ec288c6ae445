//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! `RoomMembership` エンティティをそのままストレージとして保持します。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, ConversationId, RoomMembership, RoomRepository};

/// インメモリ Room Repository 実装
#[derive(Default)]
pub struct InMemoryRoomRepository {
    membership: Arc<Mutex<RoomMembership>>,
}

impl InMemoryRoomRepository {
    pub fn new(membership: Arc<Mutex<RoomMembership>>) -> Self {
        Self { membership }
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn join(&self, connection_id: ConnectionId, conversation_id: ConversationId) -> bool {
        let mut membership = self.membership.lock().await;
        membership.join(connection_id, conversation_id)
    }

    async fn leave(&self, connection_id: ConnectionId, conversation_id: ConversationId) -> bool {
        let mut membership = self.membership.lock().await;
        membership.leave(connection_id, conversation_id)
    }

    async fn leave_all(&self, connection_id: ConnectionId) -> Vec<ConversationId> {
        let mut membership = self.membership.lock().await;
        membership.leave_all(connection_id)
    }

    async fn members(&self, conversation_id: &ConversationId) -> Vec<ConnectionId> {
        let membership = self.membership.lock().await;
        membership.members(conversation_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - InMemoryRoomRepository が RoomMembership に正しく委譲すること
    // - 共有された RoomMembership に変更が反映されること
    //
    // 【どのようなシナリオをテストするか】
    // 1. join → members に反映
    // 2. leave_all → 全ルームから退出
    // ========================================

    fn conversation(id: &str) -> ConversationId {
        ConversationId::new(id.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_join_and_members() {
        // テスト項目: join したコネクションが members に含まれる
        // given (前提条件):
        let membership = Arc::new(Mutex::new(RoomMembership::new()));
        let repo = InMemoryRoomRepository::new(membership.clone());
        let connection = ConnectionId::generate();

        // when (操作):
        let joined = repo.join(connection, conversation("c1")).await;

        // then (期待する結果):
        assert!(joined);
        assert_eq!(repo.members(&conversation("c1")).await, vec![connection]);
        assert!(membership.lock().await.is_member(&connection, &conversation("c1")));
    }

    #[tokio::test]
    async fn test_leave_all() {
        // テスト項目: leave_all で全ルームから退出する
        // given (前提条件):
        let repo = InMemoryRoomRepository::default();
        let connection = ConnectionId::generate();
        repo.join(connection, conversation("c1")).await;
        repo.join(connection, conversation("c2")).await;

        // when (操作):
        let left = repo.leave_all(connection).await;

        // then (期待する結果):
        assert_eq!(left.len(), 2);
        assert!(repo.members(&conversation("c1")).await.is_empty());
        assert!(!repo.leave(connection, conversation("c1")).await);
    }
}
