//! UseCase: 会話の既読処理
//!
//! ### 何をテストしているか
//! - MarkConversationReadUseCase::execute() メソッド
//! - 相手のメッセージの既読化と chat:read のブロードキャスト
//!
//! ### どのような状況を想定しているか
//! - 正常系：sent / delivered のメッセージが read になる
//! - 冪等性：2 回目は更新 0 件だが chat:read は送る
//! - グループ：後から読んだメンバーの既読も通知される
//! - 異常系：ストレージ障害

use std::sync::Arc;

use hiroba_shared::time::Clock;

use crate::domain::{
    ConversationId, MessagePusher, MessageRepository, MessageStatus, RoomRepository,
    ServerEvent, StatusFilter, Timestamp, UserId,
};

use super::error::ReconcileError;

/// 既読処理のユースケース
pub struct MarkConversationReadUseCase {
    rooms: Arc<dyn RoomRepository>,
    messages: Arc<dyn MessageRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl MarkConversationReadUseCase {
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

    /// 読者以外が送った未読メッセージを全て read にする
    ///
    /// 更新件数に関わらず、ルームに chat:read を送る。
    /// 既に read のメッセージはそのままなので、グループでは後続の読者の既読もここで通知される。
    pub async fn execute(
        &self,
        reader: &UserId,
        conversation_id: &ConversationId,
    ) -> Result<usize, ReconcileError> {
        let updated = self
            .messages
            .bulk_update_status(
                conversation_id,
                reader,
                StatusFilter::Not(MessageStatus::Read),
                MessageStatus::Read,
                Timestamp::new(self.clock.now_millis()),
            )
            .await?;

        let targets = self.rooms.members(conversation_id).await;
        let event = ServerEvent::ConversationRead {
            conversation_id: conversation_id.clone(),
            user_id: reader.clone(),
        };
        if let Err(e) = self.message_pusher.broadcast(targets, &event).await {
            tracing::warn!("Failed to broadcast chat:read: {}", e);
        }

        tracing::debug!(
            "User '{}' read '{}' ({} message(s) updated)",
            reader,
            conversation_id,
            updated
        );

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{ConnectionId, MessageContent, MockMessageRepository, RepositoryError},
        usecase::test_support::{TestDeps, conversation, user},
    };
    use hiroba_shared::time::FixedClock;

    fn create_usecase(deps: &TestDeps) -> MarkConversationReadUseCase {
        MarkConversationReadUseCase::new(
            deps.rooms.clone(),
            deps.messages.clone(),
            deps.pusher.clone(),
            Arc::new(FixedClock::new(3_000)),
        )
    }

    async fn seed(deps: &TestDeps, sender: &str) {
        deps.messages
            .create_message(
                conversation("c1"),
                user(sender),
                MessageContent::new("hello".to_string()).unwrap(),
                false,
                Timestamp::new(1_000),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_mark_read_updates_and_broadcasts() {
        // テスト項目: 相手のメッセージが read になり、ルームに chat:read が届く
        // given (前提条件):
        let deps = TestDeps::default();
        let usecase = create_usecase(&deps);
        seed(&deps, "alice").await;
        seed(&deps, "alice").await;
        seed(&deps, "bob").await;
        let alice_conn = ConnectionId::generate();
        deps.rooms.join(alice_conn, conversation("c1")).await;

        // when (操作):
        let result = usecase.execute(&user("bob"), &conversation("c1")).await;

        // then (期待する結果):
        assert_eq!(result, Ok(2));
        assert_eq!(
            deps.pusher.received_by(&alice_conn).await,
            vec![ServerEvent::ConversationRead {
                conversation_id: conversation("c1"),
                user_id: user("bob"),
            }]
        );
        let statuses: Vec<MessageStatus> = deps
            .messages
            .list_messages(&conversation("c1"), &user("bob"))
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.status)
            .collect();
        assert_eq!(
            statuses,
            vec![MessageStatus::Read, MessageStatus::Read, MessageStatus::Sent]
        );
    }

    #[tokio::test]
    async fn test_mark_read_twice_is_idempotent() {
        // テスト項目: 2 回目の既読処理は更新 0 件だが chat:read は再送される
        // given (前提条件):
        let deps = TestDeps::default();
        let usecase = create_usecase(&deps);
        seed(&deps, "alice").await;
        let alice_conn = ConnectionId::generate();
        deps.rooms.join(alice_conn, conversation("c1")).await;
        usecase
            .execute(&user("bob"), &conversation("c1"))
            .await
            .unwrap();
        deps.pusher.clear().await;

        // when (操作):
        let result = usecase.execute(&user("bob"), &conversation("c1")).await;

        // then (期待する結果):
        assert_eq!(result, Ok(0));
        assert_eq!(
            deps.pusher.received_by(&alice_conn).await,
            vec![ServerEvent::ConversationRead {
                conversation_id: conversation("c1"),
                user_id: user("bob"),
            }]
        );
        let messages = deps
            .messages
            .list_messages(&conversation("c1"), &user("bob"))
            .await
            .unwrap();
        assert_eq!(messages[0].status, MessageStatus::Read);
    }

    #[tokio::test]
    async fn test_mark_read_by_each_group_member_is_broadcast() {
        // テスト項目: グループで 2 人目以降の読者も chat:read で通知される
        // given (前提条件): u1 の送ったメッセージを u2 が既読にしている
        let deps = TestDeps::default();
        let usecase = create_usecase(&deps);
        seed(&deps, "u1").await;
        let u1_conn = ConnectionId::generate();
        deps.rooms.join(u1_conn, conversation("c1")).await;
        let first = usecase.execute(&user("u2"), &conversation("c1")).await;

        // when (操作): u3 も既読にする
        let second = usecase.execute(&user("u3"), &conversation("c1")).await;

        // then (期待する結果):
        assert_eq!(first, Ok(1));
        assert_eq!(second, Ok(0));
        assert_eq!(
            deps.pusher.received_by(&u1_conn).await,
            vec![
                ServerEvent::ConversationRead {
                    conversation_id: conversation("c1"),
                    user_id: user("u2"),
                },
                ServerEvent::ConversationRead {
                    conversation_id: conversation("c1"),
                    user_id: user("u3"),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_mark_read_persistence_failure() {
        // テスト項目: 一括更新に失敗した場合はエラーを返し、何も配信しない
        // given (前提条件):
        let deps = TestDeps::default();
        let mut messages = MockMessageRepository::new();
        messages
            .expect_bulk_update_status()
            .returning(|_, _, _, _, _| Err(RepositoryError::Unavailable("db down".to_string())));
        let usecase = MarkConversationReadUseCase::new(
            deps.rooms.clone(),
            Arc::new(messages),
            deps.pusher.clone(),
            Arc::new(FixedClock::new(3_000)),
        );

        // when (操作):
        let result = usecase.execute(&user("bob"), &conversation("c1")).await;

        // then (期待する結果):
        assert!(result.is_err());
        assert!(deps.pusher.pushed().await.is_empty());
    }
}
