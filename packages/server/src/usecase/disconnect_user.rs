//! UseCase: ユーザー切断処理
//!
//! ### 何をテストしているか
//! - DisconnectUserUseCase::execute() メソッド
//! - 最後のコネクションが切れた時だけ last-seen 記録と presence:offline 送信が行われること
//!
//! ### どのような状況を想定しているか
//! - 正常系：唯一のコネクションの切断
//! - 複数タブ：1 本だけ閉じてもオフライン扱いにならない
//! - 異常系：last-seen の記録に失敗してもオフライン通知は行う
//! - 競合：last-seen の記録中に再接続した場合はオフライン通知を行わない

use std::sync::Arc;

use hiroba_shared::time::Clock;

use crate::domain::{
    ConnectionId, ConnectionRepository, ConversationId, MessagePusher, PresenceTransition,
    RoomRepository, ServerEvent, Timestamp, UserId, UserRepository,
};

/// 切断処理の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisconnectOutcome {
    pub user_id: UserId,
    pub went_offline: bool,
    pub left_rooms: Vec<ConversationId>,
}

/// ユーザー切断のユースケース
pub struct DisconnectUserUseCase {
    connections: Arc<dyn ConnectionRepository>,
    rooms: Arc<dyn RoomRepository>,
    users: Arc<dyn UserRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl DisconnectUserUseCase {
    pub fn new(
        connections: Arc<dyn ConnectionRepository>,
        rooms: Arc<dyn RoomRepository>,
        users: Arc<dyn UserRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            connections,
            rooms,
            users,
            message_pusher,
            clock,
        }
    }

    /// コネクションを破棄する
    ///
    /// 未登録のコネクションに対しては何もせず `None` を返す（二重切断に対して冪等）。
    pub async fn execute(&self, connection_id: ConnectionId) -> Option<DisconnectOutcome> {
        let left_rooms = self.rooms.leave_all(connection_id).await;
        self.message_pusher
            .unregister_connection(&connection_id)
            .await;

        let (user_id, transition) = self.connections.unregister(&connection_id).await?;
        let mut went_offline = transition == PresenceTransition::WentOffline;

        if went_offline {
            let now = Timestamp::new(self.clock.now_millis());
            if let Err(e) = self.users.set_last_seen(&user_id, now).await {
                tracing::warn!("Failed to record last seen for '{}': {}", user_id, e);
            }

            // last-seen の記録中に再接続していればオフライン通知は送らない
            if self.connections.is_online(&user_id).await {
                tracing::debug!("User '{}' reconnected before going offline", user_id);
                went_offline = false;
            }
        }

        if went_offline {
            let targets = self.connections.connections_except(&user_id).await;
            let event = ServerEvent::PresenceOffline {
                user_id: user_id.clone(),
            };
            if let Err(e) = self.message_pusher.broadcast(targets, &event).await {
                tracing::warn!("Failed to broadcast presence:offline for {}: {}", user_id, e);
            }
        }

        tracing::info!(
            "User '{}' disconnected ({}, offline: {})",
            user_id,
            connection_id,
            went_offline
        );

        Some(DisconnectOutcome {
            user_id,
            went_offline,
            left_rooms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MockUserRepository, RepositoryError},
        usecase::test_support::{TestDeps, conversation, user},
    };
    use async_trait::async_trait;
    use hiroba_shared::time::FixedClock;
    use tokio::sync::Notify;

    use crate::domain::UserProfile;

    const NOW: i64 = 1_700_000_000_000;

    fn create_usecase(deps: &TestDeps) -> DisconnectUserUseCase {
        DisconnectUserUseCase::new(
            deps.connections.clone(),
            deps.rooms.clone(),
            deps.users.clone(),
            deps.pusher.clone(),
            Arc::new(FixedClock::new(NOW)),
        )
    }

    /// set_last_seen の途中で止まるユーザーリポジトリ
    #[derive(Default)]
    struct GatedUserRepository {
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl UserRepository for GatedUserRepository {
        async fn set_last_seen(&self, _: &UserId, _: Timestamp) -> Result<(), RepositoryError> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(())
        }

        async fn last_seen(&self, _: &UserId) -> Result<Option<Timestamp>, RepositoryError> {
            Ok(None)
        }

        async fn find_profile(&self, _: &UserId) -> Result<Option<UserProfile>, RepositoryError> {
            Ok(None)
        }

        async fn save_profile(&self, _: UserProfile) -> Result<(), RepositoryError> {
            Ok(())
        }
    }

    async fn register(deps: &TestDeps, user_id: &str) -> ConnectionId {
        let connection_id = ConnectionId::generate();
        deps.connections
            .register(user(user_id), connection_id)
            .await;
        connection_id
    }

    #[tokio::test]
    async fn test_last_connection_goes_offline() {
        // テスト項目: 最後のコネクションの切断で last-seen が記録され presence:offline が送られる
        // given (前提条件):
        let deps = TestDeps::default();
        let usecase = create_usecase(&deps);
        let alice = register(&deps, "alice").await;
        let bob = register(&deps, "bob").await;
        deps.rooms.join(alice, conversation("c1")).await;

        // when (操作):
        let outcome = usecase.execute(alice).await;

        // then (期待する結果):
        assert_eq!(
            outcome,
            Some(DisconnectOutcome {
                user_id: user("alice"),
                went_offline: true,
                left_rooms: vec![conversation("c1")],
            })
        );
        assert_eq!(
            deps.users.last_seen(&user("alice")).await,
            Ok(Some(Timestamp::new(NOW)))
        );
        let offline = deps.pusher.broadcasts_named("presence:offline").await;
        assert_eq!(offline.len(), 1);
        assert_eq!(offline[0].0, vec![bob]);
        assert!(deps.rooms.members(&conversation("c1")).await.is_empty());
    }

    #[tokio::test]
    async fn test_closing_one_of_two_tabs_stays_online() {
        // テスト項目: 2 本のうち 1 本を閉じてもオフライン扱いにならない
        // given (前提条件):
        let deps = TestDeps::default();
        let usecase = create_usecase(&deps);
        let first = register(&deps, "alice").await;
        let _second = register(&deps, "alice").await;
        register(&deps, "bob").await;

        // when (操作):
        let outcome = usecase.execute(first).await;

        // then (期待する結果):
        assert_eq!(outcome.map(|o| o.went_offline), Some(false));
        assert!(deps.connections.is_online(&user("alice")).await);
        assert!(deps.pusher.broadcasts_named("presence:offline").await.is_empty());
        assert_eq!(deps.users.last_seen(&user("alice")).await, Ok(None));
    }

    #[tokio::test]
    async fn test_unknown_connection_is_noop() {
        // テスト項目: 未登録のコネクションの切断は何もしない
        // given (前提条件):
        let deps = TestDeps::default();
        let usecase = create_usecase(&deps);
        let alice = register(&deps, "alice").await;
        usecase.execute(alice).await;
        deps.pusher.clear().await;

        // when (操作): 同じコネクションを再度切断
        let outcome = usecase.execute(alice).await;

        // then (期待する結果):
        assert_eq!(outcome, None);
        assert!(deps.pusher.pushed().await.is_empty());
    }

    #[tokio::test]
    async fn test_last_seen_failure_still_broadcasts_offline() {
        // テスト項目: last-seen の記録に失敗しても presence:offline は送られる
        // given (前提条件):
        let deps = TestDeps::default();
        let mut users = MockUserRepository::new();
        users
            .expect_set_last_seen()
            .times(1)
            .returning(|_, _| Err(RepositoryError::Unavailable("db down".to_string())));
        let usecase = DisconnectUserUseCase::new(
            deps.connections.clone(),
            deps.rooms.clone(),
            Arc::new(users),
            deps.pusher.clone(),
            Arc::new(FixedClock::new(NOW)),
        );
        let alice = register(&deps, "alice").await;
        register(&deps, "bob").await;

        // when (操作):
        let outcome = usecase.execute(alice).await;

        // then (期待する結果):
        assert_eq!(outcome.map(|o| o.went_offline), Some(true));
        assert_eq!(deps.pusher.broadcasts_named("presence:offline").await.len(), 1);
    }

    #[tokio::test]
    async fn test_reconnect_during_last_seen_write_stays_online() {
        // テスト項目: last-seen の記録中に再接続した場合 presence:offline は送られない
        // given (前提条件):
        let deps = TestDeps::default();
        let users = Arc::new(GatedUserRepository::default());
        let usecase = Arc::new(DisconnectUserUseCase::new(
            deps.connections.clone(),
            deps.rooms.clone(),
            users.clone(),
            deps.pusher.clone(),
            Arc::new(FixedClock::new(NOW)),
        ));
        let alice = register(&deps, "alice").await;
        register(&deps, "bob").await;

        // when (操作): 切断処理が last-seen を書いている間に alice が再接続する
        let handle = {
            let usecase = usecase.clone();
            tokio::spawn(async move { usecase.execute(alice).await })
        };
        users.entered.notified().await;
        let reconnected = register(&deps, "alice").await;
        users.release.notify_one();
        let outcome = handle.await.unwrap();

        // then (期待する結果):
        assert_eq!(outcome.map(|o| o.went_offline), Some(false));
        assert!(deps.connections.is_online(&user("alice")).await);
        assert!(deps.connections.connections_except(&user("bob")).await.contains(&reconnected));
        assert!(deps.pusher.broadcasts_named("presence:offline").await.is_empty());
    }
}
