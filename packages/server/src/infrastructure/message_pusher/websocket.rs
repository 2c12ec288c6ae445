//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - コネクションごとの `UnboundedSender` を管理
//! - ドメインイベントを JSON にエンコードして送信（push_to, broadcast）
//!
//! WebSocket の受付と sender の生成は UI 層（`ui/handler/websocket.rs`）が行い、
//! この実装は受け取った sender を送信にのみ使用します。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    domain::{ConnectionId, MessagePushError, MessagePusher, PusherChannel, ServerEvent},
    infrastructure::dto::encode_server_event,
};

/// WebSocket を使った MessagePusher 実装
///
/// ```ignore
/// let pusher = WebSocketMessagePusher::default();
/// pusher.register_connection(connection_id, tx).await;
/// pusher.push_to(&connection_id, &event).await?;
/// ```
#[derive(Default)]
pub struct WebSocketMessagePusher {
    /// 接続中のコネクションの送信チャンネル
    connections: Arc<Mutex<HashMap<ConnectionId, PusherChannel>>>,
}

impl WebSocketMessagePusher {
    pub fn new(connections: Arc<Mutex<HashMap<ConnectionId, PusherChannel>>>) -> Self {
        Self { connections }
    }
}

fn encode(event: &ServerEvent) -> Result<String, MessagePushError> {
    encode_server_event(event).map_err(|e| MessagePushError::EncodeFailed(e.to_string()))
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_connection(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut connections = self.connections.lock().await;
        connections.insert(connection_id, sender);
        tracing::debug!("Connection '{}' registered to MessagePusher", connection_id);
    }

    async fn unregister_connection(&self, connection_id: &ConnectionId) {
        let mut connections = self.connections.lock().await;
        connections.remove(connection_id);
        tracing::debug!("Connection '{}' unregistered from MessagePusher", connection_id);
    }

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        event: &ServerEvent,
    ) -> Result<(), MessagePushError> {
        let payload = encode(event)?;
        let connections = self.connections.lock().await;

        let sender = connections
            .get(connection_id)
            .ok_or_else(|| MessagePushError::ConnectionNotFound(connection_id.to_string()))?;
        sender
            .send(payload)
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        tracing::debug!("Pushed '{}' to connection '{}'", event.name(), connection_id);
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        event: &ServerEvent,
    ) -> Result<usize, MessagePushError> {
        let payload = encode(event)?;
        let connections = self.connections.lock().await;

        let mut delivered = 0;
        for target in targets {
            match connections.get(&target) {
                // ブロードキャストでは一部の送信失敗を許容
                Some(sender) => match sender.send(payload.clone()) {
                    Ok(()) => delivered += 1,
                    Err(e) => tracing::warn!(
                        "Failed to push '{}' to connection '{}': {}",
                        event.name(),
                        target,
                        e
                    ),
                },
                None => tracing::warn!(
                    "Connection '{}' not found during broadcast of '{}', skipping",
                    target,
                    event.name()
                ),
            }
        }

        tracing::debug!("Broadcasted '{}' to {} connection(s)", event.name(), delivered);
        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - push_to: 特定のコネクションへの送信
    // - broadcast: 複数コネクションへの送信と送信数
    // - 存在しない・切断済みのコネクションの扱い
    // ========================================

    fn online(id: &str) -> ServerEvent {
        ServerEvent::PresenceOnline {
            user_id: UserId::new(id.to_string()).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_push_to_success() {
        // テスト項目: 特定のコネクションにエンコード済みイベントを送信できる
        // given (前提条件):
        let pusher = WebSocketMessagePusher::default();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let connection = ConnectionId::generate();
        pusher.register_connection(connection, tx).await;

        // when (操作):
        let result = pusher.push_to(&connection, &online("alice")).await;

        // then (期待する結果):
        assert!(result.is_ok());
        let received = rx.recv().await.unwrap();
        assert_eq!(
            received,
            r#"{"event":"presence:online","data":{"userId":"alice"}}"#
        );
    }

    #[tokio::test]
    async fn test_push_to_connection_not_found() {
        // テスト項目: 存在しないコネクションへの送信はエラーを返す
        let pusher = WebSocketMessagePusher::default();

        let result = pusher.push_to(&ConnectionId::generate(), &online("alice")).await;

        assert!(matches!(
            result,
            Err(MessagePushError::ConnectionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_broadcast_partial_failure() {
        // テスト項目: 一部のコネクションが存在しない・閉じていても成功し、送信数を返す
        // given (前提条件):
        let pusher = WebSocketMessagePusher::default();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, rx2) = mpsc::unbounded_channel();
        let alive = ConnectionId::generate();
        let closed = ConnectionId::generate();
        pusher.register_connection(alive, tx1).await;
        pusher.register_connection(closed, tx2).await;
        drop(rx2);

        // when (操作):
        let targets = vec![alive, closed, ConnectionId::generate()];
        let result = pusher.broadcast(targets, &online("bob")).await;

        // then (期待する結果):
        assert_eq!(result, Ok(1));
        assert!(rx1.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_broadcast_after_unregister_skips_connection() {
        let pusher = WebSocketMessagePusher::default();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let connection = ConnectionId::generate();
        pusher.register_connection(connection, tx).await;
        pusher.unregister_connection(&connection).await;

        let result = pusher.broadcast(vec![connection], &online("bob")).await;

        assert_eq!(result, Ok(0));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_broadcast_empty_targets() {
        // テスト項目: 空のターゲットリストでもエラーにならない
        let pusher = WebSocketMessagePusher::default();

        let result = pusher.broadcast(vec![], &online("bob")).await;

        assert_eq!(result, Ok(0));
    }
}
