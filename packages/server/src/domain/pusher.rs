//! MessagePusher trait 定義
//!
//! コネクションへのイベント送信を抽象化します。
//! WebSocket 以外（複数プロセス間の配信バスなど）へ差し替える場合の境界です。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError, ServerEvent};

/// コネクションごとの送信チャンネル（エンコード済み JSON を流す）
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[async_trait]
pub trait MessagePusher: Send + Sync {
    async fn register_connection(&self, connection_id: ConnectionId, sender: PusherChannel);

    async fn unregister_connection(&self, connection_id: &ConnectionId);

    /// 特定のコネクションに送信
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        event: &ServerEvent,
    ) -> Result<(), MessagePushError>;

    /// 複数コネクションに送信し、実際に送れた数を返す
    ///
    /// 一部のコネクションへの送信失敗は許容する（ベストエフォート）。
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        event: &ServerEvent,
    ) -> Result<usize, MessagePushError>;
}
