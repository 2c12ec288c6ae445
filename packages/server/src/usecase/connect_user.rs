//! UseCase: ユーザー接続処理
//!
//! ### 何をテストしているか
//! - ConnectUserUseCase::authenticate() / execute()
//! - 接続直後の presence:list スナップショットと presence:online のブロードキャスト
//!
//! ### どのような状況を想定しているか
//! - 正常系：初回接続でオンライン通知が他のユーザーに届く
//! - 複数タブ：同じユーザーの 2 本目の接続ではオンライン通知を送らない
//! - 異常系：トークンが無い・不正

use std::sync::Arc;

use crate::domain::{
    AuthError, ConnectionId, ConnectionRepository, MessagePusher, PresenceTransition,
    PusherChannel, ServerEvent, TokenVerifier, UserId,
};

use super::error::ConnectError;

/// 接続が確立したセッション
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedSession {
    pub connection_id: ConnectionId,
    pub user_id: UserId,
    pub transition: PresenceTransition,
}

/// ユーザー接続のユースケース
pub struct ConnectUserUseCase {
    verifier: Arc<dyn TokenVerifier>,
    connections: Arc<dyn ConnectionRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl ConnectUserUseCase {
    pub fn new(
        verifier: Arc<dyn TokenVerifier>,
        connections: Arc<dyn ConnectionRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            verifier,
            connections,
            message_pusher,
        }
    }

    /// ハンドシェイク時の認証
    ///
    /// 失敗した場合は何も登録されず、接続を拒否する。
    pub fn authenticate(&self, token: Option<&str>) -> Result<UserId, ConnectError> {
        let token = token.ok_or(AuthError::MissingToken)?;
        Ok(self.verifier.verify(token)?)
    }

    /// 認証済みユーザーのコネクションを登録する
    ///
    /// 1. 送信チャンネルを MessagePusher に登録
    /// 2. レジストリに登録（オフライン → オンラインの遷移を判定）
    /// 3. 本人に presence:list を送信（自分自身を含むスナップショット）
    /// 4. 初回接続なら他のユーザーの全コネクションに presence:online を送信
    pub async fn execute(&self, user_id: UserId, sender: PusherChannel) -> ConnectedSession {
        let connection_id = ConnectionId::generate();

        self.message_pusher
            .register_connection(connection_id, sender)
            .await;
        let transition = self
            .connections
            .register(user_id.clone(), connection_id)
            .await;

        let user_ids = self.connections.list_online().await;
        if let Err(e) = self
            .message_pusher
            .push_to(&connection_id, &ServerEvent::PresenceList { user_ids })
            .await
        {
            tracing::warn!("Failed to send presence snapshot to {}: {}", connection_id, e);
        }

        if transition == PresenceTransition::CameOnline {
            let targets = self.connections.connections_except(&user_id).await;
            let event = ServerEvent::PresenceOnline {
                user_id: user_id.clone(),
            };
            if let Err(e) = self.message_pusher.broadcast(targets, &event).await {
                tracing::warn!("Failed to broadcast presence:online for {}: {}", user_id, e);
            }
        }

        tracing::info!(
            "User '{}' connected ({}, {:?})",
            user_id,
            connection_id,
            transition
        );

        ConnectedSession {
            connection_id,
            user_id,
            transition,
        }
    }
}
