//! UseCase: オンライン状態の問い合わせ

use std::sync::Arc;

use crate::domain::{ConnectionRepository, UserId};

/// オンライン状態問い合わせのユースケース
pub struct GetPresenceUseCase {
    connections: Arc<dyn ConnectionRepository>,
}

impl GetPresenceUseCase {
    pub fn new(connections: Arc<dyn ConnectionRepository>) -> Self {
        Self { connections }
    }

    /// 1 本以上の有効なコネクションを持つか
    pub async fn is_online(&self, user_id: &UserId) -> bool {
        self.connections.is_online(user_id).await
    }

    /// オンラインのユーザー ID 一覧（重複なし）
    pub async fn list_online(&self) -> Vec<UserId> {
        self.connections.list_online().await
    }
}
