//! InMemory Connection Repository 実装
//!
//! `ConnectionRegistry` エンティティを保持し、ConnectionRepository trait を実装します。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, ConnectionRegistry, ConnectionRepository, PresenceTransition, UserId,
};

#[derive(Default)]
pub struct InMemoryConnectionRepository {
    registry: Arc<Mutex<ConnectionRegistry>>,
}

impl InMemoryConnectionRepository {
    pub fn new(registry: Arc<Mutex<ConnectionRegistry>>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl ConnectionRepository for InMemoryConnectionRepository {
    async fn register(&self, user_id: UserId, connection_id: ConnectionId) -> PresenceTransition {
        let mut registry = self.registry.lock().await;
        registry.register(user_id, connection_id)
    }

    async fn unregister(&self, connection_id: &ConnectionId) -> Option<(UserId, PresenceTransition)> {
        let mut registry = self.registry.lock().await;
        registry.unregister(connection_id)
    }

    async fn is_online(&self, user_id: &UserId) -> bool {
        let registry = self.registry.lock().await;
        registry.is_online(user_id)
    }

    async fn list_online(&self) -> Vec<UserId> {
        let registry = self.registry.lock().await;
        registry.list_online()
    }

    async fn connections_except(&self, user_id: &UserId) -> Vec<ConnectionId> {
        let registry = self.registry.lock().await;
        registry.connections_except(user_id)
    }
}
