//! InMemory User Repository 実装

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{RepositoryError, Timestamp, UserId, UserProfile, UserRepository};

#[derive(Default)]
struct UserRecord {
    profile: Option<UserProfile>,
    last_seen: Option<Timestamp>,
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Arc<Mutex<HashMap<UserId, UserRecord>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 初期プロフィールを登録した状態で作成
    pub fn with_profiles(profiles: impl IntoIterator<Item = UserProfile>) -> Self {
        let users = profiles
            .into_iter()
            .map(|profile| {
                (
                    profile.id.clone(),
                    UserRecord {
                        profile: Some(profile),
                        last_seen: None,
                    },
                )
            })
            .collect();
        Self {
            users: Arc::new(Mutex::new(users)),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn set_last_seen(&self, user_id: &UserId, at: Timestamp) -> Result<(), RepositoryError> {
        let mut users = self.users.lock().await;
        users.entry(user_id.clone()).or_default().last_seen = Some(at);
        Ok(())
    }

    async fn last_seen(&self, user_id: &UserId) -> Result<Option<Timestamp>, RepositoryError> {
        let users = self.users.lock().await;
        Ok(users.get(user_id).and_then(|record| record.last_seen))
    }

    async fn find_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, RepositoryError> {
        let users = self.users.lock().await;
        Ok(users.get(user_id).and_then(|record| record.profile.clone()))
    }

    async fn save_profile(&self, profile: UserProfile) -> Result<(), RepositoryError> {
        let mut users = self.users.lock().await;
        let id = profile.id.clone();
        users.entry(id).or_default().profile = Some(profile);
        Ok(())
    }
}
