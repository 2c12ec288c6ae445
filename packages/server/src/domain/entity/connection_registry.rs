//! コネクションレジストリ
//!
//! 認証済みユーザー ID と、そのユーザーが保持している生きたコネクションの対応を管理します。
//! 1 ユーザーが複数のコネクション（タブ・端末）を持つことは正常な状態です。
//!
//! 永続化はしません。プロセス再起動後は全ユーザーがオフラインから始まります。

use std::collections::{HashMap, HashSet};

use crate::domain::value_object::{ConnectionId, UserId};

/// register / unregister に伴うプレゼンスの変化
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceTransition {
    /// 最初のコネクションが登録された（Offline → Online）
    CameOnline,
    /// 既にオンライン（2 本目以降のコネクション、または重複登録）
    AlreadyOnline,
    /// まだ他のコネクションが残っている
    StillOnline,
    /// 最後のコネクションが登録解除された（Online → Offline）
    WentOffline,
}

#[derive(Debug, Default, Clone)]
pub struct ConnectionRegistry {
    by_user: HashMap<UserId, HashSet<ConnectionId>>,
    owners: HashMap<ConnectionId, UserId>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// コネクションをユーザーの下に登録する
    ///
    /// 既に登録済みのコネクションは所有者を変更せずに `AlreadyOnline` を返す。
    pub fn register(&mut self, user_id: UserId, connection_id: ConnectionId) -> PresenceTransition {
        if self.owners.contains_key(&connection_id) {
            return PresenceTransition::AlreadyOnline;
        }

        self.owners.insert(connection_id, user_id.clone());
        let connections = self.by_user.entry(user_id).or_default();
        connections.insert(connection_id);

        if connections.len() == 1 {
            PresenceTransition::CameOnline
        } else {
            PresenceTransition::AlreadyOnline
        }
    }

    /// コネクションを登録解除する
    ///
    /// 未登録のコネクションの場合は `None`。
    pub fn unregister(&mut self, connection_id: &ConnectionId) -> Option<(UserId, PresenceTransition)> {
        let user_id = self.owners.remove(connection_id)?;

        let remaining = match self.by_user.get_mut(&user_id) {
            Some(connections) => {
                connections.remove(connection_id);
                connections.len()
            }
            None => 0,
        };

        if remaining == 0 {
            self.by_user.remove(&user_id);
            Some((user_id, PresenceTransition::WentOffline))
        } else {
            Some((user_id, PresenceTransition::StillOnline))
        }
    }

    pub fn is_online(&self, user_id: &UserId) -> bool {
        self.by_user
            .get(user_id)
            .is_some_and(|connections| !connections.is_empty())
    }

    /// オンラインユーザーの一覧（ID 順）
    pub fn list_online(&self) -> Vec<UserId> {
        let mut users: Vec<UserId> = self.by_user.keys().cloned().collect();
        users.sort();
        users
    }

    #[cfg(test)]
    pub fn owner_of(&self, connection_id: &ConnectionId) -> Option<&UserId> {
        self.owners.get(connection_id)
    }

    #[cfg(test)]
    pub fn connection_count(&self, user_id: &UserId) -> usize {
        self.by_user.get(user_id).map_or(0, HashSet::len)
    }

    /// 指定ユーザー以外が保持している全コネクション
    pub fn connections_except(&self, user_id: &UserId) -> Vec<ConnectionId> {
        self.owners
            .iter()
            .filter(|(_, owner)| *owner != user_id)
            .map(|(connection_id, _)| *connection_id)
            .collect()
    }

    #[cfg(test)]
    pub fn total_connections(&self) -> usize {
        self.owners.len()
    }
}
