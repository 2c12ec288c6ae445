//! ルームメンバーシップ
//!
//! 「どのコネクションがどの会話のイベントを購読しているか」を
//! (コネクション × 会話) → 参加/不参加 の状態遷移表として管理します。
//!
//! 永続化された参加者リストではなく、オンライン配信のためのルーティング情報です。
//! オフラインの参加者は次回の取得（pull）で追いつきます。

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::domain::value_object::{ConnectionId, ConversationId};

/// 状態遷移を引き起こすイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipEvent {
    Join {
        connection_id: ConnectionId,
        conversation_id: ConversationId,
    },
    Leave {
        connection_id: ConnectionId,
        conversation_id: ConversationId,
    },
    /// コネクション破棄時の全ルームからの退出
    Disconnect { connection_id: ConnectionId },
}

/// イベント適用の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipChange {
    Joined,
    Left(Vec<ConversationId>),
    Unchanged,
}

#[derive(Debug, Default, Clone)]
pub struct RoomMembership {
    rooms: HashMap<ConversationId, BTreeSet<ConnectionId>>,
    joined: HashMap<ConnectionId, HashSet<ConversationId>>,
}

impl RoomMembership {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: MembershipEvent) -> MembershipChange {
        match event {
            MembershipEvent::Join {
                connection_id,
                conversation_id,
            } => {
                let newly_joined = self
                    .rooms
                    .entry(conversation_id.clone())
                    .or_default()
                    .insert(connection_id);
                self.joined
                    .entry(connection_id)
                    .or_default()
                    .insert(conversation_id);

                if newly_joined {
                    MembershipChange::Joined
                } else {
                    MembershipChange::Unchanged
                }
            }
            MembershipEvent::Leave {
                connection_id,
                conversation_id,
            } => {
                if self.remove_pair(&connection_id, &conversation_id) {
                    if let Some(conversations) = self.joined.get_mut(&connection_id) {
                        conversations.remove(&conversation_id);
                        if conversations.is_empty() {
                            self.joined.remove(&connection_id);
                        }
                    }
                    MembershipChange::Left(vec![conversation_id])
                } else {
                    MembershipChange::Unchanged
                }
            }
            MembershipEvent::Disconnect { connection_id } => {
                let Some(conversations) = self.joined.remove(&connection_id) else {
                    return MembershipChange::Unchanged;
                };

                let mut left: Vec<ConversationId> = conversations.into_iter().collect();
                left.sort();
                for conversation_id in &left {
                    self.remove_pair(&connection_id, conversation_id);
                }
                MembershipChange::Left(left)
            }
        }
    }

    /// 冪等。既に参加済みでも成功する
    pub fn join(&mut self, connection_id: ConnectionId, conversation_id: ConversationId) -> bool {
        self.apply(MembershipEvent::Join {
            connection_id,
            conversation_id,
        }) == MembershipChange::Joined
    }

    /// 冪等。参加していなくても成功する
    pub fn leave(&mut self, connection_id: ConnectionId, conversation_id: ConversationId) -> bool {
        matches!(
            self.apply(MembershipEvent::Leave {
                connection_id,
                conversation_id,
            }),
            MembershipChange::Left(_)
        )
    }

    /// 全ルームから退出し、退出したルームを返す
    pub fn leave_all(&mut self, connection_id: ConnectionId) -> Vec<ConversationId> {
        match self.apply(MembershipEvent::Disconnect { connection_id }) {
            MembershipChange::Left(conversations) => conversations,
            _ => Vec::new(),
        }
    }

    /// 呼び出し時点のメンバーのスナップショット
    pub fn members(&self, conversation_id: &ConversationId) -> Vec<ConnectionId> {
        self.rooms
            .get(conversation_id)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    #[cfg(test)]
    pub fn is_member(&self, connection_id: &ConnectionId, conversation_id: &ConversationId) -> bool {
        self.rooms
            .get(conversation_id)
            .is_some_and(|members| members.contains(connection_id))
    }

    #[cfg(test)]
    pub fn rooms_of(&self, connection_id: &ConnectionId) -> Vec<ConversationId> {
        let mut rooms: Vec<ConversationId> = self
            .joined
            .get(connection_id)
            .map(|conversations| conversations.iter().cloned().collect())
            .unwrap_or_default();
        rooms.sort();
        rooms
    }

    #[cfg(test)]
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    fn remove_pair(&mut self, connection_id: &ConnectionId, conversation_id: &ConversationId) -> bool {
        let Some(members) = self.rooms.get_mut(conversation_id) else {
            return false;
        };
        let removed = members.remove(connection_id);
        if members.is_empty() {
            self.rooms.remove(conversation_id);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conversation(id: &str) -> ConversationId {
        ConversationId::new(id.to_string()).unwrap()
    }

    #[test]
    fn test_join_is_idempotent() {
        // テスト項目: 同じルームへの 2 回目の join は状態を変えない
        // given (前提条件):
        let mut membership = RoomMembership::new();
        let connection = ConnectionId::generate();

        // when (操作):
        let first = membership.join(connection, conversation("c1"));
        let second = membership.join(connection, conversation("c1"));

        // then (期待する結果):
        assert!(first);
        assert!(!second);
        assert_eq!(membership.members(&conversation("c1")), vec![connection]);
    }

    #[test]
    fn test_leave_is_idempotent() {
        // テスト項目: 参加していないルームからの leave はエラーにならない
        // given (前提条件):
        let mut membership = RoomMembership::new();
        let connection = ConnectionId::generate();
        membership.join(connection, conversation("c1"));

        // when (操作):
        let first = membership.leave(connection, conversation("c1"));
        let second = membership.leave(connection, conversation("c1"));

        // then (期待する結果):
        assert!(first);
        assert!(!second);
        assert!(membership.members(&conversation("c1")).is_empty());
        assert_eq!(membership.room_count(), 0);
    }

    #[test]
    fn test_connection_can_join_many_rooms() {
        let mut membership = RoomMembership::new();
        let connection = ConnectionId::generate();

        membership.join(connection, conversation("c2"));
        membership.join(connection, conversation("c1"));

        assert_eq!(
            membership.rooms_of(&connection),
            vec![conversation("c1"), conversation("c2")]
        );
        assert!(membership.is_member(&connection, &conversation("c1")));
        assert!(membership.is_member(&connection, &conversation("c2")));
    }

    #[test]
    fn test_disconnect_leaves_every_room() {
        // テスト項目: 切断時に全ルームから退出し、他のコネクションは残る
        // given (前提条件):
        let mut membership = RoomMembership::new();
        let leaving = ConnectionId::generate();
        let staying = ConnectionId::generate();
        membership.join(leaving, conversation("c1"));
        membership.join(leaving, conversation("c2"));
        membership.join(staying, conversation("c1"));

        // when (操作):
        let left = membership.leave_all(leaving);

        // then (期待する結果):
        assert_eq!(left, vec![conversation("c1"), conversation("c2")]);
        assert_eq!(membership.members(&conversation("c1")), vec![staying]);
        assert!(membership.members(&conversation("c2")).is_empty());
        assert!(membership.rooms_of(&leaving).is_empty());
    }

    #[test]
    fn test_disconnect_without_rooms_is_unchanged() {
        let mut membership = RoomMembership::new();

        let change = membership.apply(MembershipEvent::Disconnect {
            connection_id: ConnectionId::generate(),
        });

        assert_eq!(change, MembershipChange::Unchanged);
    }

    #[test]
    fn test_members_is_a_snapshot() {
        // テスト項目: members() の結果はその後の leave の影響を受けない
        // given (前提条件):
        let mut membership = RoomMembership::new();
        let a = ConnectionId::generate();
        let b = ConnectionId::generate();
        membership.join(a, conversation("c1"));
        membership.join(b, conversation("c1"));

        // when (操作):
        let snapshot = membership.members(&conversation("c1"));
        membership.leave(a, conversation("c1"));

        // then (期待する結果):
        assert_eq!(snapshot.len(), 2);
        assert_eq!(membership.members(&conversation("c1")), vec![b]);
    }
}
