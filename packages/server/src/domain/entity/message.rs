//! 永続化されたメッセージとユーザーの表示情報

use std::collections::BTreeSet;

use crate::domain::value_object::{
    ConversationId, MessageContent, MessageId, MessageStatus, Timestamp, UserId,
};

/// 永続化されたメッセージ
///
/// 状態遷移は [`Message::advance_status`] のみで行い、逆行は拒否される。
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender: UserId,
    pub content: MessageContent,
    pub status: MessageStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub forwarded: bool,
    /// このメッセージを非表示にしたユーザー
    pub removed_for: BTreeSet<UserId>,
}

impl Message {
    /// status `sent` のメッセージを作成
    pub fn new(
        id: MessageId,
        conversation_id: ConversationId,
        sender: UserId,
        content: MessageContent,
        forwarded: bool,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            conversation_id,
            sender,
            content,
            status: MessageStatus::Sent,
            created_at,
            updated_at: created_at,
            forwarded,
            removed_for: BTreeSet::new(),
        }
    }

    /// ステータスを前進させる。変化があった場合のみ true を返す
    pub fn advance_status(&mut self, next: MessageStatus, at: Timestamp) -> bool {
        if next == self.status || !self.status.can_advance_to(next) {
            return false;
        }
        self.status = next;
        self.updated_at = at;
        true
    }

    pub fn is_visible_to(&self, viewer: &UserId) -> bool {
        !self.removed_for.contains(viewer)
    }
}

/// 一括ステータス更新の対象条件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    /// 指定ステータスと一致するもの
    Exactly(MessageStatus),
    /// 指定ステータス以外のもの
    Not(MessageStatus),
}

impl StatusFilter {
    pub fn matches(&self, status: MessageStatus) -> bool {
        match self {
            StatusFilter::Exactly(expected) => status == *expected,
            StatusFilter::Not(excluded) => status != *excluded,
        }
    }
}

/// クライアントに埋め込む送信者の表示情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub avatar: Option<String>,
}

impl UserProfile {
    pub fn new(id: UserId, name: impl Into<String>, avatar: Option<String>) -> Self {
        Self {
            id,
            name: name.into(),
            avatar,
        }
    }

    /// プロフィールが未登録のユーザー向け。表示名にはユーザー ID を使う
    pub fn fallback(id: UserId) -> Self {
        let name = id.as_str().to_string();
        Self {
            id,
            name,
            avatar: None,
        }
    }
}
