//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! - 永続化コラボレーター: `MessageRepository`, `ConversationRepository`, `UserRepository`
//!   （全て失敗し得る非同期操作として扱う）
//! - プロセス内のリアルタイム状態: `ConnectionRepository`, `RoomRepository`
//!   （複数プロセス構成では外部の配信バスに差し替える境界）

use async_trait::async_trait;

use super::{
    ConnectionId, ConversationId, Message, MessageContent, MessageId, MessageStatus,
    PresenceTransition, RepositoryError, StatusFilter, Timestamp, UserId, UserProfile,
};

/// メッセージの永続化
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// status `sent` で新しいメッセージを作成
    async fn create_message(
        &self,
        conversation_id: ConversationId,
        sender: UserId,
        content: MessageContent,
        forwarded: bool,
        created_at: Timestamp,
    ) -> Result<Message, RepositoryError>;

    /// 会話内の `exclude_sender` 以外が送ったメッセージのうち `filter` に一致するものを
    /// `to` に一括更新し、更新件数を返す
    ///
    /// ステータスを逆行させる更新は行わない。
    async fn bulk_update_status(
        &self,
        conversation_id: &ConversationId,
        exclude_sender: &UserId,
        filter: StatusFilter,
        to: MessageStatus,
        updated_at: Timestamp,
    ) -> Result<usize, RepositoryError>;

    /// 閲覧者から見える会話のメッセージ（作成順）
    async fn list_messages(
        &self,
        conversation_id: &ConversationId,
        viewer: &UserId,
    ) -> Result<Vec<Message>, RepositoryError>;

    /// 指定ユーザーに対してメッセージを非表示にする
    async fn remove_for(&self, message_id: &MessageId, user_id: &UserId)
    -> Result<(), RepositoryError>;
}

/// 会話の永続化（最新メッセージのポインタ）
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn set_latest_message(
        &self,
        conversation_id: &ConversationId,
        message_id: &MessageId,
        updated_at: Timestamp,
    ) -> Result<(), RepositoryError>;

    async fn latest_message(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Option<MessageId>, RepositoryError>;
}

/// ユーザー情報の永続化
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn set_last_seen(&self, user_id: &UserId, at: Timestamp) -> Result<(), RepositoryError>;

    async fn last_seen(&self, user_id: &UserId) -> Result<Option<Timestamp>, RepositoryError>;

    async fn find_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, RepositoryError>;

    /// プロフィールの登録・更新（ユーザー管理側から呼ばれる。起動時の初期登録は実装側で行う）
    async fn save_profile(&self, profile: UserProfile) -> Result<(), RepositoryError>;
}

/// コネクションレジストリ
///
/// このトレイトの実装以外からレジストリを直接変更してはならない。
#[async_trait]
pub trait ConnectionRepository: Send + Sync {
    async fn register(&self, user_id: UserId, connection_id: ConnectionId) -> PresenceTransition;

    async fn unregister(&self, connection_id: &ConnectionId) -> Option<(UserId, PresenceTransition)>;

    async fn is_online(&self, user_id: &UserId) -> bool;

    async fn list_online(&self) -> Vec<UserId>;

    /// 指定ユーザー以外の全コネクション
    async fn connections_except(&self, user_id: &UserId) -> Vec<ConnectionId>;
}

/// ルームメンバーシップ
#[async_trait]
pub trait RoomRepository: Send + Sync {
    async fn join(&self, connection_id: ConnectionId, conversation_id: ConversationId) -> bool;

    async fn leave(&self, connection_id: ConnectionId, conversation_id: ConversationId) -> bool;

    async fn leave_all(&self, connection_id: ConnectionId) -> Vec<ConversationId>;

    /// 呼び出し時点のメンバーのスナップショット
    async fn members(&self, conversation_id: &ConversationId) -> Vec<ConnectionId>;
}
