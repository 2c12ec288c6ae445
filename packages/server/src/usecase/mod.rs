//! UseCase 層
//!
//! ドメインのリポジトリと MessagePusher を組み合わせて、リアルタイム配信の各操作を実装します。

pub mod connect_user;
pub mod disconnect_user;
pub mod error;
pub mod get_presence;
pub mod join_conversation;
pub mod leave_conversation;
pub mod mark_conversation_read;
pub mod message_history;
pub mod relay_typing;
pub mod send_message;

#[cfg(test)]
pub(crate) mod test_support;

pub use connect_user::{ConnectUserUseCase, ConnectedSession};
pub use disconnect_user::{DisconnectOutcome, DisconnectUserUseCase};
pub use error::{
    ConnectError, ErrorCode, MessageHistoryError, ReconcileError, SendMessageError,
};
pub use get_presence::GetPresenceUseCase;
pub use join_conversation::JoinConversationUseCase;
pub use leave_conversation::LeaveConversationUseCase;
pub use mark_conversation_read::MarkConversationReadUseCase;
pub use message_history::MessageHistoryUseCase;
pub use relay_typing::RelayTypingUseCase;
pub use send_message::{SendMessageUseCase, SentMessage};
