//! Domain 層
//!
//! Value Object, Entity, イベント、および外部コラボレーターへのインターフェースを定義します。

pub mod auth;
pub mod entity;
pub mod error;
pub mod event;
pub mod pusher;
pub mod repository;
pub mod value_object;

pub use auth::TokenVerifier;
pub use entity::{
    ConnectionRegistry, MembershipChange, MembershipEvent, Message, PresenceTransition,
    RoomMembership, StatusFilter, UserProfile,
};
pub use error::{AuthError, MessagePushError, RepositoryError, ValueObjectError};
pub use event::ServerEvent;
pub use pusher::{MessagePusher, PusherChannel};
pub use repository::{
    ConnectionRepository, ConversationRepository, MessageRepository, RoomRepository,
    UserRepository,
};
pub use value_object::{
    ConnectionId, ConversationId, MAX_MESSAGE_CONTENT_CHARS, MessageContent, MessageId,
    MessageStatus, Timestamp, UserId,
};

#[cfg(test)]
pub use repository::{MockConversationRepository, MockMessageRepository, MockUserRepository};
