//! InMemory Repository 実装
//!
//! プロセス内の `tokio::sync::Mutex` で保護された HashMap をストレージとして使用します。
//! 永続化コラボレーター（message / conversation / user）は、将来 DB 実装に置き換える前提です。

pub mod connection;
pub mod conversation;
pub mod message;
pub mod room;
pub mod user;

pub use connection::InMemoryConnectionRepository;
pub use conversation::InMemoryConversationRepository;
pub use message::InMemoryMessageRepository;
pub use room::InMemoryRoomRepository;
pub use user::InMemoryUserRepository;
