//! Entity 定義

pub mod connection_registry;
pub mod message;
pub mod room_membership;

pub use connection_registry::{ConnectionRegistry, PresenceTransition};
pub use message::{Message, StatusFilter, UserProfile};
pub use room_membership::{MembershipChange, MembershipEvent, RoomMembership};
