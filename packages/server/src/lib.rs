//! Realtime message delivery and presence server library.
//!
//! Authenticated WebSocket connections join conversation rooms, exchange messages,
//! and receive presence, delivery, read, and typing events.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
