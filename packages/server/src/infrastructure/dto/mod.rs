//! Data Transfer Objects (DTOs) for the realtime server.
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket event DTOs (`{"event": ..., "data": ...}` envelopes)
//! - `http`: HTTP API response DTOs

pub mod conversion;
pub mod http;
pub mod websocket;

pub use conversion::encode_server_event;
