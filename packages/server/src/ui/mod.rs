//! HTTP / WebSocket entry points for the realtime server.

mod handler;
pub mod seed;
mod server;
mod signal;
pub mod state;

pub use server::Server;
pub use state::AppState;
