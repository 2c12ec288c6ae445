//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get},
};
use tower_http::trace::TraceLayer;

use super::{
    handler::{delete_message, get_messages, get_presence, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Realtime chat server
///
/// # Example
///
/// ```ignore
/// let state = AppState::in_memory(verifier, Arc::new(SystemClock));
/// Server::new(state).run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// Build the router with every endpoint mounted
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/presence", get(get_presence))
            .route(
                "/api/conversations/{conversation_id}/messages",
                get(get_messages),
            )
            .route("/api/messages/{message_id}", delete(delete_message))
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until a shutdown signal is received
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();

        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!("Realtime server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws?token=<jwt>", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
