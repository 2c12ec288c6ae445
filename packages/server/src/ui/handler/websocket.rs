//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::{
    domain::{ConversationId, UserId},
    infrastructure::dto::websocket::ClientEventDto,
    ui::state::AppState,
    usecase::{ConnectedSession, ErrorCode},
};

use super::bearer_token;

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub token: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, StatusCode> {
    // The query parameter wins; browsers cannot set headers on a WebSocket handshake.
    let token = query.token.or_else(|| bearer_token(&headers));

    let user_id = match state.connect_user_usecase.authenticate(token.as_deref()) {
        Ok(user_id) => user_id,
        Err(e) => {
            tracing::warn!("Rejecting WebSocket handshake: {}", e);
            return Err(StatusCode::UNAUTHORIZED);
        }
    };

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, user_id)))
}

/// Spawns a task that receives encoded events from the rx channel and pushes them to the WebSocket sender.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, user_id: UserId) {
    let (sender, mut receiver) = socket.split();

    // Create a channel for this connection to receive events
    let (tx, rx) = mpsc::unbounded_channel();

    // Registration sends presence:list and (on first tab) presence:online
    let session = state.connect_user_usecase.execute(user_id, tx).await;

    let state_clone = state.clone();
    let session_clone = session.clone();

    // Spawn a task to receive events from this connection
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    tracing::debug!("Received from {}: {}", session_clone.connection_id, text);
                    handle_client_event(&state_clone, &session_clone, text.as_str()).await;
                }
                Message::Binary(_) => {
                    reply_error(
                        &state_clone,
                        &session_clone,
                        ErrorCode::InvalidPayload,
                        "binary frames are not supported",
                    )
                    .await;
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                }
                Message::Close(_) => {
                    tracing::info!(
                        "Connection {} requested close",
                        session_clone.connection_id
                    );
                    break;
                }
                _ => {}
            }
        }
    });

    // Spawn a task to forward events to this connection
    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // Teardown: rooms, pusher, registry, and presence:offline on the last tab
    if state
        .disconnect_user_usecase
        .execute(session.connection_id)
        .await
        .is_none()
    {
        tracing::warn!(
            "Connection {} was already unregistered",
            session.connection_id
        );
    }
}

/// Dispatch one client event to its use case
async fn handle_client_event(state: &AppState, session: &ConnectedSession, text: &str) {
    let event = match serde_json::from_str::<ClientEventDto>(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Failed to parse client event: {}", e);
            reply_error(
                state,
                session,
                ErrorCode::InvalidPayload,
                format!("malformed event: {}", e),
            )
            .await;
            return;
        }
    };

    match event {
        ClientEventDto::ChatJoin(payload) => {
            let Some(conversation_id) =
                parse_conversation_id(state, session, payload.conversation_id).await
            else {
                return;
            };
            if let Err(e) = state
                .join_conversation_usecase
                .execute(session.connection_id, &session.user_id, conversation_id)
                .await
            {
                tracing::warn!("Failed to reconcile delivered status: {}", e);
                reply_error(state, session, e.code(), e.to_string()).await;
            }
        }
        ClientEventDto::ChatLeave(payload) => {
            let Some(conversation_id) =
                parse_conversation_id(state, session, payload.conversation_id).await
            else {
                return;
            };
            state
                .leave_conversation_usecase
                .execute(session.connection_id, conversation_id)
                .await;
        }
        ClientEventDto::ChatRead(payload) => {
            let Some(conversation_id) =
                parse_conversation_id(state, session, payload.conversation_id).await
            else {
                return;
            };
            if let Err(e) = state
                .mark_conversation_read_usecase
                .execute(&session.user_id, &conversation_id)
                .await
            {
                tracing::warn!("Failed to mark conversation read: {}", e);
                reply_error(state, session, e.code(), e.to_string()).await;
            }
        }
        ClientEventDto::MessageSend(payload) => {
            let Some(conversation_id) =
                parse_conversation_id(state, session, payload.conversation_id).await
            else {
                return;
            };
            if let Err(e) = state
                .send_message_usecase
                .execute(
                    session.user_id.clone(),
                    conversation_id,
                    payload.content,
                    payload.forwarded,
                )
                .await
            {
                tracing::warn!("Failed to send message: {}", e);
                reply_error(state, session, e.code(), e.to_string()).await;
            }
        }
        ClientEventDto::TypingStart(payload) => {
            let Some(conversation_id) =
                parse_conversation_id(state, session, payload.conversation_id).await
            else {
                return;
            };
            state
                .relay_typing_usecase
                .start(conversation_id, session.user_id.clone())
                .await;
        }
        ClientEventDto::TypingStop(payload) => {
            let Some(conversation_id) =
                parse_conversation_id(state, session, payload.conversation_id).await
            else {
                return;
            };
            state
                .relay_typing_usecase
                .stop(conversation_id, session.user_id.clone())
                .await;
        }
    }
}

/// Convert a raw id into a ConversationId, replying INVALID_PAYLOAD on failure
async fn parse_conversation_id(
    state: &AppState,
    session: &ConnectedSession,
    raw: String,
) -> Option<ConversationId> {
    match ConversationId::new(raw) {
        Ok(conversation_id) => Some(conversation_id),
        Err(e) => {
            reply_error(state, session, ErrorCode::InvalidPayload, e.to_string()).await;
            None
        }
    }
}

/// Report a failure to the originating connection only
async fn reply_error(
    state: &AppState,
    session: &ConnectedSession,
    code: ErrorCode,
    message: impl Into<String>,
) {
    let event = code.to_event(message);
    if let Err(e) = state
        .message_pusher
        .push_to(&session.connection_id, &event)
        .await
    {
        tracing::warn!(
            "Failed to report {} to {}: {}",
            code,
            session.connection_id,
            e
        );
    }
}
