//! Server state and dependency wiring.

use std::{collections::HashMap, sync::Arc};

use hiroba_shared::time::Clock;
use tokio::sync::Mutex;

use crate::{
    domain::{MessagePusher, TokenVerifier, UserProfile},
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{
            InMemoryConnectionRepository, InMemoryConversationRepository,
            InMemoryMessageRepository, InMemoryRoomRepository, InMemoryUserRepository,
        },
    },
    usecase::{
        ConnectUserUseCase, DisconnectUserUseCase, GetPresenceUseCase, JoinConversationUseCase,
        LeaveConversationUseCase, MarkConversationReadUseCase, MessageHistoryUseCase,
        RelayTypingUseCase, SendMessageUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// MessagePusher（エラー通知を要求元に返すために使用）
    pub message_pusher: Arc<dyn MessagePusher>,
    pub connect_user_usecase: Arc<ConnectUserUseCase>,
    pub disconnect_user_usecase: Arc<DisconnectUserUseCase>,
    pub join_conversation_usecase: Arc<JoinConversationUseCase>,
    pub leave_conversation_usecase: Arc<LeaveConversationUseCase>,
    pub send_message_usecase: Arc<SendMessageUseCase>,
    pub mark_conversation_read_usecase: Arc<MarkConversationReadUseCase>,
    pub relay_typing_usecase: Arc<RelayTypingUseCase>,
    pub get_presence_usecase: Arc<GetPresenceUseCase>,
    pub message_history_usecase: Arc<MessageHistoryUseCase>,
}

impl AppState {
    /// Wire every use case against in-memory storage and the WebSocket pusher.
    pub fn in_memory(verifier: Arc<dyn TokenVerifier>, clock: Arc<dyn Clock>) -> Self {
        Self::in_memory_with_profiles(verifier, clock, Vec::new())
    }

    /// Same as [`AppState::in_memory`], with the user store pre-populated so
    /// message senders resolve to their display name and avatar.
    pub fn in_memory_with_profiles(
        verifier: Arc<dyn TokenVerifier>,
        clock: Arc<dyn Clock>,
        profiles: impl IntoIterator<Item = UserProfile>,
    ) -> Self {
        // 1. Repositories (in-memory)
        let connections = Arc::new(InMemoryConnectionRepository::default());
        let rooms = Arc::new(InMemoryRoomRepository::default());
        let messages = Arc::new(InMemoryMessageRepository::default());
        let conversations = Arc::new(InMemoryConversationRepository::default());
        let users = Arc::new(InMemoryUserRepository::with_profiles(profiles));

        // 2. MessagePusher (WebSocket implementation)
        let message_pusher = Arc::new(WebSocketMessagePusher::new(Arc::new(Mutex::new(
            HashMap::new(),
        ))));

        // 3. UseCases
        Self {
            message_pusher: message_pusher.clone(),
            connect_user_usecase: Arc::new(ConnectUserUseCase::new(
                verifier,
                connections.clone(),
                message_pusher.clone(),
            )),
            disconnect_user_usecase: Arc::new(DisconnectUserUseCase::new(
                connections.clone(),
                rooms.clone(),
                users.clone(),
                message_pusher.clone(),
                clock.clone(),
            )),
            join_conversation_usecase: Arc::new(JoinConversationUseCase::new(
                rooms.clone(),
                messages.clone(),
                message_pusher.clone(),
                clock.clone(),
            )),
            leave_conversation_usecase: Arc::new(LeaveConversationUseCase::new(
                rooms.clone(),
                message_pusher.clone(),
            )),
            send_message_usecase: Arc::new(SendMessageUseCase::new(
                messages.clone(),
                conversations,
                users.clone(),
                rooms.clone(),
                message_pusher.clone(),
                clock.clone(),
            )),
            mark_conversation_read_usecase: Arc::new(MarkConversationReadUseCase::new(
                rooms.clone(),
                messages.clone(),
                message_pusher.clone(),
                clock,
            )),
            relay_typing_usecase: Arc::new(RelayTypingUseCase::new(rooms, message_pusher)),
            get_presence_usecase: Arc::new(GetPresenceUseCase::new(connections)),
            message_history_usecase: Arc::new(MessageHistoryUseCase::new(messages, users)),
        }
    }
}
