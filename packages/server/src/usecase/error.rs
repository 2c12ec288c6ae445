//! UseCase 層のエラー型
//!
//! 全てのエラーは [`ErrorCode`] のいずれかに分類され、要求元のコネクションにのみ通知されます。

use std::fmt;

use thiserror::Error;

use crate::domain::{AuthError, MessageId, RepositoryError, ServerEvent};

/// クライアントに返す機械可読なエラー分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    AuthenticationFailure,
    InvalidPayload,
    PersistenceFailure,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::AuthenticationFailure => "AUTHENTICATION_FAILURE",
            ErrorCode::InvalidPayload => "INVALID_PAYLOAD",
            ErrorCode::PersistenceFailure => "PERSISTENCE_FAILURE",
        }
    }

    /// 要求元に返す `error` イベントを作る
    pub fn to_event(self, message: impl Into<String>) -> ServerEvent {
        ServerEvent::Error {
            code: self.as_str().to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 接続（ハンドシェイク）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("authentication failed: {0}")]
    AuthenticationFailure(#[from] AuthError),
}

impl ConnectError {
    pub fn code(&self) -> ErrorCode {
        ErrorCode::AuthenticationFailure
    }
}

/// メッセージ送信のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("failed to persist message: {0}")]
    PersistenceFailure(#[from] RepositoryError),

    /// メッセージ自体は保存済みだが、配信前の更新に失敗した。再送すると重複する
    #[error("message {message_id} was stored but not delivered: {source}")]
    StoredNotDelivered {
        message_id: MessageId,
        source: RepositoryError,
    },
}

impl SendMessageError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SendMessageError::InvalidPayload(_) => ErrorCode::InvalidPayload,
            SendMessageError::PersistenceFailure(_)
            | SendMessageError::StoredNotDelivered { .. } => ErrorCode::PersistenceFailure,
        }
    }
}

/// ステータス一括更新（配信済み・既読）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    #[error("failed to update message status: {0}")]
    PersistenceFailure(#[from] RepositoryError),
}

impl ReconcileError {
    pub fn code(&self) -> ErrorCode {
        ErrorCode::PersistenceFailure
    }
}

/// 履歴取得・非表示のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageHistoryError {
    #[error("message not found: {0}")]
    MessageNotFound(String),

    #[error("storage failure: {0}")]
    PersistenceFailure(RepositoryError),
}

impl From<RepositoryError> for MessageHistoryError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::MessageNotFound(id) => MessageHistoryError::MessageNotFound(id),
            other => MessageHistoryError::PersistenceFailure(other),
        }
    }
}

impl MessageHistoryError {
    pub fn code(&self) -> ErrorCode {
        match self {
            MessageHistoryError::MessageNotFound(_) => ErrorCode::InvalidPayload,
            MessageHistoryError::PersistenceFailure(_) => ErrorCode::PersistenceFailure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let invalid = SendMessageError::InvalidPayload("content must not be empty".to_string());
        let persistence =
            SendMessageError::PersistenceFailure(RepositoryError::Unavailable("down".to_string()));
        let auth = ConnectError::from(AuthError::Expired);

        assert_eq!(invalid.code().as_str(), "INVALID_PAYLOAD");
        assert_eq!(persistence.code().as_str(), "PERSISTENCE_FAILURE");
        assert_eq!(auth.code().as_str(), "AUTHENTICATION_FAILURE");
    }

    #[test]
    fn test_to_event_builds_error_event() {
        let event = ErrorCode::InvalidPayload.to_event("bad");

        assert_eq!(
            event,
            ServerEvent::Error {
                code: "INVALID_PAYLOAD".to_string(),
                message: "bad".to_string(),
            }
        );
    }

    #[test]
    fn test_stored_not_delivered_names_the_message() {
        let error = SendMessageError::StoredNotDelivered {
            message_id: MessageId::new("m42".to_string()).unwrap(),
            source: RepositoryError::Unavailable("down".to_string()),
        };

        assert_eq!(error.code(), ErrorCode::PersistenceFailure);
        assert_eq!(
            error.to_string(),
            "message m42 was stored but not delivered: storage unavailable: down"
        );
    }

    #[test]
    fn test_history_error_maps_not_found() {
        let error = MessageHistoryError::from(RepositoryError::MessageNotFound("m1".to_string()));

        assert_eq!(error, MessageHistoryError::MessageNotFound("m1".to_string()));
        assert_eq!(error.code(), ErrorCode::InvalidPayload);
    }
}
