//! ドメイン層のエラー型

use thiserror::Error;

/// Value Object の生成エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{field} must not exceed {max} characters (got {actual})")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
}

/// ストレージ（永続化コラボレーター）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("message not found: {0}")]
    MessageNotFound(String),
}

/// MessagePusher のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("connection not found: {0}")]
    ConnectionNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),

    #[error("failed to encode event: {0}")]
    EncodeFailed(String),
}

/// ハンドシェイク時の認証エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("authentication token missing")]
    MissingToken,

    #[error("authentication token expired")]
    Expired,

    #[error("invalid authentication token: {0}")]
    InvalidToken(String),
}
