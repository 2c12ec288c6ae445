//! 認証コラボレーターのインターフェース

use super::{AuthError, UserId};

/// ハンドシェイク時に一度だけ呼ばれるトークン検証
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<UserId, AuthError>;
}
