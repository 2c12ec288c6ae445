//! JWT (HS256) を使った TokenVerifier 実装
//!
//! トークンの発行は認証コラボレーター（REST 層）の責務ですが、
//! テストやローカル開発用に同じ鍵での発行も提供します。

use std::time::Duration;

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use crate::domain::{AuthError, TokenVerifier, UserId};

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Expiration time (Unix timestamp, seconds)
    pub exp: u64,
    /// Issued at (Unix timestamp, seconds)
    pub iat: u64,
}

pub struct JwtTokenVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtTokenVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// `ttl` 秒後に失効するアクセストークンを発行
    pub fn issue_token(
        &self,
        user_id: &UserId,
        ttl: Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = unix_now();
        self.encode_claims(&Claims {
            sub: user_id.as_str().to_string(),
            exp: now + ttl.as_secs(),
            iat: now,
        })
    }

    pub fn encode_claims(&self, claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
    }
}

impl TokenVerifier for JwtTokenVerifier {
    fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        UserId::new(data.claims.sub)
            .map_err(|e| AuthError::InvalidToken(format!("invalid subject: {}", e)))
    }
}

fn unix_now() -> u64 {
    u64::try_from(hiroba_shared::time::get_utc_timestamp() / 1000).unwrap_or_default()
}
