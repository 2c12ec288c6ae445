//! 認証コラボレーターの実装

pub mod jwt;

pub use jwt::{Claims, JwtTokenVerifier};
