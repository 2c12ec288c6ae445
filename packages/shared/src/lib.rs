//! Hiroba の各パッケージで共有するユーティリティ
//!
//! - `logger`: tracing subscriber の初期化
//! - `time`: Clock 抽象とタイムスタンプ変換

pub mod logger;
pub mod time;
