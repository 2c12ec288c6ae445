//! メッセージ送信（通知）の実装
//!
//! - `websocket`: WebSocket コネクションごとの送信チャンネルを使った実装
//! - 複数プロセス構成にする場合は、ここに配信バスの実装を追加する

pub mod websocket;

pub use websocket::WebSocketMessagePusher;
