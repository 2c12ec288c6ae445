//! Logging setup utilities for the Hiroba binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build the default filter directive used when `RUST_LOG` is not set.
///
/// Both the library crates and the binary are enabled at `default_log_level`.
pub fn default_directive(binary_name: &str, default_log_level: &str) -> String {
    format!(
        "hiroba_server={level},hiroba_shared={level},{binary}={level},tower_http={level}",
        level = default_log_level,
        binary = binary_name.replace('-', "_"),
    )
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// The log level can be overridden using the `RUST_LOG` environment variable.
///
/// # Examples
///
/// ```no_run
/// use hiroba_shared::logger::setup_logger;
///
/// setup_logger("hiroba-server", "debug");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_covers_crates_and_binary() {
        // テスト項目: デフォルトのフィルタにライブラリとバイナリの両方が含まれる
        // given (前提条件):
        let binary = "hiroba-server";

        // when (操作):
        let directive = default_directive(binary, "info");

        // then (期待する結果):
        assert!(directive.contains("hiroba_server=info"));
        assert!(directive.contains("hiroba_shared=info"));
        assert!(directive.contains("tower_http=info"));
    }
}
