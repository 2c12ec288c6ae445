//! Realtime message delivery and presence server.
//!
//! Run with:
//! ```not_rust
//! JWT_SECRET=change-me cargo run --bin hiroba-server
//! cargo run --bin hiroba-server -- --host 0.0.0.0 --port 3000 --jwt-secret change-me
//! cargo run --bin hiroba-server -- --jwt-secret change-me --profiles profiles.json
//! ```

use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use hiroba_server::{
    infrastructure::auth::JwtTokenVerifier,
    ui::{AppState, Server, seed::load_profiles},
};
use hiroba_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "hiroba-server")]
#[command(about = "Realtime message delivery and presence server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "HIROBA_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "HIROBA_PORT", default_value = "8080")]
    port: u16,

    /// HS256 secret used to verify access tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: String,

    /// JSON file of user profiles (id, name, avatar) used to resolve message senders
    #[arg(long, env = "HIROBA_PROFILES")]
    profiles: Option<PathBuf>,

    /// Default log level when RUST_LOG is not set
    #[arg(long, env = "HIROBA_LOG_LEVEL", default_value = "debug")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    // Initialize dependencies in order:
    // 1. TokenVerifier and Clock
    // 2. Repositories, MessagePusher and UseCases
    // 3. Server
    let verifier = Arc::new(JwtTokenVerifier::new(&args.jwt_secret));
    let profiles = match args.profiles.as_deref().map(load_profiles).transpose() {
        Ok(profiles) => profiles.unwrap_or_default(),
        Err(e) => {
            tracing::error!("Failed to load profiles: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!("Loaded {} user profile(s)", profiles.len());
    let state = AppState::in_memory_with_profiles(verifier, Arc::new(SystemClock), profiles);

    let server = Server::new(state);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
