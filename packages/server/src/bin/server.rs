//! Room membership server.
//!
//! Clients join named rooms over WebSocket and every member is notified
//! whenever the member list of one of its rooms changes.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroma-server
//! cargo run --bin hiroma-server -- --host 0.0.0.0 --port 3000 --max-rooms 4 --max-room-size 8
//! MAX_ROOMS=4 MAX_ROOM_SIZE=8 PORT=3000 cargo run --bin hiroma-server
//! ```

use clap::Parser;
use hiroma_server::{
    config::{
        DEFAULT_IDLE_TIMEOUT_SECS, DEFAULT_PING_INTERVAL_SECS, HeartbeatConfig, ServerConfig,
    },
    domain::{
        RoomLimits,
        registry::{DEFAULT_MAX_ROOM_SIZE, DEFAULT_MAX_ROOMS},
    },
    ui::Server,
};
use hiroma_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "hiroma-server")]
#[command(about = "WebSocket room membership server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Maximum number of rooms that may exist at the same time
    #[arg(long, env = "MAX_ROOMS", default_value_t = DEFAULT_MAX_ROOMS)]
    max_rooms: usize,

    /// Maximum number of members per room
    #[arg(long, env = "MAX_ROOM_SIZE", default_value_t = DEFAULT_MAX_ROOM_SIZE)]
    max_room_size: usize,

    /// Seconds between heartbeat pings (0 disables pings)
    #[arg(long, env = "PING_INTERVAL_SECS", default_value_t = DEFAULT_PING_INTERVAL_SECS)]
    ping_interval_secs: u64,

    /// Seconds of silence after which a connection is dropped (0 disables the timeout)
    #[arg(long, env = "IDLE_TIMEOUT_SECS", default_value_t = DEFAULT_IDLE_TIMEOUT_SECS)]
    idle_timeout_secs: u64,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            limits: RoomLimits {
                max_rooms: args.max_rooms,
                max_room_size: args.max_room_size,
            },
            heartbeat: HeartbeatConfig::from_secs(args.ping_interval_secs, args.idle_timeout_secs),
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let config = ServerConfig::from(Args::parse());
    if let Err(e) = config.validate() {
        tracing::error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }
    tracing::info!(
        "Limits: max_rooms={}, max_room_size={}",
        config.limits.max_rooms,
        config.limits.max_room_size
    );

    let server = Server::from_config(&config);
    if let Err(e) = server.run(config.host, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
