//! Zombie chess game server - Entry Point
//!
//! Starts the TCP listener and GameServer actor, accepting connections.

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use zombie_chess_server::{handle_connection, GameServer, ServerConfig};

/// Channel buffer size for server commands
const CHANNEL_BUFFER_SIZE: usize = 256;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=zombie_chess_server=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("zombie_chess_server=info")),
        )
        .init();

    let config = ServerConfig::parse();
    let addr = config.addr();

    let listener = TcpListener::bind(&addr).await?;
    info!("Zombie chess server listening on {}", addr);

    // Create GameServer actor channel and start
    let (cmd_tx, cmd_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
    let server = GameServer::new(cmd_rx, cmd_tx.downgrade(), config.settings());
    tokio::spawn(server.run());

    info!(
        "GameServer actor started (reconnect window {}s)",
        config.reconnect_window_secs
    );

    // Connection accept loop
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!("New connection from {}", addr);
                let cmd_tx = cmd_tx.clone();

                // Spawn handler task for each connection
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, cmd_tx).await {
                        error!("Connection handler error: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
