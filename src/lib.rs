//! Zombie Chess Game Server Library
//!
//! An authoritative WebSocket server for two-player zombie chess, built with
//! tokio-tungstenite using the Actor pattern for state management.
//!
//! # Features
//! - Move generation: steps, stacking, multi-stack ray jumps, afterlife sacrifices
//! - Capture scoring, supply return and jump combos
//! - Turn state machine with server-side validation of every intent
//! - Room creation/joining with paired and single-controller modes
//! - Seat reservation across reconnects with a timed grace window
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `GameServer` is the central actor owning the room registry and all sessions
//! - Each connection has a `handler` task communicating with the server
//! - No locks needed - all state access goes through message passing
//!
//! # Example
//! ```ignore
//! use tokio::net::TcpListener;
//! use tokio::sync::mpsc;
//! use zombie_chess_server::{GameServer, ServerSettings, handle_connection};
//!
//! #[tokio::main]
//! async fn main() {
//!     let listener = TcpListener::bind("127.0.0.1:3000").await.unwrap();
//!     let (cmd_tx, cmd_rx) = mpsc::channel(256);
//!
//!     let server = GameServer::new(cmd_rx, cmd_tx.downgrade(), ServerSettings::default());
//!     tokio::spawn(server.run());
//!
//!     while let Ok((stream, _)) = listener.accept().await {
//!         let cmd_tx = cmd_tx.clone();
//!         tokio::spawn(handle_connection(stream, cmd_tx));
//!     }
//! }
//! ```

pub mod apply;
pub mod board;
pub mod client;
pub mod config;
pub mod error;
pub mod handler;
pub mod message;
pub mod movegen;
pub mod registry;
pub mod room;
pub mod server;
pub mod session;
pub mod types;

// Re-export main types for convenience
pub use board::{Board, Piece, PieceType, Position, Stack};
pub use client::Client;
pub use config::{ServerConfig, ServerSettings};
pub use error::{AppError, GameError, SendError};
pub use handler::handle_connection;
pub use message::{ClientMessage, ServerMessage};
pub use movegen::{generate_moves, Move, MoveKind};
pub use registry::{JoinIntent, JoinRequest, RoomRegistry};
pub use room::{Room, RoomMode};
pub use server::{GameServer, ServerCommand};
pub use session::{GameAction, GameSession, SessionSnapshot};
pub use types::{ClientId, PlayerId, RoomId, Side};
