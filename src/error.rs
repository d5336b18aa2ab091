//! Error types for the game server
//!
//! Defines protocol-level errors, rejected game actions and message send errors.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

use crate::board::PieceType;
use crate::types::{Coord, RoomId};

/// Application-level errors
///
/// Covers both fatal errors (connection termination) and
/// protocol errors (send `errorMsg` to the offending client).
#[derive(Debug, Error)]
pub enum AppError {
    /// WebSocket protocol error (fatal)
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error (fatal)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Channel send error (fatal - internal channel broken)
    #[error("Channel send error")]
    ChannelSend,

    /// Missing or blank room identifier
    #[error("Invalid room id")]
    InvalidRoomId,

    /// `join` intent for a room that does not exist
    #[error("Room not found: {0}")]
    RoomNotFound(RoomId),

    /// `create` intent for a room that already exists
    #[error("Room already exists: {0}")]
    RoomExists(RoomId),

    /// Room exists but nobody holds a seat yet
    #[error("Room is not ready")]
    RoomNotReady,

    /// Room already has 2 seats taken
    #[error("Room is full")]
    RoomFull,

    /// Paired and single-controller modes cannot share a room
    #[error("Room mode mismatch")]
    ModeMismatch,

    /// Single-controller room owned by another player
    #[error("Room is private to its host")]
    SoloRoomPrivate,

    /// Connection holds no seat in the room
    #[error("Not in room")]
    NotInRoom,

    /// Acting connection does not control the side to move
    #[error("Not your turn")]
    NotYourTurn,

    /// Paired room still missing its second player
    #[error("Waiting for opponent")]
    WaitingForOpponent,
}

/// Reasons a game action is rejected
///
/// These never reach the client as errors; the session is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("game is over")]
    GameOver,

    #[error("a jump combo is in progress")]
    ComboInProgress,

    #[error("no jump combo to end")]
    NotInCombo,

    #[error("cell {0} is off the board")]
    OutOfBounds(Coord),

    #[error("cell {0} is not controlled by the side to move")]
    NotOwnStack(Coord),

    #[error("no stack selected")]
    NoSelection,

    #[error("{0} is not a legal destination")]
    IllegalMove(Coord),

    #[error("no revive piece selected")]
    NoReviveSelected,

    #[error("no {0:?} left in supply")]
    SupplyExhausted(PieceType),

    #[error("cell {0} is occupied")]
    CellOccupied(Coord),

    #[error("cell {0} is in the afterlife ring")]
    AfterlifeCell(Coord),
}

/// Message send errors
///
/// Occurs when attempting to send messages through closed channels.
#[derive(Debug, Error)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,
}
