//! Message protocol definitions
//!
//! JSON frames shaped as `{"event": <name>, "data": <payload>}`, using
//! Serde's adjacently tagged enums for type-safe (de)serialization.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::registry::JoinIntent;
use crate::room::{RoomMode, RoomSummary, RosterEntry};
use crate::session::{GameAction, SessionSnapshot};
use crate::types::{RoomId, Side};

/// Client → Server message
#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Create, join or resume a room
    #[serde(rename_all = "camelCase")]
    JoinRoom {
        #[serde(default)]
        room_id: String,
        #[serde(default)]
        mode: RoomMode,
        action: JoinIntent,
        #[serde(default)]
        player_id: Option<String>,
        #[serde(default)]
        nickname: Option<String>,
    },
    /// Drive the game state machine
    #[serde(rename_all = "camelCase")]
    GameAction { room_id: String, action: GameAction },
    /// Request the lobby list
    GetRooms,
    /// Free-form message relayed to the room
    #[serde(rename_all = "camelCase")]
    PlayerAction { room_id: String, message: String },
}

/// Server → Client message
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Lobby view
    RoomsUpdated(Vec<RoomSummary>),
    /// Seat confirmation
    #[serde(rename_all = "camelCase")]
    PlayerAssigned {
        player_num: Side,
        room_id: RoomId,
        room_mode: RoomMode,
        is_solo_host: bool,
    },
    /// Roster of the room
    PlayerListUpdated(Vec<RosterEntry>),
    /// Authoritative game state
    StateUpdated(Box<SessionSnapshot>),
    /// Seats filled, or the solo session is ready
    GameStart { msg: String },
    /// A seat lost its connection and is held for a while
    #[serde(rename_all = "camelCase")]
    PlayerDisconnected {
        nickname: String,
        player_num: Side,
        countdown_seconds: u64,
    },
    /// Relayed chat or move log line
    PlayerAction { message: String },
    /// Rejected request
    ErrorMsg(String),
}

/// Convert AppError to ServerMessage for client notification
impl From<AppError> for ServerMessage {
    fn from(err: AppError) -> Self {
        let message = match &err {
            AppError::InvalidRoomId => "Invalid room id".to_string(),
            AppError::RoomNotFound(room_id) => {
                format!("Room '{}' does not exist, please refresh the list", room_id)
            }
            AppError::RoomExists(room_id) => {
                format!("Room '{}' already exists, join it instead", room_id)
            }
            AppError::RoomNotReady => "Room is not ready yet".to_string(),
            AppError::RoomFull => "Room is full".to_string(),
            AppError::ModeMismatch => "Room mode does not match".to_string(),
            AppError::SoloRoomPrivate => "This is a single-player room".to_string(),
            AppError::NotInRoom => "You are not in this room".to_string(),
            AppError::NotYourTurn => "It is not your turn".to_string(),
            AppError::WaitingForOpponent => "Waiting for an opponent".to_string(),
            AppError::Json(e) => format!("Invalid message format: {}", e),
            // Fatal errors are not typically converted (connection closes)
            _ => "Internal error".to_string(),
        };
        ServerMessage::ErrorMsg(message)
    }
}
