//! Basic type definitions for the game server
//!
//! Provides newtype wrappers for type safety:
//! - `ClientId`: UUID-based transient connection identifier
//! - `PlayerId`: stable player identity that survives reconnects
//! - `RoomId`: client-chosen room name
//! - `Side`: one of the two seats, also used for turn order and piece ownership
//! - `Coord`: a board cell

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique connection identifier (newtype pattern)
///
/// Wraps a UUID v4. A new one is issued for every socket, so a player who
/// reconnects gets a different `ClientId` but keeps their `PlayerId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(pub Uuid);

impl ClientId {
    /// Create a new random client ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable player identity supplied by the client
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Resolve the identity for a join request, falling back to the connection id
    pub fn resolve(requested: Option<String>, client_id: ClientId) -> Self {
        match requested.map(|id| id.trim().to_string()) {
            Some(id) if !id.is_empty() => Self(id),
            _ => Self(client_id.to_string()),
        }
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Room identifier as typed by the players
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    /// Create a RoomId from user input (surrounding whitespace is dropped)
    pub fn from_string(id: String) -> Self {
        Self(id.trim().to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One of the two sides of the board
///
/// Serialized as the seat number `1` or `2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Side {
    One,
    Two,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::One, Side::Two];

    pub fn opponent(self) -> Self {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Side::One => 1,
            Side::Two => 2,
        }
    }
}

impl From<Side> for u8 {
    fn from(side: Side) -> Self {
        side.number()
    }
}

impl TryFrom<u8> for Side {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Side::One),
            2 => Ok(Side::Two),
            other => Err(format!("invalid side {}", other)),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.number())
    }
}

/// Board coordinate, 0-based `(row, col)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub r: usize,
    pub c: usize,
}

impl Coord {
    pub const fn new(r: usize, c: usize) -> Self {
        Self { r, c }
    }

    /// Step `distance` cells along `(dr, dc)`, or `None` when leaving `size`×`size`
    pub fn offset(self, dr: isize, dc: isize, distance: usize, size: usize) -> Option<Coord> {
        let r = self.r as isize + dr * distance as isize;
        let c = self.c as isize + dc * distance as isize;
        let size = size as isize;
        if (0..size).contains(&r) && (0..size).contains(&c) {
            Some(Coord::new(r as usize, c as usize))
        } else {
            None
        }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.r, self.c)
    }
}
