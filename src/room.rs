//! Room struct definition
//!
//! A room holds up to two player seats, the declared mode and the game session.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::error::AppError;
use crate::session::GameSession;
use crate::types::{ClientId, PlayerId, RoomId, Side};

/// How the seats of a room are controlled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoomMode {
    /// Two players, one seat each
    #[default]
    Multi,
    /// One player against the computer
    Solo,
    /// One player watching simulated bots
    SimBots,
    /// Computer against computer
    BotsVsBots,
}

impl RoomMode {
    /// Single-controller modes, where one identity drives both sides
    pub fn is_solo(self) -> bool {
        !matches!(self, RoomMode::Multi)
    }

    /// Seats offered in the lobby
    pub fn max_players(self) -> usize {
        if self.is_solo() {
            1
        } else {
            2
        }
    }

    /// Whether a request for `requested` may enter a room of this mode
    pub fn admits(self, requested: RoomMode) -> bool {
        if self.is_solo() {
            self == requested
        } else {
            !requested.is_solo()
        }
    }
}

/// One seat, bound to a stable identity across reconnects
#[derive(Debug, Clone)]
pub struct PlayerSlot {
    pub player_id: PlayerId,
    /// Current socket, `None` while disconnected
    pub connection: Option<ClientId>,
    pub num: Side,
    pub nickname: String,
    pub disconnected_at: Option<Instant>,
}

impl PlayerSlot {
    pub fn new(player_id: PlayerId, connection: ClientId, num: Side, nickname: String) -> Self {
        Self {
            player_id,
            connection: Some(connection),
            num,
            nickname,
            disconnected_at: None,
        }
    }

    /// Nickname, or `P1`/`P2` when none was given
    pub fn display_name(&self) -> String {
        if self.nickname.is_empty() {
            self.num.to_string()
        } else {
            self.nickname.clone()
        }
    }

    /// Rebind to a new socket after a reconnect
    pub fn reconnect(&mut self, connection: ClientId, nickname: String) {
        self.connection = Some(connection);
        self.disconnected_at = None;
        self.nickname = nickname;
    }

    pub fn disconnect(&mut self, now: Instant) {
        self.connection = None;
        self.disconnected_at = Some(now);
    }

    /// Disconnected for at least `window` as of `now`
    pub fn is_stale(&self, now: Instant, window: Duration) -> bool {
        self.disconnected_at
            .is_some_and(|at| now.saturating_duration_since(at) >= window)
    }
}

/// Lobby entry for one room
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub room_id: RoomId,
    pub players: usize,
    pub mode: RoomMode,
    pub max_players: usize,
    pub can_join: bool,
}

/// Roster entry for one seat
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterEntry {
    pub num: Side,
    pub nickname: String,
}

/// Game room
///
/// Seats are kept in join order. In single-controller modes the host
/// controls both sides.
#[derive(Debug)]
pub struct Room {
    pub id: RoomId,
    pub mode: RoomMode,
    /// Identity that owns a single-controller room
    pub host: Option<PlayerId>,
    pub players: Vec<PlayerSlot>,
    pub session: GameSession,
}

impl Room {
    /// Create an empty room with a fresh game
    pub fn new(id: RoomId, mode: RoomMode) -> Self {
        Self {
            id,
            mode,
            host: None,
            players: Vec::new(),
            session: GameSession::new(),
        }
    }

    pub fn is_solo(&self) -> bool {
        self.mode.is_solo()
    }

    /// Check if no seats are held
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Check if both seats are taken
    pub fn is_full(&self) -> bool {
        self.players.len() >= 2
    }

    pub fn is_host(&self, player_id: &PlayerId) -> bool {
        self.host.as_ref() == Some(player_id)
    }

    /// Drop seats whose grace window has run out, returning them
    pub fn purge_stale(&mut self, now: Instant, window: Duration) -> Vec<PlayerSlot> {
        let (stale, kept): (Vec<_>, Vec<_>) = self
            .players
            .drain(..)
            .partition(|slot| slot.is_stale(now, window));
        self.players = kept;
        stale
    }

    pub fn find_player_mut(&mut self, player_id: &PlayerId) -> Option<&mut PlayerSlot> {
        self.players.iter_mut().find(|slot| &slot.player_id == player_id)
    }

    pub fn slot_for(&self, client_id: ClientId) -> Option<&PlayerSlot> {
        self.players
            .iter()
            .find(|slot| slot.connection == Some(client_id))
    }

    /// Lowest seat number nobody holds
    pub fn free_seat(&self) -> Option<Side> {
        Side::BOTH
            .into_iter()
            .find(|side| self.players.iter().all(|slot| slot.num != *side))
    }

    /// Seat a new player
    ///
    /// Returns the seat, or `RoomFull` when both are taken.
    pub fn add_player(
        &mut self,
        player_id: PlayerId,
        connection: ClientId,
        nickname: String,
    ) -> Result<Side, AppError> {
        if self.is_full() {
            return Err(AppError::RoomFull);
        }
        let num = self.free_seat().ok_or(AppError::RoomFull)?;
        if self.is_solo() {
            self.host = Some(player_id.clone());
        }
        self.players
            .push(PlayerSlot::new(player_id, connection, num, nickname));
        Ok(num)
    }

    /// Whether the game can start: both seats, or the solo host
    pub fn is_ready(&self) -> bool {
        if self.is_solo() {
            !self.is_empty()
        } else {
            self.is_full()
        }
    }

    /// Check that `client_id` may act for the side to move
    pub fn authorize(&self, client_id: ClientId) -> Result<(), AppError> {
        let slot = self.slot_for(client_id).ok_or(AppError::NotInRoom)?;
        if self.is_solo() {
            return if self.is_host(&slot.player_id) {
                Ok(())
            } else {
                Err(AppError::NotYourTurn)
            };
        }
        if !self.is_full() {
            return Err(AppError::WaitingForOpponent);
        }
        if slot.num == self.session.turn() {
            Ok(())
        } else {
            Err(AppError::NotYourTurn)
        }
    }

    /// Sockets currently attached to this room
    pub fn connections(&self) -> Vec<ClientId> {
        self.players.iter().filter_map(|slot| slot.connection).collect()
    }

    pub fn roster(&self) -> Vec<RosterEntry> {
        self.players
            .iter()
            .map(|slot| RosterEntry {
                num: slot.num,
                nickname: slot.nickname.clone(),
            })
            .collect()
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            room_id: self.id.clone(),
            players: self.players.len(),
            mode: self.mode,
            max_players: self.mode.max_players(),
            can_join: !self.is_solo() && !self.is_full(),
        }
    }
}
