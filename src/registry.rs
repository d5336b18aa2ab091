//! Room registry and reconnection bookkeeping
//!
//! Owns every live room, keyed by `RoomId`. Joining is explicit: a caller
//! either creates a room that must not exist yet or joins one that must.
//! Disconnected seats are kept for a grace window so the same player
//! identity can reclaim them from a new connection.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::error::AppError;
use crate::room::{PlayerSlot, Room, RoomMode, RoomSummary};
use crate::types::{ClientId, PlayerId, RoomId, Side};

/// Default reconnect grace window
pub const RECONNECT_WINDOW: Duration = Duration::from_secs(60);

/// Declared intent of a join request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinIntent {
    Create,
    Join,
}

/// A validated-shape join request
#[derive(Debug, Clone)]
pub struct JoinRequest {
    pub room_id: RoomId,
    pub mode: RoomMode,
    pub intent: JoinIntent,
    pub player_id: PlayerId,
    pub nickname: String,
}

/// Seat granted by a successful join
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    pub room_id: RoomId,
    pub player_num: Side,
    pub mode: RoomMode,
    pub is_solo_host: bool,
    /// The identity already held this seat
    pub reconnected: bool,
    /// Seats are filled (or the solo host is in) and the game can start
    pub ready: bool,
}

/// Seat that just lost its connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisconnectNotice {
    pub room_id: RoomId,
    pub nickname: String,
    pub player_num: Side,
}

/// Result of re-checking one room after a grace window
#[derive(Debug)]
pub enum CleanupOutcome {
    /// Room no longer exists
    Missing,
    /// Every seat expired and the room was deleted
    Removed,
    /// Some seats expired, the room lives on
    Evicted(Vec<PlayerSlot>),
    /// Nothing expired
    Unchanged,
}

/// All live rooms
#[derive(Debug)]
pub struct RoomRegistry {
    rooms: HashMap<RoomId, Room>,
    reconnect_window: Duration,
}

impl RoomRegistry {
    pub fn new(reconnect_window: Duration) -> Self {
        Self {
            rooms: HashMap::new(),
            reconnect_window,
        }
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn contains(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    pub fn get(&self, room_id: &RoomId) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    pub fn get_mut(&mut self, room_id: &RoomId) -> Option<&mut Room> {
        self.rooms.get_mut(room_id)
    }

    /// Register a new empty room
    pub fn create(&mut self, room_id: RoomId, mode: RoomMode) -> Result<&mut Room, AppError> {
        if room_id.is_empty() {
            return Err(AppError::InvalidRoomId);
        }
        if self.rooms.contains_key(&room_id) {
            return Err(AppError::RoomExists(room_id));
        }
        info!("Room {} created ({:?})", room_id, mode);
        Ok(self
            .rooms
            .entry(room_id.clone())
            .or_insert_with(|| Room::new(room_id, mode)))
    }

    pub fn remove(&mut self, room_id: &RoomId) -> Option<Room> {
        let removed = self.rooms.remove(room_id);
        if removed.is_some() {
            info!("Room {} deleted", room_id);
        }
        removed
    }

    /// Create, join or resume a seat
    ///
    /// On error nothing changes apart from expiring stale seats of the room.
    pub fn join(
        &mut self,
        request: JoinRequest,
        client_id: ClientId,
        now: Instant,
    ) -> Result<JoinOutcome, AppError> {
        let JoinRequest {
            room_id,
            mode,
            intent,
            player_id,
            nickname,
        } = request;

        if room_id.is_empty() {
            return Err(AppError::InvalidRoomId);
        }

        let exists = self.rooms.contains_key(&room_id);
        match (exists, intent) {
            (false, JoinIntent::Join) => return Err(AppError::RoomNotFound(room_id)),
            (true, JoinIntent::Create) => return Err(AppError::RoomExists(room_id)),
            _ => {}
        }

        if !exists {
            let room = self.create(room_id, mode)?;
            let player_num = room.add_player(player_id.clone(), client_id, nickname)?;
            info!(
                "Player {} ({}) created room {} as {}",
                player_id, client_id, room.id, player_num
            );
            return Ok(Self::outcome(room, &player_id, player_num, false));
        }

        let window = self.reconnect_window;
        let Some(room) = self.rooms.get_mut(&room_id) else {
            return Err(AppError::RoomNotFound(room_id));
        };

        if !room.mode.admits(mode) {
            return Err(AppError::ModeMismatch);
        }

        let expired = room.purge_stale(now, window);
        if !expired.is_empty() {
            debug!("Room {}: {} stale seat(s) expired", room.id, expired.len());
        }

        if room.is_solo() && room.host.as_ref().is_some_and(|host| host != &player_id) {
            return Err(AppError::SoloRoomPrivate);
        }

        if room.is_empty() && intent == JoinIntent::Join {
            return Err(AppError::RoomNotReady);
        }

        if let Some(slot) = room.find_player_mut(&player_id) {
            slot.reconnect(client_id, nickname);
            let player_num = slot.num;
            info!(
                "Player {} ({}) reconnected to room {} as {}",
                player_id, client_id, room.id, player_num
            );
            return Ok(Self::outcome(room, &player_id, player_num, true));
        }

        let player_num = room.add_player(player_id.clone(), client_id, nickname)?;
        info!(
            "Player {} ({}) joined room {} as {}",
            player_id, client_id, room.id, player_num
        );
        Ok(Self::outcome(room, &player_id, player_num, false))
    }

    fn outcome(room: &Room, player_id: &PlayerId, player_num: Side, reconnected: bool) -> JoinOutcome {
        JoinOutcome {
            room_id: room.id.clone(),
            player_num,
            mode: room.mode,
            is_solo_host: room.is_solo() && room.is_host(player_id),
            reconnected,
            ready: room.is_ready(),
        }
    }

    /// Mark every seat bound to `client_id` as disconnected
    ///
    /// Seats stay reserved until the grace window passes.
    pub fn disconnect(&mut self, client_id: ClientId, now: Instant) -> Vec<DisconnectNotice> {
        let mut notices = Vec::new();
        for room in self.rooms.values_mut() {
            let seat = room
                .players
                .iter_mut()
                .find(|slot| slot.connection == Some(client_id));
            if let Some(slot) = seat {
                slot.disconnect(now);
                info!(
                    "Player {} left room {}, holding seat {}",
                    slot.player_id, room.id, slot.num
                );
                notices.push(DisconnectNotice {
                    room_id: room.id.clone(),
                    nickname: slot.display_name(),
                    player_num: slot.num,
                });
            }
        }
        notices
    }

    /// Expire seats of one room against their latest disconnect time
    ///
    /// Deletes the room once no seats remain.
    pub fn cleanup_room(&mut self, room_id: &RoomId, now: Instant) -> CleanupOutcome {
        let window = self.reconnect_window;
        let Some(room) = self.rooms.get_mut(room_id) else {
            return CleanupOutcome::Missing;
        };
        let expired = room.purge_stale(now, window);
        for slot in &expired {
            info!("Seat {} of room {} expired ({})", slot.num, room_id, slot.player_id);
        }
        if room.is_empty() {
            self.remove(room_id);
            CleanupOutcome::Removed
        } else if expired.is_empty() {
            CleanupOutcome::Unchanged
        } else {
            CleanupOutcome::Evicted(expired)
        }
    }

    /// Expire stale seats everywhere
    ///
    /// Returns the rooms that lost seats but still exist, so their rosters can
    /// be refreshed. Emptied rooms are deleted.
    pub fn cleanup_all(&mut self, now: Instant) -> Vec<RoomId> {
        let ids: Vec<RoomId> = self.rooms.keys().cloned().collect();
        ids.into_iter()
            .filter(|id| matches!(self.cleanup_room(id, now), CleanupOutcome::Evicted(_)))
            .collect()
    }

    /// Lobby view, sorted by room id
    ///
    /// Callers run `cleanup_all` first so expired seats are not listed.
    pub fn list(&self) -> Vec<RoomSummary> {
        let mut summaries: Vec<RoomSummary> = self.rooms.values().map(Room::summary).collect();
        summaries.sort_by(|a, b| a.room_id.cmp(&b.room_id));
        summaries
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(RECONNECT_WINDOW)
    }
}
