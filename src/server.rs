//! GameServer Actor implementation
//!
//! The central actor that owns all state: connected clients and the room registry.
//! Every command is handled to completion before the next one is received, so
//! each room's session is mutated strictly one action at a time without locks.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::client::Client;
use crate::config::ServerSettings;
use crate::error::{AppError, GameError};
use crate::message::ServerMessage;
use crate::registry::{CleanupOutcome, JoinRequest, RoomRegistry};
use crate::room::{Room, RoomSummary};
use crate::session::GameAction;
use crate::types::{ClientId, RoomId};

/// Commands sent from handlers (and cleanup timers) to the GameServer actor
#[derive(Debug)]
pub enum ServerCommand {
    /// New client connected
    Connect {
        client_id: ClientId,
        sender: mpsc::Sender<ServerMessage>,
    },
    /// Client disconnected
    Disconnect { client_id: ClientId },
    /// Create, join or resume a room
    JoinRoom {
        client_id: ClientId,
        request: JoinRequest,
    },
    /// Game intent for a room
    GameAction {
        client_id: ClientId,
        room_id: RoomId,
        action: GameAction,
    },
    /// Lobby list request
    GetRooms { client_id: ClientId },
    /// Free-form relay to a room
    PlayerAction {
        client_id: ClientId,
        room_id: RoomId,
        message: String,
    },
    /// Client sent something we could not parse
    InvalidMessage { client_id: ClientId, reason: String },
    /// Grace window elapsed for a disconnect in this room
    CleanupRoom { room_id: RoomId },
}

/// The main GameServer actor
pub struct GameServer {
    /// All connected clients: ClientId -> Client
    clients: HashMap<ClientId, Client>,
    /// All live rooms and their sessions
    registry: RoomRegistry,
    settings: ServerSettings,
    /// Command receiver channel
    receiver: mpsc::Receiver<ServerCommand>,
    /// Used by cleanup timers to post back into the loop without keeping it alive
    scheduler: mpsc::WeakSender<ServerCommand>,
}

impl GameServer {
    /// Create a new GameServer with the given command channel
    pub fn new(
        receiver: mpsc::Receiver<ServerCommand>,
        scheduler: mpsc::WeakSender<ServerCommand>,
        settings: ServerSettings,
    ) -> Self {
        Self {
            clients: HashMap::new(),
            registry: RoomRegistry::new(settings.reconnect_window),
            settings,
            receiver,
            scheduler,
        }
    }

    /// Run the GameServer event loop
    ///
    /// Continuously receives and processes commands until all senders are dropped.
    pub async fn run(mut self) {
        info!("GameServer started");

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd).await;
        }

        info!("GameServer shutting down");
    }

    /// Process a single command
    async fn handle_command(&mut self, cmd: ServerCommand) {
        match cmd {
            ServerCommand::Connect { client_id, sender } => {
                self.handle_connect(client_id, sender).await;
            }
            ServerCommand::Disconnect { client_id } => {
                self.handle_disconnect(client_id).await;
            }
            ServerCommand::JoinRoom { client_id, request } => {
                self.handle_join_room(client_id, request).await;
            }
            ServerCommand::GameAction {
                client_id,
                room_id,
                action,
            } => {
                self.handle_game_action(client_id, room_id, action).await;
            }
            ServerCommand::GetRooms { client_id } => {
                let rooms = self.lobby().await;
                self.send_to(client_id, ServerMessage::RoomsUpdated(rooms))
                    .await;
            }
            ServerCommand::PlayerAction {
                client_id,
                room_id,
                message,
            } => {
                self.handle_player_action(client_id, room_id, message).await;
            }
            ServerCommand::InvalidMessage { client_id, reason } => {
                self.send_to(client_id, ServerMessage::ErrorMsg(reason)).await;
            }
            ServerCommand::CleanupRoom { room_id } => {
                self.handle_cleanup_room(room_id).await;
            }
        }
    }

    /// Handle new client connection
    async fn handle_connect(&mut self, client_id: ClientId, sender: mpsc::Sender<ServerMessage>) {
        info!("Client {} connected", client_id);
        self.clients.insert(client_id, Client::new(client_id, sender));

        let rooms = self.lobby().await;
        self.send_to(client_id, ServerMessage::RoomsUpdated(rooms))
            .await;
        debug!(
            "Total clients: {}, Total rooms: {}",
            self.clients.len(),
            self.registry.len()
        );
    }

    /// Handle client disconnection
    ///
    /// Seats are held for the reconnect window; a cleanup is scheduled per seat.
    async fn handle_disconnect(&mut self, client_id: ClientId) {
        info!("Client {} disconnected", client_id);
        self.clients.remove(&client_id);

        let notices = self.registry.disconnect(client_id, Instant::now());
        if notices.is_empty() {
            return;
        }

        let countdown_seconds = self.settings.reconnect_window.as_secs();
        for notice in notices {
            let msg = ServerMessage::PlayerDisconnected {
                nickname: notice.nickname,
                player_num: notice.player_num,
                countdown_seconds,
            };
            self.broadcast_room(&notice.room_id, msg).await;
            self.schedule_cleanup(notice.room_id);
        }
        self.broadcast_rooms().await;

        debug!(
            "Total clients: {}, Total rooms: {}",
            self.clients.len(),
            self.registry.len()
        );
    }

    /// Handle room creation / joining / resuming
    async fn handle_join_room(&mut self, client_id: ClientId, request: JoinRequest) {
        let outcome = match self.registry.join(request, client_id, Instant::now()) {
            Ok(outcome) => outcome,
            Err(err) => {
                debug!("Client {} join rejected: {}", client_id, err);
                self.send_to(client_id, err.into()).await;
                return;
            }
        };

        self.send_to(
            client_id,
            ServerMessage::PlayerAssigned {
                player_num: outcome.player_num,
                room_id: outcome.room_id.clone(),
                room_mode: outcome.mode,
                is_solo_host: outcome.is_solo_host,
            },
        )
        .await;
        self.broadcast_roster(&outcome.room_id).await;

        if let Some(room) = self.registry.get(&outcome.room_id) {
            let snapshot = room.session.snapshot();
            self.send_to(client_id, ServerMessage::StateUpdated(Box::new(snapshot)))
                .await;
        }

        if outcome.reconnected {
            return;
        }

        self.broadcast_rooms().await;
        if outcome.ready {
            let msg = if outcome.mode.is_solo() {
                "Solo game started!"
            } else {
                "Game started!"
            };
            self.broadcast_room(
                &outcome.room_id,
                ServerMessage::GameStart {
                    msg: msg.to_string(),
                },
            )
            .await;
        }
    }

    /// Handle a game intent
    ///
    /// Protocol failures are reported to the sender; illegal moves are dropped.
    async fn handle_game_action(&mut self, client_id: ClientId, room_id: RoomId, action: GameAction) {
        let Some(room) = self.registry.get_mut(&room_id) else {
            self.send_to(client_id, AppError::RoomNotFound(room_id).into())
                .await;
            return;
        };

        // A finished game answers its seated players with the final position,
        // whoever was left holding the turn.
        if room.session.is_over() && room.slot_for(client_id).is_some() {
            let snapshot = room.session.snapshot();
            self.send_to(client_id, ServerMessage::StateUpdated(Box::new(snapshot)))
                .await;
            return;
        }

        if let Err(err) = room.authorize(client_id) {
            debug!("Client {} action in room {} rejected: {}", client_id, room_id, err);
            self.send_to(client_id, err.into()).await;
            return;
        }

        match room.session.apply(action) {
            Ok(outcome) => {
                let snapshot = room.session.snapshot();
                if let Some(side) = room.session.winner() {
                    info!("Room {}: {} wins", room_id, side);
                }
                self.broadcast_room(&room_id, ServerMessage::StateUpdated(Box::new(snapshot)))
                    .await;
                if let Some(log) = outcome.log {
                    self.broadcast_room(&room_id, ServerMessage::PlayerAction { message: log })
                        .await;
                }
            }
            Err(GameError::GameOver) => {
                let snapshot = room.session.snapshot();
                self.send_to(client_id, ServerMessage::StateUpdated(Box::new(snapshot)))
                    .await;
            }
            Err(err) => {
                debug!("Room {}: ignored action from {}: {}", room_id, client_id, err);
            }
        }
    }

    /// Relay a free-form message to everyone in the room
    async fn handle_player_action(&mut self, client_id: ClientId, room_id: RoomId, message: String) {
        if !self.registry.contains(&room_id) {
            debug!("Client {} relayed to missing room {}", client_id, room_id);
            return;
        }
        self.broadcast_room(&room_id, ServerMessage::PlayerAction { message })
            .await;
    }

    /// Re-check a room once a grace window has passed
    async fn handle_cleanup_room(&mut self, room_id: RoomId) {
        match self.registry.cleanup_room(&room_id, Instant::now()) {
            CleanupOutcome::Evicted(_) => self.broadcast_roster(&room_id).await,
            CleanupOutcome::Removed => debug!("Room {} removed after grace window", room_id),
            CleanupOutcome::Unchanged | CleanupOutcome::Missing => {}
        }
        self.broadcast_rooms().await;
    }

    /// Post a `CleanupRoom` back into the loop after the grace window
    ///
    /// A reconnect does not cancel it; the room is re-validated when it fires.
    fn schedule_cleanup(&self, room_id: RoomId) {
        let delay = self.settings.cleanup_delay();
        let scheduler = self.scheduler.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(tx) = scheduler.upgrade() {
                let _ = tx.send(ServerCommand::CleanupRoom { room_id }).await;
            }
        });
    }

    /// Helper: Send a message to one client, if still connected
    async fn send_to(&self, client_id: ClientId, msg: ServerMessage) {
        if let Some(client) = self.clients.get(&client_id) {
            if client.send(msg).await.is_err() {
                warn!("Client {} channel closed", client_id);
            }
        }
    }

    /// Helper: Send a message to every connected seat of a room
    async fn broadcast_room(&self, room_id: &RoomId, msg: ServerMessage) {
        let members = self
            .registry
            .get(room_id)
            .map(Room::connections)
            .unwrap_or_default();
        for client_id in members {
            self.send_to(client_id, msg.clone()).await;
        }
    }

    /// Helper: Send the room roster to its members
    async fn broadcast_roster(&self, room_id: &RoomId) {
        let Some(room) = self.registry.get(room_id) else {
            return;
        };
        let roster = room.roster();
        self.broadcast_room(room_id, ServerMessage::PlayerListUpdated(roster))
            .await;
    }

    /// Helper: Expire stale seats and build the lobby list
    ///
    /// Rooms that lost a seat here get a fresh roster.
    async fn lobby(&mut self) -> Vec<RoomSummary> {
        for room_id in self.registry.cleanup_all(Instant::now()) {
            self.broadcast_roster(&room_id).await;
        }
        self.registry.list()
    }

    /// Helper: Send the lobby list to every connected client
    async fn broadcast_rooms(&mut self) {
        let rooms = self.lobby().await;
        for client in self.clients.values() {
            if client
                .send(ServerMessage::RoomsUpdated(rooms.clone()))
                .await
                .is_err()
            {
                warn!("Client {} channel closed", client.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::board::{Piece, PieceType, Position};
    use crate::registry::JoinIntent;
    use crate::room::RoomMode;
    use crate::session::GameSession;
    use crate::types::{Coord, PlayerId, Side};

    struct TestClient {
        id: ClientId,
        rx: mpsc::Receiver<ServerMessage>,
    }

    fn start_server() -> mpsc::Sender<ServerCommand> {
        let (tx, rx) = mpsc::channel(256);
        let server = GameServer::new(rx, tx.downgrade(), ServerSettings::default());
        tokio::spawn(server.run());
        tx
    }

    async fn connect(tx: &mpsc::Sender<ServerCommand>) -> TestClient {
        connect_as(tx, ClientId::new()).await
    }

    async fn connect_as(tx: &mpsc::Sender<ServerCommand>, id: ClientId) -> TestClient {
        let (sender, rx) = mpsc::channel(64);
        tx.send(ServerCommand::Connect {
            client_id: id,
            sender,
        })
        .await
        .unwrap();
        TestClient { id, rx }
    }

    async fn join(
        tx: &mpsc::Sender<ServerCommand>,
        client: &TestClient,
        room: &str,
        intent: JoinIntent,
        player: &str,
    ) {
        tx.send(ServerCommand::JoinRoom {
            client_id: client.id,
            request: JoinRequest {
                room_id: RoomId::from_string(room.to_string()),
                mode: RoomMode::Multi,
                intent,
                player_id: PlayerId(player.to_string()),
                nickname: player.to_string(),
            },
        })
        .await
        .unwrap();
    }

    async fn act(tx: &mpsc::Sender<ServerCommand>, client: &TestClient, room: &str, action: GameAction) {
        tx.send(ServerCommand::GameAction {
            client_id: client.id,
            room_id: RoomId::from_string(room.to_string()),
            action,
        })
        .await
        .unwrap();
    }

    async fn next_matching<F>(client: &mut TestClient, mut pred: F) -> ServerMessage
    where
        F: FnMut(&ServerMessage) -> bool,
    {
        tokio::time::timeout(Duration::from_secs(120), async {
            loop {
                let msg = client.rx.recv().await.expect("server dropped client");
                if pred(&msg) {
                    return msg;
                }
            }
        })
        .await
        .expect("timed out waiting for message")
    }

    /// Fetch a lobby list that reflects every command sent so far
    ///
    /// A marker error queued behind `GetRooms` tells us the reply has been
    /// delivered; the last lobby list seen before it is current.
    async fn fresh_rooms(
        tx: &mpsc::Sender<ServerCommand>,
        client: &mut TestClient,
    ) -> Vec<RoomSummary> {
        const MARKER: &str = "lobby-sync";
        tx.send(ServerCommand::GetRooms {
            client_id: client.id,
        })
        .await
        .unwrap();
        tx.send(ServerCommand::InvalidMessage {
            client_id: client.id,
            reason: MARKER.to_string(),
        })
        .await
        .unwrap();

        let mut latest = None;
        loop {
            match next_matching(client, |_| true).await {
                ServerMessage::RoomsUpdated(rooms) => latest = Some(rooms),
                ServerMessage::ErrorMsg(reason) if reason == MARKER => break,
                _ => {}
            }
        }
        latest.expect("no lobby list before marker")
    }

    async fn seated_pair(tx: &mpsc::Sender<ServerCommand>) -> (TestClient, TestClient) {
        let mut a = connect(tx).await;
        join(tx, &a, "r1", JoinIntent::Create, "a").await;
        next_matching(&mut a, |m| matches!(m, ServerMessage::PlayerAssigned { .. })).await;
        let mut b = connect(tx).await;
        join(tx, &b, "r1", JoinIntent::Join, "b").await;
        next_matching(&mut b, |m| matches!(m, ServerMessage::GameStart { .. })).await;
        next_matching(&mut a, |m| matches!(m, ServerMessage::GameStart { .. })).await;
        (a, b)
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_receives_lobby() {
        let tx = start_server();
        let mut a = connect(&tx).await;
        let msg = next_matching(&mut a, |_| true).await;
        assert_eq!(msg, ServerMessage::RoomsUpdated(Vec::new()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_join_missing_room_creates_nothing() {
        let tx = start_server();
        let mut a = connect(&tx).await;
        join(&tx, &a, "ghost", JoinIntent::Join, "a").await;
        next_matching(&mut a, |m| matches!(m, ServerMessage::ErrorMsg(_))).await;
        assert!(fresh_rooms(&tx, &mut a).await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_existing_room_rejected() {
        let tx = start_server();
        let a = connect(&tx).await;
        join(&tx, &a, "r1", JoinIntent::Create, "a").await;

        let mut b = connect(&tx).await;
        join(&tx, &b, "r1", JoinIntent::Create, "b").await;
        next_matching(&mut b, |m| matches!(m, ServerMessage::ErrorMsg(_))).await;

        let rooms = fresh_rooms(&tx, &mut b).await;
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].players, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_turn_ownership_and_broadcast() {
        let tx = start_server();
        let (mut a, mut b) = seated_pair(&tx).await;

        act(
            &tx,
            &b,
            "r1",
            GameAction::ReviveSelect {
                piece_type: PieceType::Small,
            },
        )
        .await;
        let err = next_matching(&mut b, |m| matches!(m, ServerMessage::ErrorMsg(_))).await;
        assert_eq!(err, ServerMessage::ErrorMsg("It is not your turn".to_string()));

        act(
            &tx,
            &a,
            "r1",
            GameAction::RevivePlace {
                r: 2,
                c: 2,
                piece_type: Some(PieceType::Small),
            },
        )
        .await;
        let state = next_matching(&mut b, |m| matches!(m, ServerMessage::StateUpdated(_))).await;
        match state {
            ServerMessage::StateUpdated(snapshot) => {
                assert_eq!(snapshot.turn, Side::Two);
                assert_eq!(snapshot.supply.one.small, 4);
            }
            _ => unreachable!(),
        }
        let log = next_matching(&mut a, |m| matches!(m, ServerMessage::PlayerAction { .. })).await;
        assert_eq!(
            log,
            ServerMessage::PlayerAction {
                message: "P1 revives S at (2,2)".to_string()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnect_within_window_keeps_seat() {
        let tx = start_server();
        let (a, mut b) = seated_pair(&tx).await;

        tx.send(ServerCommand::Disconnect { client_id: a.id })
            .await
            .unwrap();
        let notice =
            next_matching(&mut b, |m| matches!(m, ServerMessage::PlayerDisconnected { .. })).await;
        assert_eq!(
            notice,
            ServerMessage::PlayerDisconnected {
                nickname: "a".to_string(),
                player_num: Side::One,
                countdown_seconds: 60,
            }
        );

        tokio::time::sleep(Duration::from_secs(20)).await;
        let mut a2 = connect(&tx).await;
        join(&tx, &a2, "r1", JoinIntent::Join, "a").await;
        let assigned =
            next_matching(&mut a2, |m| matches!(m, ServerMessage::PlayerAssigned { .. })).await;
        assert!(matches!(
            assigned,
            ServerMessage::PlayerAssigned {
                player_num: Side::One,
                ..
            }
        ));
        next_matching(&mut a2, |m| matches!(m, ServerMessage::StateUpdated(_))).await;

        // The pending cleanup fires but finds the seat reconnected.
        tokio::time::sleep(Duration::from_secs(60)).await;
        let rooms = fresh_rooms(&tx, &mut b).await;
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].players, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_checks_latest_disconnect() {
        let tx = start_server();
        let (a, mut b) = seated_pair(&tx).await;

        tx.send(ServerCommand::Disconnect { client_id: a.id })
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
        let a2 = connect(&tx).await;
        join(&tx, &a2, "r1", JoinIntent::Join, "a").await;
        tokio::time::sleep(Duration::from_secs(20)).await;
        tx.send(ServerCommand::Disconnect { client_id: a2.id })
            .await
            .unwrap();

        // First timer fires at ~60.5s, only ~30s after the latest disconnect.
        tokio::time::sleep(Duration::from_secs(32)).await;
        assert_eq!(fresh_rooms(&tx, &mut b).await[0].players, 2);

        // Second timer fires at ~90.5s.
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(fresh_rooms(&tx, &mut b).await[0].players, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_room_deleted() {
        let tx = start_server();
        let mut observer = connect(&tx).await;
        let a = connect(&tx).await;
        join(&tx, &a, "r1", JoinIntent::Create, "a").await;
        assert_eq!(fresh_rooms(&tx, &mut observer).await.len(), 1);

        tx.send(ServerCommand::Disconnect { client_id: a.id })
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_secs(61)).await;
        assert!(fresh_rooms(&tx, &mut observer).await.is_empty());

        let mut a2 = connect(&tx).await;
        join(&tx, &a2, "r1", JoinIntent::Join, "a").await;
        next_matching(&mut a2, |m| matches!(m, ServerMessage::ErrorMsg(_))).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_seat_frees_roster() {
        let tx = start_server();
        let (a, mut b) = seated_pair(&tx).await;

        tx.send(ServerCommand::Disconnect { client_id: a.id })
            .await
            .unwrap();
        let roster = next_matching(&mut b, |m| {
            matches!(m, ServerMessage::PlayerListUpdated(list) if list.len() == 1)
        })
        .await;
        match roster {
            ServerMessage::PlayerListUpdated(list) => assert_eq!(list[0].num, Side::Two),
            _ => unreachable!(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_player_action_relay() {
        let tx = start_server();
        let (mut a, b) = seated_pair(&tx).await;
        tx.send(ServerCommand::PlayerAction {
            client_id: b.id,
            room_id: RoomId::from_string("r1".to_string()),
            message: "gg".to_string(),
        })
        .await
        .unwrap();
        let msg = next_matching(&mut a, |m| matches!(m, ServerMessage::PlayerAction { .. })).await;
        assert_eq!(
            msg,
            ServerMessage::PlayerAction {
                message: "gg".to_string()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_lobby_listing_expiry_refreshes_roster() {
        let tx = start_server();
        let (a, mut b) = seated_pair(&tx).await;

        tx.send(ServerCommand::Disconnect { client_id: a.id })
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(60_200)).await;

        // Listing for a newcomer expires the seat before the cleanup timer fires.
        let started = Instant::now();
        let _observer = connect(&tx).await;
        let roster = next_matching(&mut b, |m| {
            matches!(m, ServerMessage::PlayerListUpdated(list) if list.len() == 1)
        })
        .await;
        assert!(started.elapsed() < Duration::from_millis(300));
        match roster {
            ServerMessage::PlayerListUpdated(list) => assert_eq!(list[0].num, Side::Two),
            _ => unreachable!(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_finished_game_answers_with_final_state() {
        let (tx, rx) = mpsc::channel(256);
        let mut server = GameServer::new(rx, tx.downgrade(), ServerSettings::default());
        let (a_id, b_id) = (ClientId::new(), ClientId::new());
        for (id, intent, player) in [(a_id, JoinIntent::Create, "a"), (b_id, JoinIntent::Join, "b")] {
            let request = JoinRequest {
                room_id: RoomId::from_string("r1".to_string()),
                mode: RoomMode::Multi,
                intent,
                player_id: PlayerId(player.to_string()),
                nickname: player.to_string(),
            };
            server.registry.join(request, id, Instant::now()).unwrap();
        }

        let mut position = Position::new();
        for (r, c, kind, owner) in [
            (3, 3, PieceType::Medium, Side::One),
            (3, 4, PieceType::Small, Side::Two),
        ] {
            assert!(position.supply.withdraw(owner, kind));
            position.board.place(Coord::new(r, c), Piece::new(kind, owner));
        }
        position.scores.one = 7;
        server
            .registry
            .get_mut(&RoomId::from_string("r1".to_string()))
            .unwrap()
            .session = GameSession::with_position(position, Side::One);
        tokio::spawn(server.run());

        let mut a = connect_as(&tx, a_id).await;
        let mut b = connect_as(&tx, b_id).await;
        act(&tx, &a, "r1", GameAction::SelectCell { r: 3, c: 3 }).await;
        act(&tx, &a, "r1", GameAction::PerformMove { r: 3, c: 5 }).await;
        next_matching(&mut a, |m| matches!(m, ServerMessage::PlayerAction { .. })).await;
        next_matching(&mut b, |m| matches!(m, ServerMessage::PlayerAction { .. })).await;

        // The winner no longer holds the turn but still gets the final position.
        act(&tx, &a, "r1", GameAction::SelectCell { r: 3, c: 5 }).await;
        let reply = next_matching(&mut a, |m| {
            matches!(m, ServerMessage::StateUpdated(_) | ServerMessage::ErrorMsg(_))
        })
        .await;
        match reply {
            ServerMessage::StateUpdated(snapshot) => {
                assert!(snapshot.game_over);
                assert_eq!(snapshot.winner, Some(Side::One));
                assert_eq!(snapshot.scores.one, 8);
            }
            other => panic!("expected final state, got {:?}", other),
        }

        act(&tx, &b, "r1", GameAction::EndTurn).await;
        let reply = next_matching(&mut b, |m| {
            matches!(m, ServerMessage::StateUpdated(_) | ServerMessage::ErrorMsg(_))
        })
        .await;
        assert!(matches!(reply, ServerMessage::StateUpdated(snapshot) if snapshot.game_over));
    }
}
