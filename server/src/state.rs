use crate::config::ServerConfig;
use crate::player::{sanitize_name, Player};
use crate::protocol::{encode_snapshot, smoke_at};
use crate::room::{Room, RoomEvent};
use axum::body::Bytes;
use narwhal_shared::config::{GameTuning, LobbySummary};
use narwhal_shared::protocol::{self as wire, ClientMsg, DecodeError};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeMap, HashMap};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};

/// Per-connection queue of encoded frames.
pub type Outbox = mpsc::Sender<Bytes>;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("malformed packet: {0}")]
    Decode(#[from] DecodeError),
    #[error("unknown connection {0}")]
    UnknownConnection(u32),
    #[error("unknown room {0}")]
    UnknownRoom(u32),
    #[error("failed to encode lobby list: {0}")]
    Encode(#[from] serde_json::Error),
}

/// What the server knows about one connection.
#[derive(Debug)]
struct Session {
    outbox: Outbox,
    /// Room joined with JOIN; receives its snapshots.
    room: Option<u32>,
    /// Room the connection's narwhal lives in.
    player_room: Option<u32>,
}

/// Central game state owned by the game loop task.
pub struct GameState {
    rooms: BTreeMap<u32, Room>,
    sessions: HashMap<u32, Session>,
    tuning: GameTuning,
    rng: ChaCha8Rng,
    next_id: u32,
}

fn wall_clock_ms() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

impl GameState {
    pub fn new(config: &ServerConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            rooms: config.rooms.iter().map(|c| (c.id, Room::new(c))).collect(),
            sessions: HashMap::new(),
            tuning: config.tuning.clone(),
            rng,
            next_id: 1,
        }
    }

    pub fn room(&self, id: u32) -> Option<&Room> {
        self.rooms.get(&id)
    }

    pub fn room_mut(&mut self, id: u32) -> Option<&mut Room> {
        self.rooms.get_mut(&id)
    }

    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    pub fn connection_count(&self) -> usize {
        self.sessions.len()
    }

    /// Room a connection has joined, if any.
    pub fn joined_room(&self, id: u32) -> Option<u32> {
        self.sessions.get(&id).and_then(|s| s.room)
    }

    /// The connection's narwhal, wherever it lives.
    pub fn player(&self, id: u32) -> Option<&Player> {
        let room = self.sessions.get(&id)?.player_room?;
        self.rooms.get(&room)?.player(id)
    }

    /// The connection's living narwhal, borrowed alongside the tuning.
    fn alive_player(&mut self, id: u32) -> (Option<&mut Player>, &GameTuning) {
        let player = self
            .sessions
            .get(&id)
            .and_then(|s| s.player_room)
            .and_then(|r| self.rooms.get_mut(&r))
            .and_then(|room| room.player_mut(id))
            .filter(|p| p.is_alive);
        (player, &self.tuning)
    }

    /// Register a connection and greet it with its id.
    pub fn connect(&mut self, outbox: Outbox) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        self.sessions.insert(
            id,
            Session {
                outbox,
                room: None,
                player_room: None,
            },
        );
        self.send(id, wire::start_ack(id));
        tracing::info!(conn = id, "Connection opened");
        id
    }

    /// Forget a connection and its narwhal. Unknown ids are ignored.
    pub fn disconnect(&mut self, id: u32) {
        let Some(session) = self.sessions.remove(&id) else {
            return;
        };
        if let Some(room) = session.player_room.and_then(|r| self.rooms.get_mut(&r)) {
            room.remove_player(id);
        }
        tracing::info!(conn = id, "Connection closed");
    }

    /// Decode and apply one client packet.
    pub fn handle_packet(&mut self, id: u32, data: &[u8]) -> Result<(), DispatchError> {
        let msg = ClientMsg::decode(data)?;
        if !self.sessions.contains_key(&id) {
            return Err(DispatchError::UnknownConnection(id));
        }

        match msg {
            ClientMsg::Join { room_id } => self.join(id, room_id)?,
            ClientMsg::Leave => self.leave(id),
            ClientMsg::Start {
                skincode,
                colorcode,
                name,
            } => self.start(id, skincode, colorcode, &name),
            ClientMsg::GetLobbies => {
                let summaries: Vec<LobbySummary> =
                    self.rooms.values().map(Room::lobby_summary).collect();
                let packet = wire::lobbies(&summaries)?;
                self.send(id, packet);
            }
            ClientMsg::UpdateTarget { dir_x, dir_y } => {
                if let (Some(player), _) = self.alive_player(id) {
                    player.set_target(dir_x as f64, dir_y as f64);
                }
            }
            ClientMsg::SplitUp => {
                if let (Some(player), tuning) = self.alive_player(id) {
                    player.use_dash(tuning);
                }
            }
            ClientMsg::Retreat => {
                if let (Some(player), tuning) = self.alive_player(id) {
                    if player.use_retreat(tuning) {
                        tracing::trace!(conn = id, "Retreat");
                    }
                }
            }
            ClientMsg::Rip => {
                if let (Some(player), tuning) = self.alive_player(id) {
                    player.eliminate(tuning);
                    self.send(id, wire::death());
                }
            }
            ClientMsg::Ping { timestamp } => self.send(id, wire::pong(timestamp)),
        }
        Ok(())
    }

    fn join(&mut self, id: u32, room_id: u32) -> Result<(), DispatchError> {
        if !self.rooms.contains_key(&room_id) {
            return Err(DispatchError::UnknownRoom(room_id));
        }
        let session = self
            .sessions
            .get_mut(&id)
            .ok_or(DispatchError::UnknownConnection(id))?;
        session.room = Some(room_id);
        if let Some(old) = session.player_room.filter(|&r| r != room_id) {
            session.player_room = None;
            if let Some(room) = self.rooms.get_mut(&old) {
                room.remove_player(id);
            }
        }

        let Some(room) = self.rooms.get(&room_id) else {
            return Err(DispatchError::UnknownRoom(room_id));
        };
        tracing::info!(conn = id, room = %room.name, "Joined room");
        let snapshot = encode_snapshot(room, &self.tuning, wall_clock_ms());
        let scores = room.scores();
        self.send(id, wire::join_room(room_id));
        self.send(id, snapshot);
        self.broadcast(
            room_id,
            wire::team_info(scores.left, scores.right, scores.win_team()),
        );
        Ok(())
    }

    fn leave(&mut self, id: u32) {
        let Some(session) = self.sessions.get_mut(&id) else {
            return;
        };
        session.room = None;
        if let Some(room) = session.player_room.take().and_then(|r| self.rooms.get_mut(&r)) {
            room.remove_player(id);
            tracing::info!(conn = id, room = room.id, "Left room");
        }
    }

    fn start(&mut self, id: u32, skincode: u32, colorcode: u32, name: &str) {
        let Some(session) = self.sessions.get_mut(&id) else {
            return;
        };
        let (room_id, previous) = (session.room, session.player_room);
        let name = sanitize_name(name);
        self.send(id, wire::start_ack(id));

        let Some(room_id) = room_id.filter(|r| self.rooms.contains_key(r)) else {
            return;
        };
        let existing = previous
            .and_then(|r| self.rooms.get_mut(&r))
            .and_then(|room| room.remove_player(id));
        let mut player =
            existing.unwrap_or_else(|| Player::new(id, &name, &self.tuning, &mut self.rng));
        player.name = name;
        player.skincode = skincode;
        player.color = colorcode;

        let Some(room) = self.rooms.get_mut(&room_id) else {
            return;
        };
        room.add_player(player);
        let options = room.options.clone();
        let level = match room.player_mut(id) {
            Some(player) => {
                player.spawn(&options, &self.tuning, &mut self.rng);
                player.level
            }
            None => return,
        };
        tracing::info!(conn = id, room = %room.name, "Spawned");
        let snapshot = encode_snapshot(room, &self.tuning, wall_clock_ms());

        if let Some(session) = self.sessions.get_mut(&id) {
            session.player_room = Some(room_id);
        }
        self.send(id, wire::player_info(level));
        self.send(id, snapshot);
    }

    /// Advance every room and push the results to their audiences.
    pub fn tick(&mut self, dt: f64) {
        let now = wall_clock_ms();
        let room_ids: Vec<u32> = self.rooms.keys().copied().collect();
        for room_id in room_ids {
            let Some(room) = self.rooms.get_mut(&room_id) else {
                continue;
            };
            let events = room.update(dt, &self.tuning, &mut self.rng);
            for event in events {
                self.dispatch_event(room_id, event);
            }

            if !self.has_audience(room_id) {
                continue;
            }
            if let Some(room) = self.rooms.get(&room_id) {
                let snapshot = encode_snapshot(room, &self.tuning, now);
                self.broadcast(room_id, snapshot);
            }
        }
    }

    fn dispatch_event(&mut self, room_id: u32, event: RoomEvent) {
        match event {
            RoomEvent::Spawned { player_id, level } => {
                tracing::debug!(conn = player_id, room = room_id, "Respawned");
                self.send(player_id, wire::player_info(level));
            }
            RoomEvent::Killed(kill) => {
                tracing::info!(
                    killer = kill.killer,
                    victim = kill.victim,
                    room = room_id,
                    "Narwhal killed"
                );
                self.send(kill.victim, wire::death());
                let Some(room) = self.rooms.get(&room_id) else {
                    return;
                };
                let smoke = smoke_at(&room.options, kill.pos);
                let killer_level = room.player(kill.killer).map(|p| p.level);
                self.broadcast(room_id, smoke);
                if let (true, Some(level)) = (kill.killer_levelled_up, killer_level) {
                    self.send(kill.killer, wire::player_info(level));
                }
            }
            RoomEvent::Goal(scores) => {
                self.broadcast(
                    room_id,
                    wire::team_info(scores.left, scores.right, scores.win_team()),
                );
            }
        }
    }

    /// Send each populated room its leaderboard.
    pub fn broadcast_leaderboards(&mut self) {
        let boards: Vec<(u32, Vec<u8>)> = self
            .rooms
            .values()
            .filter(|room| room.player_count() > 0)
            .filter_map(|room| {
                let entries = room.leaderboard();
                (!entries.is_empty()).then(|| (room.id, wire::leader_board(&entries)))
            })
            .collect();
        for (room_id, board) in boards {
            self.broadcast(room_id, board);
        }
    }

    fn has_audience(&self, room_id: u32) -> bool {
        self.sessions.values().any(|s| s.room == Some(room_id))
    }

    /// Best-effort delivery; a full or closed outbox drops the frame.
    fn send(&self, id: u32, data: Vec<u8>) {
        if let Some(session) = self.sessions.get(&id) {
            deliver(id, &session.outbox, Bytes::from(data));
        }
    }

    fn broadcast(&self, room_id: u32, data: Vec<u8>) {
        let data = Bytes::from(data);
        for (&id, session) in &self.sessions {
            if session.room == Some(room_id) {
                deliver(id, &session.outbox, data.clone());
            }
        }
    }
}

fn deliver(id: u32, outbox: &Outbox, data: Bytes) {
    match outbox.try_send(data) {
        Ok(()) => {}
        Err(TrySendError::Full(_)) => {
            tracing::warn!(conn = id, "Outbox full, dropping frame");
        }
        Err(TrySendError::Closed(_)) => {
            tracing::trace!(conn = id, "Outbox closed");
        }
    }
}
