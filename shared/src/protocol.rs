//! Binary wire protocol: one leading opcode byte, little-endian fields.
//!
//! Client commands are decoded into [`ClientMsg`]; server messages are built
//! with [`PacketWriter`]. Byte offsets are a contract with a deployed client,
//! so every layout here is fixed.

use crate::config::LobbySummary;
use std::f64::consts::PI;
use thiserror::Error;

// === Client -> Server opcodes ===
pub const OP_JOIN: u8 = 16;
pub const OP_LEAVE: u8 = 17;
pub const OP_START: u8 = 18;
pub const OP_GET_LOBBIES: u8 = 19;
pub const OP_UPDATE_TARGET: u8 = 32;
pub const OP_SPLIT_UP: u8 = 33;
pub const OP_RIP: u8 = 34;
pub const OP_RETREAT: u8 = 35;
pub const OP_PING: u8 = 37;

// === Server -> Client opcodes ===
pub const OP_JOIN_ROOM: u8 = 17;
pub const OP_START_ACK: u8 = 18;
pub const OP_LOBBIES: u8 = 19;
pub const OP_DEATH: u8 = 34;
pub const OP_PONG: u8 = 37;
pub const OP_SET_ELEMENTS: u8 = 48;
pub const OP_PLAYER_INFO: u8 = 49;
pub const OP_LEADER_BOARD: u8 = 50;
pub const OP_TEAM_INFO: u8 = 51;
pub const OP_TRANSIENT_ELEMENT: u8 = 52;

/// Element type tags inside SET_ELEMENTS.
pub const ELEMENT_NARWHAL: u8 = 0;
pub const ELEMENT_BALL: u8 = 1;

/// TRANSIENT_ELEMENT subtypes.
pub const TRANSIENT_SMOKE_EXPLOSION: u8 = 0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("empty message")]
    Empty,

    #[error("opcode {opcode}: needed {needed} bytes, got {got}")]
    Truncated { opcode: u8, needed: usize, got: usize },

    #[error("unknown opcode {0}")]
    UnknownOpcode(u8),
}

/// A decoded client command.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMsg {
    Join { room_id: u32 },
    Leave,
    Start { skincode: u32, colorcode: u32, name: String },
    GetLobbies,
    UpdateTarget { dir_x: f32, dir_y: f32 },
    SplitUp,
    Rip,
    Retreat,
    /// Timestamp bytes are echoed back untouched.
    Ping { timestamp: [u8; 4] },
}

impl ClientMsg {
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        let (&opcode, payload) = data.split_first().ok_or(DecodeError::Empty)?;
        let mut r = Reader {
            opcode,
            inp: payload,
            consumed: 1,
        };

        let msg = match opcode {
            OP_JOIN => ClientMsg::Join {
                room_id: u32::from_le_bytes(r.take::<4>()?),
            },
            OP_LEAVE => ClientMsg::Leave,
            OP_START => {
                let skincode = u32::from_le_bytes(r.take::<4>()?);
                let colorcode = u32::from_le_bytes(r.take::<4>()?);
                ClientMsg::Start {
                    skincode,
                    colorcode,
                    name: r.zero_terminated_string(),
                }
            }
            OP_GET_LOBBIES => ClientMsg::GetLobbies,
            OP_UPDATE_TARGET => {
                let dir_x = f32::from_le_bytes(r.take::<4>()?);
                let dir_y = f32::from_le_bytes(r.take::<4>()?);
                ClientMsg::UpdateTarget { dir_x, dir_y }
            }
            OP_SPLIT_UP => ClientMsg::SplitUp,
            OP_RIP => ClientMsg::Rip,
            OP_RETREAT => ClientMsg::Retreat,
            OP_PING => ClientMsg::Ping {
                timestamp: r.take::<4>()?,
            },
            other => return Err(DecodeError::UnknownOpcode(other)),
        };
        Ok(msg)
    }
}

struct Reader<'a> {
    opcode: u8,
    inp: &'a [u8],
    consumed: usize,
}

impl<'a> Reader<'a> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        if self.inp.len() < N {
            return Err(DecodeError::Truncated {
                opcode: self.opcode,
                needed: self.consumed + N,
                got: self.consumed + self.inp.len(),
            });
        }
        let (head, rest) = self.inp.split_at(N);
        self.inp = rest;
        self.consumed += N;
        let mut buf = [0u8; N];
        buf.copy_from_slice(head);
        Ok(buf)
    }

    /// Bytes up to the first NUL (or the end of the message), lossily decoded.
    fn zero_terminated_string(&mut self) -> String {
        let end = self
            .inp
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.inp.len());
        let s = String::from_utf8_lossy(&self.inp[..end]).into_owned();
        self.inp = &self.inp[(end + 1).min(self.inp.len())..];
        s
    }
}

/// Append-only little-endian packet builder.
#[derive(Debug, Clone)]
pub struct PacketWriter {
    buf: Vec<u8>,
}

impl PacketWriter {
    pub fn new(opcode: u8) -> Self {
        Self::with_capacity(opcode, 16)
    }

    pub fn with_capacity(opcode: u8, capacity: usize) -> Self {
        let mut buf = Vec::with_capacity(capacity.max(1));
        buf.push(opcode);
        Self { buf }
    }

    pub fn u8(&mut self, v: u8) -> &mut Self {
        self.buf.push(v);
        self
    }

    pub fn i8(&mut self, v: i8) -> &mut Self {
        self.buf.push(v as u8);
        self
    }

    pub fn u16(&mut self, v: u16) -> &mut Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn u32(&mut self, v: u32) -> &mut Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn f32(&mut self, v: f32) -> &mut Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn f64(&mut self, v: f64) -> &mut Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn bytes(&mut self, v: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(v);
        self
    }

    /// Percent-encoded, NUL-terminated string.
    pub fn name(&mut self, s: &str) -> &mut Self {
        self.buf.extend_from_slice(encode_uri_component(s).as_bytes());
        self.buf.push(0);
        self
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Heading in radians to the signed byte the client expects (PI maps to 127).
pub fn angle_to_byte(angle: f64) -> i8 {
    // Round half up, as the client does.
    let v = (angle / PI * 127.0 + 0.5).floor();
    v.clamp(-128.0, 127.0) as i8
}

/// Low byte of a rounded non-negative quantity, wrapping like the client's
/// byte views do.
pub fn low_byte(v: f64) -> u8 {
    (v.round() as i64 & 0xff) as u8
}

/// Rounded speed saturated into a u16.
pub fn speed_to_u16(speed: f64) -> u16 {
    speed.round().clamp(0.0, u16::MAX as f64) as u16
}

/// Escape a string the way JavaScript's `encodeURIComponent` does.
pub fn encode_uri_component(s: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(s.len());
    for &b in s.as_bytes() {
        let unreserved = b.is_ascii_alphanumeric()
            || matches!(b, b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')');
        if unreserved {
            out.push(b as char);
        } else {
            out.push('%');
            out.push(HEX[(b >> 4) as usize] as char);
            out.push(HEX[(b & 0x0f) as usize] as char);
        }
    }
    out
}

// === Fixed-layout server messages ===

pub fn start_ack(player_id: u32) -> Vec<u8> {
    let mut w = PacketWriter::new(OP_START_ACK);
    w.u32(player_id);
    w.finish()
}

pub fn join_room(room_id: u32) -> Vec<u8> {
    let mut w = PacketWriter::new(OP_JOIN_ROOM);
    w.u8((room_id & 0xff) as u8);
    w.finish()
}

pub fn pong(timestamp: [u8; 4]) -> Vec<u8> {
    let mut w = PacketWriter::new(OP_PONG);
    w.bytes(&timestamp);
    w.finish()
}

pub fn death() -> Vec<u8> {
    vec![OP_DEATH]
}

pub fn player_info(level: u32) -> Vec<u8> {
    let mut w = PacketWriter::new(OP_PLAYER_INFO);
    w.u8((level & 0xff) as u8).u8(0);
    w.finish()
}

/// `win_team` is -1 while nobody has won, 0 for left, 1 for right.
pub fn team_info(left: u32, right: u32, win_team: i8) -> Vec<u8> {
    let mut w = PacketWriter::new(OP_TEAM_INFO);
    w.u8(left.min(255) as u8)
        .u8(right.min(255) as u8)
        .i8(win_team)
        .u8(u8::from(win_team >= 0));
    w.finish()
}

/// Smoke explosion at a world-relative position, each axis in 0..=1.
pub fn smoke_explosion(norm_x: f64, norm_y: f64) -> Vec<u8> {
    let mut w = PacketWriter::new(OP_TRANSIENT_ELEMENT);
    w.u8(TRANSIENT_SMOKE_EXPLOSION)
        .u16((norm_x.clamp(0.0, 1.0) * 65535.0).floor() as u16)
        .u16((norm_y.clamp(0.0, 1.0) * 65535.0).floor() as u16);
    w.finish()
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderEntry {
    pub level: u32,
    pub name: String,
}

/// Leaderboard; the level list is repeated after the names.
pub fn leader_board(entries: &[LeaderEntry]) -> Vec<u8> {
    let count = entries.len().min(255) as u8;
    let entries = &entries[..count as usize];
    let mut w = PacketWriter::with_capacity(OP_LEADER_BOARD, 2 + entries.len() * 16);
    w.u8(count);
    for e in entries {
        w.u8((e.level & 0xff) as u8).name(&e.name);
    }
    w.u8(count);
    for e in entries {
        w.u8(e.level.min(255) as u8);
    }
    w.finish()
}

pub fn lobbies(rooms: &[LobbySummary]) -> Result<Vec<u8>, serde_json::Error> {
    let json = serde_json::to_vec(rooms)?;
    let mut w = PacketWriter::with_capacity(OP_LOBBIES, json.len() + 2);
    w.bytes(&json).u8(0);
    Ok(w.finish())
}
