//! Server-side snapshot encoding. Fixed-layout messages and client command
//! decoding live in `narwhal_shared::protocol`.

use crate::ball::{Ball, Element};
use crate::player::Player;
use crate::room::Room;
use narwhal_shared::config::{GameTuning, RoomOptions};
use narwhal_shared::math::Vec2;
use narwhal_shared::protocol::{
    angle_to_byte, low_byte, smoke_explosion, speed_to_u16, PacketWriter, ELEMENT_BALL,
    ELEMENT_NARWHAL, OP_SET_ELEMENTS,
};

const META_VERSION: u8 = 1;
const META_EXTENT: u16 = 32767;
/// Full 2-second timers map to 255.
const TIMER_SCALE: f64 = 2.0;

/// Speed and heading of a velocity; the heading is 0 when the speed rounds to 0.
fn motion(vel: Vec2) -> (u16, i8) {
    let speed = speed_to_u16(vel.length());
    let angle = if speed == 0 { 0 } else { angle_to_byte(vel.angle()) };
    (speed, angle)
}

/// SET_ELEMENTS: every ball, then every living narwhal of the room.
pub fn encode_snapshot(room: &Room, tuning: &GameTuning, server_time_ms: f64) -> Vec<u8> {
    let mut w = PacketWriter::with_capacity(OP_SET_ELEMENTS, 14 + room.player_count() * 64);
    w.f64(server_time_ms)
        .u8(META_VERSION)
        .u16(META_EXTENT)
        .u16(META_EXTENT);

    for element in room.elements() {
        match element {
            Element::Ball(ball) => write_ball(&mut w, ball),
        }
    }
    for player in room.players().filter(|p| p.is_alive) {
        write_narwhal(&mut w, player, tuning);
    }
    w.finish()
}

fn write_ball(w: &mut PacketWriter, ball: &Ball) {
    let (speed, angle) = motion(ball.vel);
    w.u8(ELEMENT_BALL)
        .u32(ball.id)
        .f32(ball.pos.x as f32)
        .f32(ball.pos.y as f32)
        .u16(speed)
        .i8(angle);
}

fn write_narwhal(w: &mut PacketWriter, player: &Player, tuning: &GameTuning) {
    let break_point = player.break_point(tuning);
    let packed = ((player.team as u8) & 7) | (((break_point as u8) & 31) << 3);
    let dash = ((player.cur_dash & 0x0f) << 4) | (player.max_dash & 0x0f);
    let c = player.color;

    w.u8(ELEMENT_NARWHAL)
        .u32(player.id)
        .u8((c >> 16) as u8)
        .u8((c >> 8) as u8)
        .u8(c as u8)
        .name(&player.name)
        .u8(packed)
        .u8(low_byte(player.alpha * 255.0))
        .u8(dash)
        .u8(low_byte(player.over_dash * 255.0))
        .u8(low_byte(player.tusk_ratio / TIMER_SCALE * 255.0))
        .u8(player.decoration);

    let head = player.segments.head();
    let (speed, angle) = motion(head.vel);
    w.f32(head.pos.x as f32)
        .f32(head.pos.y as f32)
        .u16(speed)
        .i8(angle)
        .i8(angle_to_byte(head.rot))
        .u8(player.skincode as u8)
        .u8(low_byte(player.invincible_dur / TIMER_SCALE * 255.0));

    let tail = player.segments.len() - 1;
    w.u8(tail as u8);
    for (i, seg) in player.segments.iter().enumerate().skip(1) {
        if i == break_point {
            w.f32(seg.pos.x as f32)
                .f32(seg.pos.y as f32)
                .f32(seg.vel.x as f32)
                .f32(seg.vel.y as f32);
        } else {
            w.i8(angle_to_byte(seg.rot));
        }
    }
}

/// Smoke explosion at a world position of a room with the given options.
pub fn smoke_at(options: &RoomOptions, pos: Vec2) -> Vec<u8> {
    smoke_explosion(pos.x / options.width, pos.y / options.height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use narwhal_shared::config::default_rooms;
    use narwhal_shared::protocol::{OP_TRANSIENT_ELEMENT, TRANSIENT_SMOKE_EXPLOSION};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const HEADER: usize = 14;
    /// Record of a narwhal named "Nemo" (4 name bytes plus NUL).
    const NEMO_RECORD: usize = 59;

    fn make_room(id: u32) -> Room {
        let config = default_rooms()
            .into_iter()
            .find(|r| r.id == id)
            .expect("room exists");
        Room::new(&config)
    }

    fn f32_at(buf: &[u8], at: usize) -> f32 {
        f32::from_le_bytes(buf[at..at + 4].try_into().unwrap())
    }

    fn u16_at(buf: &[u8], at: usize) -> u16 {
        u16::from_le_bytes(buf[at..at + 2].try_into().unwrap())
    }

    #[test]
    fn empty_room_is_header_only() {
        let tuning = GameTuning::default();
        let buf = encode_snapshot(&make_room(1), &tuning, 1234.5);
        assert_eq!(buf.len(), HEADER);
        assert_eq!(buf[0], OP_SET_ELEMENTS);
        assert_eq!(f64::from_le_bytes(buf[1..9].try_into().unwrap()), 1234.5);
        assert_eq!(&buf[9..14], &[1, 0xff, 0x7f, 0xff, 0x7f]);
    }

    #[test]
    fn ball_record_layout() {
        let tuning = GameTuning::default();
        let mut room = make_room(6);
        room.ball_mut().unwrap().vel = Vec2::new(0.0, 300.0);
        let buf = encode_snapshot(&room, &tuning, 0.0);
        assert_eq!(buf.len(), HEADER + 16);
        let b = &buf[HEADER..];
        assert_eq!(b[0], ELEMENT_BALL);
        assert_eq!(u32::from_le_bytes(b[1..5].try_into().unwrap()), 10000);
        assert_eq!(f32_at(b, 5), 3200.0);
        assert_eq!(f32_at(b, 9), 1920.0);
        assert_eq!(u16_at(b, 13), 300);
        // Straight down is PI/2, which is 63.5 rounded up.
        assert_eq!(b[15] as i8, 64);
    }

    #[test]
    fn resting_ball_reports_zero_heading() {
        let tuning = GameTuning::default();
        let mut room = make_room(6);
        room.ball_mut().unwrap().vel = Vec2::new(-0.2, 0.3);
        let buf = encode_snapshot(&room, &tuning, 0.0);
        assert_eq!(u16_at(&buf, HEADER + 13), 0);
        assert_eq!(buf[HEADER + 15], 0);
    }

    fn room_with_nemo() -> (Room, GameTuning) {
        let tuning = GameTuning::default();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut room = make_room(1);
        let mut player = Player::new(42, "Nemo", &tuning, &mut rng);
        player.color = 0x12_34_56;
        player.skincode = 3;
        player.decoration = 2;
        player.spawn(&room.options, &tuning, &mut rng);
        room.add_player(player);
        (room, tuning)
    }

    #[test]
    fn narwhal_record_layout() {
        let (room, tuning) = room_with_nemo();
        let player = room.player(42).unwrap().clone();
        let buf = encode_snapshot(&room, &tuning, 0.0);
        assert_eq!(buf.len(), HEADER + NEMO_RECORD);

        let r = &buf[HEADER..];
        assert_eq!(r[0], ELEMENT_NARWHAL);
        assert_eq!(u32::from_le_bytes(r[1..5].try_into().unwrap()), 42);
        assert_eq!(&r[5..8], &[0x12, 0x34, 0x56]);
        assert_eq!(&r[8..13], b"Nemo\0");

        let team_bits = (player.team as u8) & 7;
        assert_eq!(r[13], team_bits | (5 << 3));
        assert_eq!(r[14], 255);
        assert_eq!(r[15], 0x11);
        assert_eq!(r[16], 0);
        assert_eq!(r[17], 64);
        assert_eq!(r[18], 2);
        assert_eq!(f32_at(r, 19), player.pos.x as f32);
        assert_eq!(f32_at(r, 23), player.pos.y as f32);
        assert_eq!(u16_at(r, 27), 0);
        assert_eq!(r[29], 0);
        assert_eq!(r[30] as i8, angle_to_byte(player.angle));
        assert_eq!(r[31], 3);
        // 2.5 s of invincibility wraps past 255.
        assert_eq!(r[32], low_byte(2.5 / 2.0 * 255.0));
        assert_eq!(r[33], 10);

        // Links 1..=4 as rotation bytes, link 5 in full.
        let full = 34 + 4;
        let seg5 = player.segments.get(5).unwrap();
        assert_eq!(f32_at(r, full), seg5.pos.x as f32);
        assert_eq!(f32_at(r, full + 4), seg5.pos.y as f32);
        assert_eq!(f32_at(r, full + 12), 0.0);
    }

    #[test]
    fn heading_byte_is_sent_wrapped() {
        let tuning = GameTuning::default();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut room = make_room(1);
        let mut player = Player::new(42, "Nemo", &tuning, &mut rng);
        player.angle = 5.0;
        player.spawn(&room.options, &tuning, &mut rng);
        room.add_player(player);
        room.update(1.0 / 120.0, &tuning, &mut rng);

        let buf = encode_snapshot(&room, &tuning, 0.0);
        // 5 rad is 5 - TAU, which rounds to -52 rather than saturating at 127.
        assert_eq!(buf[HEADER + 30] as i8, -52);
    }

    #[test]
    fn dead_players_are_omitted() {
        let (mut room, tuning) = room_with_nemo();
        room.player_mut(42).unwrap().eliminate(&tuning);
        assert_eq!(encode_snapshot(&room, &tuning, 0.0).len(), HEADER);
    }

    #[test]
    fn special_characters_in_names_are_escaped() {
        let (mut room, tuning) = room_with_nemo();
        room.player_mut(42).unwrap().name = "a b".to_string();
        let buf = encode_snapshot(&room, &tuning, 0.0);
        assert_eq!(&buf[HEADER + 8..HEADER + 14], b"a%20b\0");
    }

    #[test]
    fn smoke_position_is_normalised() {
        let room = make_room(1);
        let buf = smoke_at(&room.options, Vec2::new(3200.0, 7000.0));
        assert_eq!(buf[0], OP_TRANSIENT_ELEMENT);
        assert_eq!(buf[1], TRANSIENT_SMOKE_EXPLOSION);
        assert_eq!(u16_at(&buf, 2), 32767);
        assert_eq!(u16_at(&buf, 4), 65535);
    }
}
