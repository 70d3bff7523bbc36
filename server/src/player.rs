use crate::segment::{SegmentChain, SEGMENT_COUNT};
use narwhal_shared::config::{FieldType, GameTuning, RoomOptions};
use narwhal_shared::math::{angle_delta, hsl_to_rgb, wrap_angle, Vec2};
use rand::Rng;
use std::f64::consts::{PI, TAU};

pub const MAX_NAME_CHARS: usize = 25;
pub const DEFAULT_NAME: &str = "Narwhal";

/// Spawns keep this far from every wall.
const SPAWN_MARGIN: f64 = 200.0;
const WALL_BOUNCE: f64 = -0.7;
const HIT_STUN_DAMPING: f64 = 0.9;
/// Heading eases toward the velocity by this fraction per tick when idle.
const IDLE_TURN_RATE: f64 = 0.15;
/// Input acceleration gain on top of `GameTuning::acceleration`.
pub const ACCEL_MULTIPLIER: f64 = 3.0;

pub type Team = i8;
pub const TEAM_LEFT: Team = -1;
pub const TEAM_RIGHT: Team = 1;

/// A narwhal controlled by one connection.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: u32,
    pub name: String,
    pub team: Team,

    pub color: u32,
    pub skincode: u32,
    pub decoration: u8,
    pub alpha: f64,

    pub size: f64,
    pub level: u32,
    pub score: u32,
    pub kills: u32,

    pub pos: Vec2,
    pub vel: Vec2,
    pub angle: f64,
    pub segments: SegmentChain,

    pub max_dash: u8,
    pub cur_dash: u8,
    /// Recharge progress toward the next dash charge, in [0, 1).
    pub over_dash: f64,
    pub tusk_ratio: f64,
    pub dash_cooldown: f64,
    pub is_dashing: bool,
    pub retreat_cooldown: f64,
    pub is_retreating: bool,
    pub hit_stun_dur: f64,
    pub invincible_dur: f64,

    pub is_alive: bool,
    pub respawn_timer: f64,

    pub input_dir: Vec2,
    pub last_aim: Vec2,
    pub cursor_mag: f64,
}

/// Truncate to the client's name limit, substituting the default when empty.
pub fn sanitize_name(name: &str) -> String {
    let trimmed: String = name.chars().take(MAX_NAME_CHARS).collect();
    if trimmed.is_empty() {
        DEFAULT_NAME.to_string()
    } else {
        trimmed
    }
}

/// Bright, saturated random colour.
pub fn random_color(rng: &mut impl Rng) -> u32 {
    let h = rng.gen::<f64>();
    let s = 0.85 + rng.gen::<f64>() * 0.1;
    let l = 0.6 + rng.gen::<f64>() * 0.1;
    hsl_to_rgb(h, s, l)
}

pub fn level_for_size(size: f64, tuning: &GameTuning) -> u32 {
    ((size - tuning.base_size) / 10.0).floor().max(0.0) as u32 + 1
}

impl Player {
    /// A fresh, not yet spawned player.
    pub fn new(id: u32, name: &str, tuning: &GameTuning, rng: &mut impl Rng) -> Self {
        Self {
            id,
            name: sanitize_name(name),
            team: if rng.gen_bool(0.5) { TEAM_RIGHT } else { TEAM_LEFT },
            color: random_color(rng),
            skincode: 0,
            decoration: 0,
            alpha: 1.0,
            size: tuning.base_size,
            level: 1,
            score: 0,
            kills: 0,
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            angle: wrap_angle(rng.gen::<f64>() * TAU),
            segments: SegmentChain::default(),
            max_dash: tuning.max_dash,
            cur_dash: tuning.max_dash,
            over_dash: 0.0,
            tusk_ratio: tuning.tusk_ratio,
            dash_cooldown: 0.0,
            is_dashing: false,
            retreat_cooldown: 0.0,
            is_retreating: false,
            hit_stun_dur: 0.0,
            invincible_dur: 0.0,
            is_alive: false,
            respawn_timer: 0.0,
            input_dir: Vec2::ZERO,
            last_aim: Vec2::new(1.0, 0.0),
            cursor_mag: 0.0,
        }
    }

    /// Bring the player (back) to life at a random spot of the field.
    pub fn spawn(&mut self, options: &RoomOptions, tuning: &GameTuning, rng: &mut impl Rng) {
        let (w, h) = (options.width, options.height);
        let x = if options.field_type == FieldType::Soccer {
            let half = w / 2.0;
            let offset = rng.gen::<f64>() * (half - 2.0 * SPAWN_MARGIN) + SPAWN_MARGIN;
            if self.team == TEAM_LEFT {
                offset
            } else {
                half + offset
            }
        } else {
            rng.gen::<f64>() * (w - 2.0 * SPAWN_MARGIN) + SPAWN_MARGIN
        };
        let y = rng.gen::<f64>() * (h - 2.0 * SPAWN_MARGIN) + SPAWN_MARGIN;

        self.is_alive = true;
        self.respawn_timer = 0.0;
        self.pos = Vec2::new(x, y);
        self.vel = Vec2::ZERO;
        self.invincible_dur = tuning.spawn_invincible_time;
        self.cur_dash = self.max_dash;
        self.over_dash = 0.0;
        self.dash_cooldown = 0.0;
        self.retreat_cooldown = 0.0;
        self.size = tuning.base_size;
        self.level = 1;
        self.is_dashing = false;
        self.is_retreating = false;
        self.hit_stun_dur = 0.0;
        self.alpha = 1.0;
        self.angle = wrap_angle(self.angle);
        self.segments.reset_straight(self.pos, self.angle, self.size);
    }

    /// Advance one tick of a living player. `clock` is the room's elapsed time.
    pub fn update(&mut self, dt: f64, options: &RoomOptions, tuning: &GameTuning, clock: f64) {
        if !self.is_alive {
            return;
        }

        self.invincible_dur = (self.invincible_dur - dt).max(0.0);
        self.dash_cooldown = (self.dash_cooldown - dt).max(0.0);
        self.retreat_cooldown = (self.retreat_cooldown - dt).max(0.0);
        self.hit_stun_dur = (self.hit_stun_dur - dt).max(0.0);

        if self.cur_dash < self.max_dash {
            self.over_dash += dt * tuning.dash_regen_rate;
            if self.over_dash >= 1.0 {
                self.cur_dash = (self.cur_dash + 1).min(self.max_dash);
                self.over_dash = 0.0;
            }
        }

        if self.is_dashing && self.dash_cooldown <= 0.0 {
            self.is_dashing = false;
        }
        if self.is_retreating && self.retreat_cooldown <= 0.0 {
            self.is_retreating = false;
        }

        self.process_movement(dt, tuning);
        self.segments
            .solve(self.pos, self.vel, self.angle, self.size, dt);
        self.clamp_to_world(options.width, options.height);

        self.alpha = if self.invincible_dur > 0.0 {
            0.4 + (clock * 10.0).sin() * 0.3
        } else {
            1.0
        };
    }

    /// Penalty applied to acceleration and top speed as the narwhal grows.
    pub fn size_factor(&self, tuning: &GameTuning) -> f64 {
        (1.0 - (self.size - tuning.base_size) / 200.0).max(0.6)
    }

    fn process_movement(&mut self, dt: f64, tuning: &GameTuning) {
        if self.hit_stun_dur > 0.0 {
            self.vel = self.vel.scale(HIT_STUN_DAMPING);
            self.pos = self.pos.add(self.vel.scale(dt));
            return;
        }

        let input_mag = self.input_dir.length();
        if input_mag > 0.01 {
            let size_factor = self.size_factor(tuning);
            let accel = tuning.acceleration * size_factor * input_mag * ACCEL_MULTIPLIER;
            let dir = self.input_dir.scale(1.0 / input_mag);
            self.vel = self.vel.add(dir.scale(accel * dt));

            let max_speed = if self.is_dashing {
                tuning.dash_max_speed
            } else {
                tuning.max_speed * size_factor
            };
            self.vel = self.vel.clamp_length(max_speed);

            self.angle = self.last_aim.angle();
        } else if self.vel.length() > 0.1 {
            let diff = angle_delta(self.angle, self.vel.angle());
            self.angle = wrap_angle(self.angle + diff * IDLE_TURN_RATE);
        }

        self.vel = self.vel.scale(tuning.friction);
        self.pos = self.pos.add(self.vel.scale(dt));
    }

    fn clamp_to_world(&mut self, width: f64, height: f64) {
        let half = self.size / 1.5;
        let (min_x, max_x) = (half, width - half);
        let (min_y, max_y) = (half, height - half);

        if self.pos.x < min_x {
            self.pos.x = min_x;
            self.vel.x *= WALL_BOUNCE;
        }
        if self.pos.x > max_x {
            self.pos.x = max_x;
            self.vel.x *= WALL_BOUNCE;
        }
        if self.pos.y < min_y {
            self.pos.y = min_y;
            self.vel.y *= WALL_BOUNCE;
        }
        if self.pos.y > max_y {
            self.pos.y = max_y;
            self.vel.y *= WALL_BOUNCE;
        }
    }

    /// Store a steering direction, capped to unit length.
    pub fn set_input_direction(&mut self, dir_x: f64, dir_y: f64) {
        let dir = Vec2::new(dir_x, dir_y);
        let mag = dir.length();
        self.input_dir = if mag > 1.0 { dir.scale(1.0 / mag) } else { dir };
        if mag > 0.001 {
            self.last_aim = self.input_dir;
        }
    }

    /// Apply an UPDATE_TARGET command. Non-finite input counts as no input.
    pub fn set_target(&mut self, dir_x: f64, dir_y: f64) {
        let dir = Vec2::new(dir_x, dir_y);
        let mag = dir.length();
        if mag.is_finite() && mag > 1e-6 {
            self.cursor_mag = mag.min(1.0);
            self.set_input_direction(dir_x / mag, dir_y / mag);
        } else {
            self.cursor_mag = 0.0;
            self.set_input_direction(0.0, 0.0);
        }
    }

    /// Burst forward, spending one charge. Returns false (and changes
    /// nothing) without a charge, on cooldown, or while already dashing.
    pub fn use_dash(&mut self, tuning: &GameTuning) -> bool {
        if self.cur_dash == 0 || self.dash_cooldown > 0.0 || self.is_dashing {
            return false;
        }
        self.cur_dash -= 1;
        self.is_dashing = true;
        self.dash_cooldown = tuning.dash_cooldown;

        let impulse = Vec2::from_angle(self.angle).scale(tuning.dash_power);
        self.vel = self.vel.add(impulse);
        let n = SEGMENT_COUNT as f64;
        self.segments
            .apply_tail_impulse(impulse, |i| (1.0 - i as f64 / n) * 0.3);
        true
    }

    /// Kick backwards, spending stamina. Returns whether the retreat happened.
    pub fn use_retreat(&mut self, tuning: &GameTuning) -> bool {
        if self.retreat_cooldown > 0.0 || self.cur_dash == 0 {
            return false;
        }
        self.cur_dash = self.cur_dash.saturating_sub(tuning.retreat_cost);
        self.retreat_cooldown = tuning.retreat_cooldown;
        self.is_retreating = true;

        let strength = self.size * 0.9 + tuning.retreat_power;
        let impulse = Vec2::from_angle(self.angle + PI).scale(strength);
        self.vel = self.vel.add(impulse);
        let n = SEGMENT_COUNT as f64;
        self.segments
            .apply_tail_impulse(impulse, |i| 0.08 * (i as f64 / n));
        true
    }

    /// Attack point ahead of the head.
    pub fn horn_tip(&self) -> Vec2 {
        let horn_length = self.size * 0.8 * self.tusk_ratio;
        self.pos.add(Vec2::from_angle(self.angle).scale(horn_length))
    }

    /// Non-lethal horn hit: shove away from the attacker and stun briefly.
    pub fn apply_hit(
        &mut self,
        attacker_pos: Vec2,
        attacker_size: f64,
        tuning: &GameTuning,
    ) -> bool {
        if self.invincible_dur > 0.0 {
            return false;
        }
        let away = self.pos.sub(attacker_pos);
        let dist = away.length();
        if dist > 0.0 {
            let push = tuning.push_force * (attacker_size / self.size);
            self.vel = self.vel.add(away.scale(push / dist));
        }
        self.hit_stun_dur = tuning.hit_stun;
        true
    }

    /// Returns true when the level changed.
    pub fn grow(&mut self, amount: f64, tuning: &GameTuning) -> bool {
        let before = self.level;
        self.size = (self.size + amount).min(tuning.max_size);
        self.level = level_for_size(self.size, tuning);
        self.level != before
    }

    /// Die unless already dead or invincible.
    pub fn die(&mut self, tuning: &GameTuning) -> bool {
        if !self.is_alive || self.invincible_dur > 0.0 {
            return false;
        }
        self.eliminate(tuning);
        true
    }

    /// Unconditional death, used for self-elimination.
    pub fn eliminate(&mut self, tuning: &GameTuning) {
        self.is_alive = false;
        self.respawn_timer = tuning.respawn_delay;
        self.input_dir = Vec2::ZERO;
        self.cursor_mag = 0.0;
    }

    /// Credit a kill of a victim at `victim_level`. Returns true when the
    /// killer levelled up.
    pub fn credit_kill(&mut self, victim_level: u32, tuning: &GameTuning) -> bool {
        self.kills += 1;
        self.score += victim_level * 100;
        self.grow(tuning.growth_per_kill, tuning)
    }

    /// Tail link transmitted in full in snapshots; moves back as the narwhal grows.
    pub fn break_point(&self, tuning: &GameTuning) -> usize {
        let n = self.segments.len();
        let bp = (5.0 + (self.size - tuning.base_size) * 0.05).floor() as i64;
        bp.clamp(3, n as i64 - 3) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::target_segment_length;
    use narwhal_shared::config::default_rooms;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const DT: f64 = 1.0 / 120.0;

    fn test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    fn spawned(options: &RoomOptions) -> (Player, GameTuning) {
        let tuning = GameTuning::default();
        let mut rng = test_rng();
        let mut player = Player::new(1, "Nemo", &tuning, &mut rng);
        player.spawn(options, &tuning, &mut rng);
        (player, tuning)
    }

    fn normal_room() -> RoomOptions {
        default_rooms()[0].options.clone()
    }

    #[test]
    fn names_are_truncated_and_defaulted() {
        assert_eq!(sanitize_name(""), DEFAULT_NAME);
        assert_eq!(sanitize_name("Nemo"), "Nemo");
        let long = "x".repeat(40);
        assert_eq!(sanitize_name(&long).chars().count(), MAX_NAME_CHARS);
    }

    #[test]
    fn random_colors_are_valid_rgb() {
        let mut rng = test_rng();
        for _ in 0..100 {
            assert!(random_color(&mut rng) <= 0xFFFFFF);
        }
    }

    #[test]
    fn spawn_resets_state_and_lays_out_chain() {
        let options = normal_room();
        let (mut player, tuning) = spawned(&options);
        assert!(player.is_alive);
        assert_eq!(player.invincible_dur, tuning.spawn_invincible_time);
        assert_eq!(player.cur_dash, tuning.max_dash);
        assert!(player.pos.x >= 200.0 && player.pos.x <= options.width - 200.0);
        assert!(player.pos.y >= 200.0 && player.pos.y <= options.height - 200.0);

        assert_eq!(player.segments.len(), SEGMENT_COUNT);
        let dir = Vec2::from_angle(player.angle);
        for i in 1..SEGMENT_COUNT {
            let prev = player.segments.get(i - 1).unwrap().pos;
            let cur = player.segments.get(i).unwrap().pos;
            let d = prev.distance(cur);
            assert!((d - target_segment_length(player.size, i)).abs() < 1e-9);
            // Behind the head along the heading.
            let back = prev.sub(cur);
            assert!((back.x * dir.y - back.y * dir.x).abs() < 1e-6);
            assert!(back.x * dir.x + back.y * dir.y > 0.0);
        }

        player.size = 80.0;
        player.is_alive = false;
        player.spawn(&options, &tuning, &mut test_rng());
        assert_eq!(player.size, tuning.base_size);
        assert_eq!(player.level, 1);
    }

    #[test]
    fn soccer_spawn_uses_team_half() {
        let options = default_rooms()[5].options.clone();
        let tuning = GameTuning::default();
        let mut rng = test_rng();
        for _ in 0..50 {
            let mut p = Player::new(1, "a", &tuning, &mut rng);
            p.spawn(&options, &tuning, &mut rng);
            if p.team == TEAM_LEFT {
                assert!(p.pos.x < options.width / 2.0);
            } else {
                assert!(p.pos.x > options.width / 2.0);
            }
        }
    }

    #[test]
    fn timers_never_go_negative() {
        let options = normal_room();
        let (mut player, tuning) = spawned(&options);
        player.dash_cooldown = 0.005;
        player.retreat_cooldown = 0.001;
        player.hit_stun_dur = 0.003;
        for _ in 0..400 {
            player.update(DT, &options, &tuning, 0.0);
            assert!(player.invincible_dur >= 0.0);
            assert!(player.dash_cooldown >= 0.0);
            assert!(player.retreat_cooldown >= 0.0);
            assert!(player.hit_stun_dur >= 0.0);
        }
        assert_eq!(player.invincible_dur, 0.0);
        assert_eq!(player.alpha, 1.0);
    }

    #[test]
    fn dash_rules() {
        let options = normal_room();
        let (mut player, tuning) = spawned(&options);
        player.angle = 0.0;

        assert!(player.use_dash(&tuning));
        assert!(player.is_dashing);
        assert_eq!(player.cur_dash, 0);
        assert_eq!(player.dash_cooldown, tuning.dash_cooldown);
        assert!((player.vel.x - tuning.dash_power).abs() < 1e-9);

        // No charge, on cooldown, already dashing: refused without side effects.
        let vel = player.vel;
        assert!(!player.use_dash(&tuning));
        assert_eq!(player.vel, vel);
        assert_eq!(player.cur_dash, 0);

        player.cur_dash = 1;
        assert!(!player.use_dash(&tuning));
        assert_eq!(player.cur_dash, 1);
    }

    #[test]
    fn dash_recharges_and_clears() {
        let options = normal_room();
        let (mut player, tuning) = spawned(&options);
        assert!(player.use_dash(&tuning));
        // 2s cooldown and 2s to recharge at 0.5/s.
        for _ in 0..(121 * 2 + 5) {
            player.update(DT, &options, &tuning, 0.0);
            assert!(player.cur_dash <= player.max_dash);
            assert!(player.over_dash >= 0.0 && player.over_dash < 1.0);
        }
        assert!(!player.is_dashing);
        assert_eq!(player.cur_dash, player.max_dash);
        assert!(player.use_dash(&tuning));
    }

    #[test]
    fn retreat_pushes_backwards_and_costs_stamina() {
        let options = normal_room();
        let (mut player, tuning) = spawned(&options);
        player.angle = 0.0;
        assert!(player.use_retreat(&tuning));
        assert!(player.vel.x < 0.0);
        assert!(player.is_retreating);
        assert_eq!(player.cur_dash, 0);
        assert!(!player.use_retreat(&tuning));

        player.retreat_cooldown = 0.0;
        assert!(!player.use_retreat(&tuning), "no stamina left");
    }

    #[test]
    fn steering_converges_on_input_direction() {
        let options = normal_room();
        let (mut player, tuning) = spawned(&options);
        player.pos = Vec2::new(1000.0, 3200.0);
        player.angle = 2.0;
        player.set_target(1.0, 0.0);
        for _ in 0..240 {
            player.update(DT, &options, &tuning, 0.0);
        }
        assert!(player.angle.abs() < 1e-9);
        let speed = player.vel.length();
        let cap = tuning.max_speed * player.size_factor(&tuning);
        // Friction runs after the clamp, so speed settles below the cap.
        let accel = tuning.acceleration * player.size_factor(&tuning) * ACCEL_MULTIPLIER;
        let terminal = tuning.friction * accel * DT / (1.0 - tuning.friction);
        assert!(speed <= cap + 1e-9);
        assert!((speed - terminal).abs() < 1e-6, "speed {} terminal {}", speed, terminal);
        assert!(player.vel.y.abs() < 1e-6);
    }

    #[test]
    fn headings_stay_in_half_open_range() {
        let tuning = GameTuning::default();
        for seed in 0..32 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let p = Player::new(1, "p", &tuning, &mut rng);
            assert!(p.angle > -PI && p.angle <= PI, "drew {}", p.angle);
        }

        let options = normal_room();
        let (mut player, tuning) = spawned(&options);
        player.angle = 5.0;
        player.spawn(&options, &tuning, &mut test_rng());
        assert!((player.angle - (5.0 - TAU)).abs() < 1e-12);

        // Idle easing that crosses the seam at PI.
        player.pos = Vec2::new(3000.0, 3000.0);
        player.angle = 3.14;
        player.vel = Vec2::from_angle(-3.0).scale(150.0);
        player.update(DT, &options, &tuning, 0.0);
        let expected = wrap_angle(3.14 + angle_delta(3.14, -3.0) * IDLE_TURN_RATE);
        assert!(expected < 0.0);
        assert!((player.angle - expected).abs() < 1e-12);
        assert_eq!(player.segments.head().rot, player.angle);
    }

    #[test]
    fn idle_heading_follows_velocity() {
        let options = normal_room();
        let (mut player, tuning) = spawned(&options);
        player.pos = Vec2::new(3000.0, 3000.0);
        player.angle = 0.0;
        player.vel = Vec2::new(0.0, 150.0);
        player.update(DT, &options, &tuning, 0.0);
        let expected = (std::f64::consts::FRAC_PI_2) * 0.15;
        assert!((player.angle - expected).abs() < 1e-9);
    }

    #[test]
    fn hit_stun_ignores_input() {
        let options = normal_room();
        let (mut player, tuning) = spawned(&options);
        player.pos = Vec2::new(3000.0, 3000.0);
        player.vel = Vec2::new(100.0, 0.0);
        player.hit_stun_dur = 1.0;
        player.set_target(0.0, 1.0);
        player.update(DT, &options, &tuning, 0.0);
        assert!((player.vel.x - 90.0).abs() < 1e-9);
        assert_eq!(player.vel.y, 0.0);
    }

    #[test]
    fn walls_bounce_and_clamp() {
        let options = normal_room();
        let (mut player, tuning) = spawned(&options);
        player.hit_stun_dur = 1.0;
        player.pos = Vec2::new(10.0, 3000.0);
        player.vel = Vec2::new(-100.0, 0.0);
        player.update(DT, &options, &tuning, 0.0);
        assert!((player.pos.x - player.size / 1.5).abs() < 1e-9);
        assert!(player.vel.x > 0.0);
    }

    #[test]
    fn set_target_handles_degenerate_input() {
        let tuning = GameTuning::default();
        let mut player = Player::new(1, "a", &tuning, &mut test_rng());
        player.set_target(3.0, 4.0);
        assert!((player.input_dir.length() - 1.0).abs() < 1e-9);
        assert_eq!(player.cursor_mag, 1.0);
        player.set_target(f64::NAN, 1.0);
        assert_eq!(player.input_dir, Vec2::ZERO);
        // Aim survives releasing the cursor.
        assert!((player.last_aim.x - 0.6).abs() < 1e-9);
    }

    #[test]
    fn invincible_players_cannot_be_hit_or_killed() {
        let options = normal_room();
        let (mut player, tuning) = spawned(&options);
        assert!(!player.apply_hit(Vec2::ZERO, 100.0, &tuning));
        assert!(!player.die(&tuning));
        assert!(player.is_alive);
        player.invincible_dur = 0.0;
        assert!(player.die(&tuning));
        assert!(!player.is_alive);
        assert_eq!(player.respawn_timer, tuning.respawn_delay);
        assert!(!player.die(&tuning));
    }

    #[test]
    fn kills_grow_and_level_up() {
        let tuning = GameTuning::default();
        let mut player = Player::new(1, "a", &tuning, &mut test_rng());
        assert!(!player.credit_kill(2, &tuning));
        assert_eq!(player.score, 200);
        assert_eq!(player.size, 40.0);
        assert!(!player.credit_kill(1, &tuning));
        assert!(player.credit_kill(1, &tuning));
        assert_eq!(player.level, 2);
        for _ in 0..100 {
            player.credit_kill(1, &tuning);
        }
        assert_eq!(player.size, tuning.max_size);
        assert_eq!(player.kills, 103);
    }

    #[test]
    fn break_point_tracks_size() {
        let tuning = GameTuning::default();
        let mut player = Player::new(1, "a", &tuning, &mut test_rng());
        assert_eq!(player.break_point(&tuning), 5);
        player.size = 76.0;
        assert_eq!(player.break_point(&tuning), 7);
        player.size = 120.0;
        assert_eq!(player.break_point(&tuning), 8);
    }
}
