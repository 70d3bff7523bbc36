//! Collision detection and combat resolution between entities of one room.
//!
//! Player pairs are tested segment against segment; the first overlapping pair
//! shoves both narwhals apart and, when a head was involved, may turn into a
//! horn attack. Balls are pushed by any living player touching them.

use crate::ball::Ball;
use crate::player::Player;
use narwhal_shared::config::GameTuning;
use narwhal_shared::math::{angle_between, Vec2};
use std::f64::consts::FRAC_PI_4;

const HEAD_RADIUS_FACTOR: f64 = 0.6;
const TAIL_RADIUS_FACTOR: f64 = 0.4;
const SEPARATION_GAIN: f64 = 0.5 * 10.0;
/// Horn tip must land within this fraction of the victim's size.
const HORN_REACH_FACTOR: f64 = 0.6;
const MIN_CONTACT_DISTANCE: f64 = 0.01;
const BALL_CONTACT_FACTOR: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HornOutcome {
    Kill,
    Hit,
    NoEffect,
}

/// Outcome of a horn strike given the attacker's size advantage (dash bonus
/// included).
pub fn horn_outcome(advantage: f64, threshold: f64) -> HornOutcome {
    if advantage > threshold {
        HornOutcome::Kill
    } else if advantage >= -threshold {
        HornOutcome::Hit
    } else {
        HornOutcome::NoEffect
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Kill {
    pub victim: u32,
    pub killer: u32,
    /// Where the victim died.
    pub pos: Vec2,
    pub killer_levelled_up: bool,
}

fn collision_radius(player: &Player, index: usize) -> f64 {
    if index == 0 {
        player.size * HEAD_RADIUS_FACTOR
    } else {
        player.size * TAIL_RADIUS_FACTOR
    }
}

/// Resolve every pair of living players. `players` should hold only living
/// players, in a stable order.
pub fn resolve_players(players: &mut [&mut Player], tuning: &GameTuning) -> Vec<Kill> {
    let mut kills = Vec::new();
    for j in 1..players.len() {
        let (left, right) = players.split_at_mut(j);
        let p2 = &mut *right[0];
        for p1 in left.iter_mut() {
            resolve_pair(p1, p2, tuning, &mut kills);
        }
    }
    kills
}

/// At most one contact is resolved per pair and tick.
pub fn resolve_pair(p1: &mut Player, p2: &mut Player, tuning: &GameTuning, kills: &mut Vec<Kill>) {
    if !p1.is_alive || !p2.is_alive {
        return;
    }
    let Some((i, j, normal, overlap)) = first_contact(p1, p2) else {
        return;
    };

    let shove = normal.scale(overlap * SEPARATION_GAIN + tuning.bounce_force);
    p1.vel = p1.vel.add(shove);
    p2.vel = p2.vel.sub(shove);

    if i == 0 {
        kills.extend(horn_attack(p1, p2, tuning));
    }
    if j == 0 {
        kills.extend(horn_attack(p2, p1, tuning));
    }
}

/// First overlapping segment pair as (index in p1, index in p2, unit normal
/// from p2 toward p1, overlap depth).
fn first_contact(p1: &Player, p2: &Player) -> Option<(usize, usize, Vec2, f64)> {
    for (i, s1) in p1.segments.iter().enumerate() {
        let r1 = collision_radius(p1, i);
        for (j, s2) in p2.segments.iter().enumerate() {
            let delta = s1.pos.sub(s2.pos);
            let dist = delta.length();
            let reach = r1 + collision_radius(p2, j);
            if dist < reach && dist > MIN_CONTACT_DISTANCE {
                return Some((i, j, delta.scale(1.0 / dist), reach - dist));
            }
        }
    }
    None
}

/// Evaluate a horn strike of `attacker` on `victim`.
pub fn horn_attack(attacker: &mut Player, victim: &mut Player, tuning: &GameTuning) -> Option<Kill> {
    if victim.invincible_dur > 0.0 || !attacker.is_alive || !victim.is_alive {
        return None;
    }
    if attacker.horn_tip().distance(victim.pos) >= victim.size * HORN_REACH_FACTOR {
        return None;
    }
    let to_victim = victim.pos.sub(attacker.pos).angle();
    if angle_between(to_victim, attacker.angle) >= FRAC_PI_4 {
        return None;
    }

    let bonus = if attacker.is_dashing {
        tuning.dash_attack_bonus
    } else {
        0.0
    };
    match horn_outcome(attacker.size - victim.size + bonus, tuning.horn_threshold) {
        HornOutcome::Kill => {
            let victim_level = victim.level;
            if !victim.die(tuning) {
                return None;
            }
            let killer_levelled_up = attacker.credit_kill(victim_level, tuning);
            Some(Kill {
                victim: victim.id,
                killer: attacker.id,
                pos: victim.pos,
                killer_levelled_up,
            })
        }
        HornOutcome::Hit => {
            victim.apply_hit(attacker.pos, attacker.size, tuning);
            None
        }
        HornOutcome::NoEffect => None,
    }
}

/// Push the ball away from every living player touching it.
pub fn resolve_ball<'a>(ball: &mut Ball, players: impl IntoIterator<Item = &'a Player>) {
    for player in players {
        if !player.is_alive {
            continue;
        }
        let delta = ball.pos.sub(player.pos);
        let dist = delta.length();
        let reach = player.size * BALL_CONTACT_FACTOR + ball.radius;
        if dist >= reach || dist <= 0.0 {
            continue;
        }

        let mut push = player.vel.length() * 0.8 + player.size * 2.0;
        if player.is_dashing {
            push *= 2.0;
        }
        let normal = delta.scale(1.0 / dist);
        ball.apply_force(normal.scale(push));
        ball.pos = ball.pos.add(normal.scale(reach - dist));
    }
}
