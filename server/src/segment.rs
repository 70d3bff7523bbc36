use narwhal_shared::math::{angle_delta, wrap_angle, Vec2};

/// Segments per narwhal, head included.
pub const SEGMENT_COUNT: usize = 11;

const POSITION_BLEND_RATE: f64 = 18.0;
const ROTATION_BLEND_RATE: f64 = 12.0;
/// Last two links are shortened to this fraction of the normal spacing.
const TAIL_TAPER: f64 = 0.08;
const COINCIDENT_EPSILON: f64 = 1e-6;

/// One link of a body chain.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Segment {
    pub pos: Vec2,
    pub vel: Vec2,
    pub rot: f64,
    /// Tangential velocity; always zero.
    pub vt: f64,
}

/// Spacing between segment `index` and its predecessor.
pub fn target_segment_length(size: f64, index: usize) -> f64 {
    let base = 20.0 + size * 0.3;
    if index >= SEGMENT_COUNT - 2 {
        base * TAIL_TAPER
    } else {
        base
    }
}

/// Fixed-size chain; index 0 is the head.
#[derive(Debug, Clone)]
pub struct SegmentChain {
    segments: [Segment; SEGMENT_COUNT],
}

impl Default for SegmentChain {
    fn default() -> Self {
        Self {
            segments: [Segment::default(); SEGMENT_COUNT],
        }
    }
}

impl SegmentChain {
    /// Lay the chain out in a straight line behind the head, at rest.
    pub fn straight(head: Vec2, angle: f64, size: f64) -> Self {
        let mut chain = Self::default();
        chain.reset_straight(head, angle, size);
        chain
    }

    pub fn reset_straight(&mut self, head: Vec2, angle: f64, size: f64) {
        let back = Vec2::from_angle(angle).scale(-1.0);
        let mut offset = 0.0;
        for (i, seg) in self.segments.iter_mut().enumerate() {
            if i > 0 {
                offset += target_segment_length(size, i);
            }
            *seg = Segment {
                pos: head.add(back.scale(offset)),
                vel: Vec2::ZERO,
                rot: angle,
                vt: 0.0,
            };
        }
    }

    pub fn head(&self) -> &Segment {
        &self.segments[0]
    }

    pub fn get(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    pub fn len(&self) -> usize {
        SEGMENT_COUNT
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Pin the head to the given state, then drag every tail link after it.
    ///
    /// Each link eases toward the point directly behind its predecessor and is
    /// then projected back to the exact spacing, so the chain never stretches.
    pub fn solve(&mut self, head_pos: Vec2, head_vel: Vec2, head_rot: f64, size: f64, dt: f64) {
        let pos_blend = (dt * POSITION_BLEND_RATE).min(1.0);
        let rot_blend = (dt * ROTATION_BLEND_RATE).min(1.0);
        let inv_dt = 1.0 / if dt > 0.0 { dt } else { 0.016 };

        self.segments[0] = Segment {
            pos: head_pos,
            vel: head_vel,
            rot: wrap_angle(head_rot),
            vt: 0.0,
        };

        for i in 1..SEGMENT_COUNT {
            let prev = self.segments[i - 1];
            let seg = &mut self.segments[i];
            let seg_len = target_segment_length(size, i);
            let behind = Vec2::from_angle(prev.rot).scale(-seg_len);
            let target = prev.pos.add(behind);
            let old_pos = seg.pos;

            let eased = seg.pos.add(target.sub(seg.pos).scale(pos_blend));
            let offset = eased.sub(prev.pos);
            let dist = offset.length();
            seg.pos = if dist > COINCIDENT_EPSILON {
                prev.pos.add(offset.scale(seg_len / dist))
            } else {
                target
            };

            let target_rot = prev.pos.sub(seg.pos).angle();
            seg.rot = wrap_angle(seg.rot + angle_delta(seg.rot, target_rot) * rot_blend);

            // Only x is reported for tail links; the client reads vy as 0.
            seg.vel = Vec2::new((seg.pos.x - old_pos.x) * inv_dt, 0.0);
            seg.vt = 0.0;
        }
    }

    /// Add `impulse * falloff(i)` to the velocity of every tail link.
    pub fn apply_tail_impulse(&mut self, impulse: Vec2, falloff: impl Fn(usize) -> f64) {
        for (i, seg) in self.segments.iter_mut().enumerate().skip(1) {
            seg.vel = seg.vel.add(impulse.scale(falloff(i)));
        }
    }
}
