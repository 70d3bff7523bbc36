use narwhal_shared::math::Vec2;
use narwhal_shared::protocol::ELEMENT_BALL;

pub const BALL_RADIUS: f64 = 270.0;
pub const BALL_FRICTION: f64 = 0.985;
pub const BALL_RESTITUTION: f64 = 0.8;
/// Slower wall impacts stick instead of bouncing.
pub const MIN_BOUNCE_SPEED: f64 = 120.0;
pub const MAX_BALL_SPEED: f64 = 600.0;

/// Soccer ball.
#[derive(Debug, Clone)]
pub struct Ball {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f64,
    pub friction: f64,
    pub restitution: f64,
}

impl Ball {
    pub fn new(id: u32, pos: Vec2) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            radius: BALL_RADIUS,
            friction: BALL_FRICTION,
            restitution: BALL_RESTITUTION,
        }
    }

    pub fn update(&mut self, dt: f64, width: f64, height: f64) {
        self.pos = self.pos.add(self.vel.scale(dt));
        self.vel = self.vel.scale(self.friction);

        let margin = self.radius;
        if self.pos.y < margin {
            self.pos.y = margin;
            self.vel.y = self.rebound(self.vel.y, 1.0);
        } else if self.pos.y > height - margin {
            self.pos.y = height - margin;
            self.vel.y = self.rebound(self.vel.y, -1.0);
        }

        if self.pos.x < margin {
            self.pos.x = margin;
            self.vel.x = self.rebound(self.vel.x, 1.0);
        } else if self.pos.x > width - margin {
            self.pos.x = width - margin;
            self.vel.x = self.rebound(self.vel.x, -1.0);
        }
    }

    /// Velocity along one axis after touching a wall whose inward normal
    /// points along `sign`.
    fn rebound(&self, v: f64, sign: f64) -> f64 {
        if v.abs() > MIN_BOUNCE_SPEED {
            sign * v.abs() * self.restitution
        } else {
            0.0
        }
    }

    pub fn apply_force(&mut self, force: Vec2) {
        self.vel = self.vel.add(force).clamp_length(MAX_BALL_SPEED);
    }

    /// Back to the centre spot, at rest.
    pub fn reset(&mut self, width: f64, height: f64) {
        self.pos = Vec2::new(width / 2.0, height / 2.0);
        self.vel = Vec2::ZERO;
    }
}

/// Non-player element of a room, tagged like the wire format.
#[derive(Debug, Clone)]
pub enum Element {
    Ball(Ball),
}

impl Element {
    pub fn id(&self) -> u32 {
        match self {
            Element::Ball(ball) => ball.id,
        }
    }

    pub fn type_tag(&self) -> u8 {
        match self {
            Element::Ball(_) => ELEMENT_BALL,
        }
    }

    pub fn update(&mut self, dt: f64, width: f64, height: f64) {
        match self {
            Element::Ball(ball) => ball.update(dt, width, height),
        }
    }

    pub fn as_ball(&self) -> Option<&Ball> {
        match self {
            Element::Ball(ball) => Some(ball),
        }
    }

    pub fn as_ball_mut(&mut self) -> Option<&mut Ball> {
        match self {
            Element::Ball(ball) => Some(ball),
        }
    }
}
