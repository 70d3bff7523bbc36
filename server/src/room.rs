use crate::ball::{Ball, Element};
use crate::combat::{self, Kill};
use crate::player::{Player, TEAM_LEFT, TEAM_RIGHT};
use narwhal_shared::config::{FieldType, GameTuning, LobbySummary, RoomConfig, RoomOptions};
use narwhal_shared::math::Vec2;
use narwhal_shared::protocol::LeaderEntry;
use rand::Rng;
use std::collections::BTreeMap;

pub const FIRST_ELEMENT_ID: u32 = 10000;
pub const WINNING_SCORE: u32 = 10;
const LEADERBOARD_SIZE: usize = 10;
/// Distance from the side wall at which the ball counts as in the goal.
const GOAL_LINE: f64 = 50.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeamScores {
    pub left: u32,
    pub right: u32,
}

impl TeamScores {
    /// -1 while nobody has won, 0 for left, 1 for right.
    pub fn win_team(&self) -> i8 {
        if self.left >= WINNING_SCORE {
            0
        } else if self.right >= WINNING_SCORE {
            1
        } else {
            -1
        }
    }
}

/// Something that happened during a tick and must be told to clients.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomEvent {
    Spawned { player_id: u32, level: u32 },
    Killed(Kill),
    Goal(TeamScores),
}

/// One independent arena. Players and elements are keyed by id so iteration
/// order, and with it collision order, is stable.
#[derive(Debug)]
pub struct Room {
    pub id: u32,
    pub name: String,
    pub options: RoomOptions,
    players: BTreeMap<u32, Player>,
    elements: BTreeMap<u32, Element>,
    next_element_id: u32,
    game_time: f64,
    scores: TeamScores,
}

impl Room {
    pub fn new(config: &RoomConfig) -> Self {
        let mut room = Self {
            id: config.id,
            name: config.name.clone(),
            options: config.options.clone(),
            players: BTreeMap::new(),
            elements: BTreeMap::new(),
            next_element_id: FIRST_ELEMENT_ID,
            game_time: 0.0,
            scores: TeamScores::default(),
        };
        if config.is_soccer() {
            let centre = Vec2::new(config.options.width / 2.0, config.options.height / 2.0);
            room.add_element(|id| Element::Ball(Ball::new(id, centre)));
        }
        room
    }

    fn add_element(&mut self, make: impl FnOnce(u32) -> Element) -> u32 {
        let id = self.next_element_id;
        self.next_element_id += 1;
        self.elements.insert(id, make(id));
        id
    }

    pub fn is_soccer(&self) -> bool {
        self.options.field_type == FieldType::Soccer
    }

    pub fn game_time(&self) -> f64 {
        self.game_time
    }

    pub fn scores(&self) -> TeamScores {
        self.scores
    }

    pub fn player(&self, id: u32) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn player_mut(&mut self, id: u32) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    pub fn ball(&self) -> Option<&Ball> {
        self.elements.values().find_map(Element::as_ball)
    }

    pub fn ball_mut(&mut self) -> Option<&mut Ball> {
        self.elements.values_mut().find_map(Element::as_ball_mut)
    }

    /// Insert (or replace) a player. Soccer rooms put it on the smaller team,
    /// left on ties.
    pub fn add_player(&mut self, mut player: Player) {
        self.players.remove(&player.id);
        if self.is_soccer() {
            let left = self.players.values().filter(|p| p.team == TEAM_LEFT).count();
            let right = self.players.values().filter(|p| p.team == TEAM_RIGHT).count();
            player.team = if left <= right { TEAM_LEFT } else { TEAM_RIGHT };
        }
        self.players.insert(player.id, player);
    }

    /// Removing an absent player is a no-op.
    pub fn remove_player(&mut self, id: u32) -> Option<Player> {
        self.players.remove(&id)
    }

    /// Advance the room by `dt` seconds.
    pub fn update(
        &mut self,
        dt: f64,
        tuning: &GameTuning,
        rng: &mut impl Rng,
    ) -> Vec<RoomEvent> {
        let soccer = self.is_soccer();
        let mut events = Vec::new();
        self.game_time += dt;

        for player in self.players.values_mut() {
            if player.is_alive {
                player.update(dt, &self.options, tuning, self.game_time);
                continue;
            }
            player.respawn_timer -= dt;
            if player.respawn_timer <= 0.0 {
                player.spawn(&self.options, tuning, rng);
                events.push(RoomEvent::Spawned {
                    player_id: player.id,
                    level: player.level,
                });
            }
        }

        for element in self.elements.values_mut() {
            element.update(dt, self.options.width, self.options.height);
        }

        let mut alive: Vec<&mut Player> =
            self.players.values_mut().filter(|p| p.is_alive).collect();
        let kills = combat::resolve_players(&mut alive, tuning);
        events.extend(kills.into_iter().map(RoomEvent::Killed));

        if soccer {
            for ball in self.elements.values_mut().filter_map(Element::as_ball_mut) {
                combat::resolve_ball(ball, alive.iter().map(|p| &**p));
            }
            if self.check_goals() {
                events.push(RoomEvent::Goal(self.scores));
            }
        }
        events
    }

    /// Score a goal if the ball sits in either goal mouth. Returns whether
    /// one was scored.
    pub fn check_goals(&mut self) -> bool {
        let (width, height) = (self.options.width, self.options.height);
        let mouth = height / 3.0;
        let top = height / 2.0 - mouth / 2.0;
        let bottom = height / 2.0 + mouth / 2.0;

        let Some(ball) = self.ball_mut() else {
            return false;
        };
        if ball.pos.y <= top || ball.pos.y >= bottom {
            return false;
        }
        let right_scores = ball.pos.x < GOAL_LINE;
        let left_scores = ball.pos.x > width - GOAL_LINE;
        if !right_scores && !left_scores {
            return false;
        }
        ball.reset(width, height);

        if right_scores {
            self.scores.right += 1;
        } else {
            self.scores.left += 1;
        }
        tracing::info!(
            room = self.id,
            left = self.scores.left,
            right = self.scores.right,
            "Goal"
        );
        true
    }

    pub fn lobby_summary(&self) -> LobbySummary {
        LobbySummary {
            options: self.options.clone(),
            name: self.name.clone(),
            id: self.id,
            player_count: self.players.len() as u32,
        }
    }

    /// Living players by descending score, at most ten.
    pub fn leaderboard(&self) -> Vec<LeaderEntry> {
        let mut alive: Vec<&Player> = self.players.values().filter(|p| p.is_alive).collect();
        alive.sort_by(|a, b| b.score.cmp(&a.score));
        alive
            .into_iter()
            .take(LEADERBOARD_SIZE)
            .map(|p| LeaderEntry {
                level: p.level,
                name: p.name.clone(),
            })
            .collect()
    }
}
