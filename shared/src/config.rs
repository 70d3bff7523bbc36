use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Playfield variant of a room. Serialised as its numeric wire value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum FieldType {
    Normal,
    Soccer,
}

impl From<FieldType> for u8 {
    fn from(field: FieldType) -> u8 {
        match field {
            FieldType::Normal => 0,
            FieldType::Soccer => 1,
        }
    }
}

impl TryFrom<u8> for FieldType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(FieldType::Normal),
            1 => Ok(FieldType::Soccer),
            other => Err(format!("unknown field type {}", other)),
        }
    }
}

/// Per-room options, sent verbatim to the client in the lobby list.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RoomOptions {
    pub width: f64,
    pub height: f64,
    pub cell_width: f64,
    pub has_indicator: bool,
    pub is_priority: bool,
    #[ts(type = "number")]
    pub field_type: FieldType,
    pub desirable_player_num: u32,
    pub has_slow_factor: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    pub id: u32,
    pub name: String,
    pub options: RoomOptions,
}

/// One entry of the GET_LOBBIES response.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LobbySummary {
    pub options: RoomOptions,
    pub name: String,
    pub id: u32,
    pub player_count: u32,
}

impl RoomConfig {
    fn new(id: u32, name: &str, width: f64, height: f64, field_type: FieldType) -> Self {
        let soccer = field_type == FieldType::Soccer;
        Self {
            id,
            name: name.to_string(),
            options: RoomOptions {
                width,
                height,
                cell_width: 1280.0,
                has_indicator: soccer,
                is_priority: false,
                field_type,
                desirable_player_num: 25,
                has_slow_factor: soccer,
            },
        }
    }

    fn priority(mut self) -> Self {
        self.options.is_priority = true;
        self
    }

    fn desirable(mut self, players: u32) -> Self {
        self.options.desirable_player_num = players;
        self
    }

    pub fn is_soccer(&self) -> bool {
        self.options.field_type == FieldType::Soccer
    }

    pub fn validate(&self) -> Result<(), String> {
        let o = &self.options;
        if !o.width.is_finite() || !o.height.is_finite() || o.width < 1000.0 || o.height < 1000.0
        {
            return Err(format!(
                "room {} must be at least 1000x1000, got {}x{}",
                self.id, o.width, o.height
            ));
        }
        if self.id > u8::MAX as u32 {
            return Err(format!("room id {} does not fit the JOIN_ROOM byte", self.id));
        }
        Ok(())
    }
}

/// The fixed set of rooms the server hosts.
pub fn default_rooms() -> Vec<RoomConfig> {
    vec![
        RoomConfig::new(1, "Large 1", 6400.0, 6400.0, FieldType::Normal).priority(),
        RoomConfig::new(2, "Large 2", 6400.0, 6400.0, FieldType::Normal).priority(),
        RoomConfig::new(3, "Sparse", 6400.0, 6400.0, FieldType::Normal).desirable(15),
        RoomConfig::new(4, "Small 1", 3840.0, 3840.0, FieldType::Normal).desirable(9),
        RoomConfig::new(5, "Small 2", 3840.0, 3840.0, FieldType::Normal).desirable(9),
        RoomConfig::new(6, "Narwhale Ball!", 6400.0, 3840.0, FieldType::Soccer),
    ]
}

/// Gameplay tuning. Distances are world units, times seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameTuning {
    /// Per-tick velocity multiplier
    pub friction: f64,
    pub acceleration: f64,
    pub max_speed: f64,
    pub dash_max_speed: f64,
    pub dash_power: f64,
    pub dash_cooldown: f64,
    /// Dash charge regained per second
    pub dash_regen_rate: f64,
    pub max_dash: u8,
    pub retreat_power: f64,
    pub retreat_cost: u8,
    pub retreat_cooldown: f64,
    pub push_force: f64,
    pub bounce_force: f64,
    pub hit_stun: f64,
    /// Size advantage needed for a horn hit to kill
    pub horn_threshold: f64,
    pub dash_attack_bonus: f64,
    pub tusk_ratio: f64,
    pub base_size: f64,
    pub max_size: f64,
    pub growth_per_kill: f64,
    pub spawn_invincible_time: f64,
    pub respawn_delay: f64,
}

impl Default for GameTuning {
    fn default() -> Self {
        Self {
            friction: 0.92,
            acceleration: 340.0,
            max_speed: 200.0,
            dash_max_speed: 480.0,
            dash_power: 500.0,
            dash_cooldown: 2.0,
            dash_regen_rate: 0.5,
            max_dash: 1,
            retreat_power: 220.0,
            retreat_cost: 1,
            retreat_cooldown: 1.0,
            push_force: 150.0,
            bounce_force: 80.0,
            hit_stun: 0.2,
            horn_threshold: 8.0,
            dash_attack_bonus: 15.0,
            tusk_ratio: 0.5,
            base_size: 36.0,
            max_size: 120.0,
            growth_per_kill: 4.0,
            spawn_invincible_time: 2.5,
            respawn_delay: 1.0,
        }
    }
}

impl GameTuning {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.friction > 0.0 && self.friction <= 1.0) {
            return Err("friction must be in (0, 1]".to_string());
        }
        if self.base_size <= 0.0 || self.max_size < self.base_size {
            return Err("max_size must be >= base_size > 0".to_string());
        }
        if self.max_speed <= 0.0 || self.dash_max_speed < self.max_speed {
            return Err("dash_max_speed must be >= max_speed > 0".to_string());
        }
        // Dash charges share a nibble with the max in the snapshot byte.
        if self.max_dash == 0 || self.max_dash > 15 {
            return Err("max_dash must be in 1..=15".to_string());
        }
        if self.horn_threshold < 0.0 {
            return Err("horn_threshold must be >= 0".to_string());
        }
        if self.dash_cooldown < 0.0 || self.retreat_cooldown < 0.0 || self.respawn_delay < 0.0 {
            return Err("cooldowns must be >= 0".to_string());
        }
        Ok(())
    }
}
