use narwhal_shared::config::{default_rooms, GameTuning, RoomConfig};
use std::collections::HashSet;

pub const ENV_LISTEN_ADDR: &str = "NARWHAL_LISTEN_ADDR";
pub const ENV_TICK_RATE: &str = "NARWHAL_TICK_RATE";
pub const ENV_RNG_SEED: &str = "NARWHAL_RNG_SEED";

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub tick_rate_hz: u32,
    /// Upper bound on a single integration step, in seconds.
    pub max_step_secs: f64,
    pub leaderboard_interval_secs: f64,
    /// Outbound frames queued per connection before new ones are dropped.
    pub outbox_capacity: usize,
    /// Larger inbound messages are dropped unread.
    pub max_message_size: usize,
    /// Fixed seed for reproducible runs; entropy when unset.
    pub rng_seed: Option<u64>,
    pub tuning: GameTuning,
    pub rooms: Vec<RoomConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:443".to_string(),
            tick_rate_hz: 120,
            max_step_secs: 0.016,
            leaderboard_interval_secs: 2.0,
            outbox_capacity: 256,
            max_message_size: 1024,
            rng_seed: None,
            tuning: GameTuning::default(),
            rooms: default_rooms(),
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, String> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, String> {
        if let Some(addr) = lookup(ENV_LISTEN_ADDR) {
            self.listen_addr = addr;
        }
        if let Some(rate) = lookup(ENV_TICK_RATE) {
            self.tick_rate_hz = rate
                .trim()
                .parse()
                .map_err(|e| format!("{ENV_TICK_RATE}: {e}"))?;
        }
        if let Some(seed) = lookup(ENV_RNG_SEED) {
            let seed = seed
                .trim()
                .parse()
                .map_err(|e| format!("{ENV_RNG_SEED}: {e}"))?;
            self.rng_seed = Some(seed);
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.tick_rate_hz == 0 || self.tick_rate_hz > 1000 {
            return Err("tick_rate_hz must be in 1..=1000".to_string());
        }
        if !(self.max_step_secs > 0.0) {
            return Err("max_step_secs must be > 0".to_string());
        }
        if !(self.leaderboard_interval_secs > 0.0) {
            return Err("leaderboard_interval_secs must be > 0".to_string());
        }
        if self.outbox_capacity == 0 {
            return Err("outbox_capacity must be > 0".to_string());
        }
        if self.max_message_size == 0 {
            return Err("max_message_size must be > 0".to_string());
        }
        if self.rooms.is_empty() {
            return Err("at least one room is required".to_string());
        }
        let mut ids = HashSet::new();
        for room in &self.rooms {
            room.validate()?;
            if !ids.insert(room.id) {
                return Err(format!("duplicate room id {}", room.id));
            }
        }
        self.tuning.validate()
    }

    pub fn tick_duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / self.tick_rate_hz as f64)
    }
}
