//! Runtime configuration assembled from defaults and the environment.
use std::env;
use std::time::Duration;

use game_core::GameConfig;

/// Settings for a [`Simulation`](crate::Simulation).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RuntimeConfig {
    pub game_config: GameConfig,
    /// Minimum real time between two processed tick requests.
    pub request_delay: Duration,
    /// Simulation seed; zone seeds are derived from it.
    pub seed: String,
    /// Dimensions of generated zones.
    pub zone_width: u32,
    pub zone_height: u32,
}

impl RuntimeConfig {
    pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(200);
    pub const DEFAULT_SEED: &'static str = "dungeon";
    pub const DEFAULT_ZONE_WIDTH: u32 = 41;
    pub const DEFAULT_ZONE_HEIGHT: u32 = 25;

    /// Construct configuration from environment variables.
    ///
    /// Environment variables (unset or unparseable values keep the default):
    /// - `DUNGEON_SEED` - simulation seed string
    /// - `DUNGEON_WIDTH` / `DUNGEON_HEIGHT` - generated zone size in tiles
    /// - `DUNGEON_TICK_DELAY_MS` - scheduler gate in milliseconds
    /// - `DUNGEON_LIGHT_RANGE` - light rings propagated per tick
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(seed) = env::var("DUNGEON_SEED") {
            config.seed = seed;
        }
        if let Some(width) = read_env::<u32>("DUNGEON_WIDTH") {
            config.zone_width = width.max(1);
        }
        if let Some(height) = read_env::<u32>("DUNGEON_HEIGHT") {
            config.zone_height = height.max(1);
        }
        if let Some(delay) = read_env::<u64>("DUNGEON_TICK_DELAY_MS") {
            config.request_delay = Duration::from_millis(delay);
        }
        if let Some(range) = read_env::<usize>("DUNGEON_LIGHT_RANGE") {
            config.game_config.light.range = range.min(GameConfig::MAX_LIGHT_RADIUS);
        }

        config
    }

    pub fn with_seed(mut self, seed: impl Into<String>) -> Self {
        self.seed = seed.into();
        self
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            game_config: GameConfig::default(),
            request_delay: Self::DEFAULT_REQUEST_DELAY,
            seed: Self::DEFAULT_SEED.to_owned(),
            zone_width: Self::DEFAULT_ZONE_WIDTH,
            zone_height: Self::DEFAULT_ZONE_HEIGHT,
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = RuntimeConfig::default();
        assert_eq!(config.request_delay, Duration::from_millis(200));
        assert_eq!(config.game_config.light.range, 10);
        assert_eq!(config.game_config.spatial.cell_capacity, 10);
    }

    #[test]
    fn builders_override_fields() {
        let config = RuntimeConfig::default()
            .with_seed("crypt")
            .with_request_delay(Duration::ZERO);
        assert_eq!(config.seed, "crypt");
        assert_eq!(config.request_delay, Duration::ZERO);
    }

    #[test]
    fn config_serializes_through_json() {
        let config = RuntimeConfig::default().with_seed("json");
        let json = serde_json::to_string(&config).unwrap();
        let back: RuntimeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
