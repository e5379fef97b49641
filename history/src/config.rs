use serde::Deserialize;
use std::time::Duration;

use crate::ledger::HeightRange;

/// Environment variable prefix, e.g. `HISTORY_MIN_HEIGHT`
pub const ENV_PREFIX: &str = "HISTORY";

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    /// Lowest block height included in the confirmed history
    #[serde(default)]
    pub min_height: u64,

    /// Highest block height included in the confirmed history
    #[serde(default = "default_max_height")]
    pub max_height: u64,

    /// Background refresh interval in seconds
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Run the background refresher at all
    #[serde(default = "default_refresh_enabled")]
    pub refresh_enabled: bool,
}

fn default_max_height() -> u64 {
    u64::MAX
}

fn default_refresh_interval_secs() -> u64 {
    10
}

fn default_refresh_enabled() -> bool {
    true
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            min_height: 0,
            max_height: default_max_height(),
            refresh_interval_secs: default_refresh_interval_secs(),
            refresh_enabled: default_refresh_enabled(),
        }
    }
}

impl HistoryConfig {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let cfg = config::Config::builder()
            // Double underscore nests, so HISTORY_MIN_HEIGHT maps to `min_height`.
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        cfg.try_deserialize()
    }

    /// Height window for the confirmed ledger queries
    pub fn height_range(&self) -> HeightRange {
        HeightRange::new(self.min_height, self.max_height)
    }

    /// Get refresh interval as Duration
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.min_height > self.max_height {
            return Err(format!(
                "min_height ({}) must not exceed max_height ({})",
                self.min_height, self.max_height
            ));
        }

        if self.refresh_enabled && self.refresh_interval_secs == 0 {
            return Err("refresh_interval_secs must be greater than 0".to_string());
        }

        Ok(())
    }
}
