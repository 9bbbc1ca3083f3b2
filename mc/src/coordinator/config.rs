//! Coordinator configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;

/// Timing knobs for the coordinator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Shortest music duration in milliseconds
    #[serde(default = "default_music_min_ms")]
    pub music_min_ms: u64,

    /// Longest music duration in milliseconds
    #[serde(default = "default_music_max_ms")]
    pub music_max_ms: u64,

    /// Scramble window after the music stops, in milliseconds
    #[serde(default = "default_grace_ms")]
    pub grace_ms: u64,

    /// Seed for the music duration generator
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_music_min_ms() -> u64 {
    500
}

fn default_music_max_ms() -> u64 {
    2000
}

fn default_grace_ms() -> u64 {
    250
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            music_min_ms: default_music_min_ms(),
            music_max_ms: default_music_max_ms(),
            grace_ms: default_grace_ms(),
            seed: None,
        }
    }
}

impl From<&Config> for CoordinatorConfig {
    fn from(config: &Config) -> Self {
        debug!("CoordinatorConfig::from: called");
        Self {
            music_min_ms: config.music_min_ms,
            music_max_ms: config.music_max_ms,
            grace_ms: config.grace_ms,
            seed: config.seed,
        }
    }
}

impl CoordinatorConfig {
    /// Get the scramble window as a Duration
    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }
}
