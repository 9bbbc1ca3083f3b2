//! Musical chairs configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::Semaphore;
use tracing::debug;

use crate::error::GameError;

/// Game configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of players at the start of the game
    pub players: usize,

    /// Shortest time the music plays before stopping, in milliseconds
    #[serde(rename = "music-min-ms")]
    pub music_min_ms: u64,

    /// Longest time the music plays before stopping, in milliseconds
    #[serde(rename = "music-max-ms")]
    pub music_max_ms: u64,

    /// Scramble window after the music stops, in milliseconds
    #[serde(rename = "grace-ms")]
    pub grace_ms: u64,

    /// Seed for the music duration generator (random if unset)
    pub seed: Option<u64>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            players: crate::DEFAULT_PLAYERS,
            music_min_ms: 500,
            music_max_ms: 2000,
            grace_ms: 250,
            seed: None,
            log_level: None,
        }
    }
}

impl Config {
    /// Validate configuration before any task is started
    pub fn validate(&self) -> Result<(), GameError> {
        debug!(?self, "Config::validate: called");
        if self.players < 2 {
            return Err(GameError::config(format!(
                "players must be at least 2, got {}",
                self.players
            )));
        }
        if self.players - 1 > Semaphore::MAX_PERMITS {
            return Err(GameError::config(format!(
                "players must be at most {}, got {}",
                Semaphore::MAX_PERMITS + 1,
                self.players
            )));
        }
        if self.music_min_ms > self.music_max_ms {
            return Err(GameError::config(format!(
                "music-min-ms ({}) must not exceed music-max-ms ({})",
                self.music_min_ms, self.music_max_ms
            )));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, it must load
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .musicalchairs.yml
        let local_config = PathBuf::from(".musicalchairs.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/musicalchairs/musicalchairs.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("musicalchairs").join("musicalchairs.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.players, 4);
        assert_eq!(config.music_min_ms, 500);
        assert_eq!(config.music_max_ms, 2000);
        assert_eq!(config.grace_ms, 250);
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_too_few_players() {
        for players in [0, 1] {
            let config = Config {
                players,
                ..Default::default()
            };
            let err = config.validate().unwrap_err();
            assert!(err.is_configuration());
        }
    }

    #[test]
    fn test_rejects_inverted_music_bounds() {
        let config = Config {
            music_min_ms: 300,
            music_max_ms: 100,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().is_configuration());
    }

    #[test]
    fn test_equal_music_bounds_allowed() {
        let config = Config {
            music_min_ms: 100,
            music_max_ms: 100,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
players: 6
music-min-ms: 10
music-max-ms: 40
grace-ms: 5
seed: 42
log-level: debug
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.players, 6);
        assert_eq!(config.music_max_ms, 40);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("players: 3").unwrap();
        assert_eq!(config.players, 3);
        assert_eq!(config.grace_ms, 250);
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "players: 5\nlog-level: warn").unwrap();
        let path = file.path().to_path_buf();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.players, 5);
        assert_eq!(config.log_level.as_deref(), Some("warn"));
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let path = PathBuf::from("/nonexistent/musicalchairs.yml");
        assert!(Config::load(Some(&path)).is_err());
    }
}
