//! Game configuration.
//!
//! Loaded from an optional TOML file; every field has a default so an empty
//! file (or no file) gives two-player local play against nobody.

use std::path::Path;
use std::time::Duration;

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use xando_engine::Difficulty;

/// Local play mode.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum GameMode {
    /// One human against the computer.
    Solo,
    /// Two humans sharing one board.
    #[default]
    OfflineMulti,
}

/// Session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
pub struct GameConfig {
    /// Local play mode.
    #[serde(default)]
    mode: GameMode,

    /// Computer strength (solo mode only).
    #[serde(default)]
    difficulty: Difficulty,

    /// Pause before the computer answers, in milliseconds.
    #[serde(default = "default_ai_delay_ms")]
    ai_delay_ms: u64,

    /// Name announced to the remote opponent. Generated when absent.
    #[serde(default)]
    #[setters(strip_option)]
    player_name: Option<String>,

    /// Remote collection holding game records.
    #[serde(default = "default_collection")]
    #[setters(into)]
    collection: String,
}

#[instrument]
fn default_ai_delay_ms() -> u64 {
    500
}

#[instrument]
fn default_collection() -> String {
    "games".to_string()
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            mode: GameMode::default(),
            difficulty: Difficulty::default(),
            ai_delay_ms: default_ai_delay_ms(),
            player_name: None,
            collection: default_collection(),
        }
    }
}

impl GameConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml(&content)?;
        info!(mode = %config.mode, difficulty = %config.difficulty, "Config loaded successfully");
        Ok(config)
    }

    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))
    }

    /// Returns the computer's thinking delay.
    pub fn ai_delay(&self) -> Duration {
        Duration::from_millis(self.ai_delay_ms)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = GameConfig::from_toml("").unwrap();
        assert_eq!(config, GameConfig::default());
        assert_eq!(*config.mode(), GameMode::OfflineMulti);
        assert_eq!(*config.difficulty(), Difficulty::Medium);
        assert_eq!(config.ai_delay(), Duration::from_millis(500));
        assert_eq!(config.collection(), "games");
    }

    #[test]
    fn test_parses_wire_names() {
        let config = GameConfig::from_toml(
            r#"
            mode = "SOLO"
            difficulty = "HARD"
            ai_delay_ms = 0
            player_name = "Ada"
            "#,
        )
        .unwrap();
        assert_eq!(*config.mode(), GameMode::Solo);
        assert_eq!(*config.difficulty(), Difficulty::Hard);
        assert_eq!(config.ai_delay(), Duration::ZERO);
        assert_eq!(config.player_name().as_deref(), Some("Ada"));
    }

    #[test]
    fn test_rejects_unknown_mode() {
        let err = GameConfig::from_toml(r#"mode = "ONLINE""#).unwrap_err();
        assert!(err.message.contains("Failed to parse config"));
    }

    #[test]
    fn test_mode_parses_case_insensitively() {
        assert_eq!("solo".parse::<GameMode>().unwrap(), GameMode::Solo);
        assert_eq!("OFFLINE_MULTI".parse::<GameMode>().unwrap(), GameMode::OfflineMulti);
        assert_eq!(GameMode::OfflineMulti.to_string(), "OFFLINE_MULTI");
    }

    #[test]
    fn test_setters_override() {
        let config = GameConfig::default()
            .with_mode(GameMode::Solo)
            .with_player_name("Bea".to_string())
            .with_collection("lobby");
        assert_eq!(*config.mode(), GameMode::Solo);
        assert_eq!(config.player_name().as_deref(), Some("Bea"));
        assert_eq!(config.collection(), "lobby");
    }
}
