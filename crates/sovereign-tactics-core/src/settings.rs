//! Game settings and configuration.

use crate::player::{AiDifficulty, AiStrategy};
use crate::types::MAX_PLAYERS;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest map edge accepted by [`GameSettings::validate`].
pub const MIN_MAP_EDGE: u32 = 5;

/// Configuration for a game session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Map width in tiles.
    pub map_width: u32,
    /// Map height in tiles.
    pub map_height: u32,
    /// Seed for map generation.
    pub seed: u64,
    /// Maximum number of rounds (0 = unlimited).
    pub max_turns: u32,
    /// Explored tiles stay revealed. When false, vision is recomputed from
    /// scratch every turn.
    pub persistent_exploration: bool,
    /// Player-turns processed automatically per call before control returns
    /// to the host. Keeps an all-AI game from running unbounded in one call.
    pub max_automatic_turns: u32,
    /// Fraction of tiles generated as ocean (0.0-1.0).
    pub ocean_ratio: f32,
    /// Fraction of tiles generated as mountains (0.0-1.0).
    pub mountain_ratio: f32,
    /// Map tiles per generated city.
    pub tiles_per_city: u32,
}

impl GameSettings {
    /// Create default settings for a map of the given size.
    pub fn new(map_width: u32, map_height: u32) -> Self {
        Self {
            map_width,
            map_height,
            seed: 0,
            max_turns: 0,
            persistent_exploration: true,
            max_automatic_turns: 512,
            ocean_ratio: 0.0,
            mountain_ratio: 0.1,
            tiles_per_city: 100,
        }
    }

    /// Builder-style seed override.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Validate settings and return any errors.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.map_width < MIN_MAP_EDGE || self.map_height < MIN_MAP_EDGE {
            return Err(SettingsError::MapTooSmall {
                width: self.map_width,
                height: self.map_height,
            });
        }
        let ratios = [self.ocean_ratio, self.mountain_ratio];
        if ratios.iter().any(|r| !(0.0..=1.0).contains(r))
            || self.ocean_ratio + self.mountain_ratio > 1.0
        {
            return Err(SettingsError::InvalidTerrainRatio);
        }
        if self.tiles_per_city == 0 {
            return Err(SettingsError::InvalidCityDensity);
        }
        if self.max_automatic_turns == 0 {
            return Err(SettingsError::NoAutomaticTurns);
        }
        Ok(())
    }

    /// Number of map tiles.
    pub fn tile_count(&self) -> u32 {
        self.map_width * self.map_height
    }
}

impl Default for GameSettings {
    fn default() -> Self {
        Self::new(50, 40)
    }
}

/// One seat at the table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub name: String,
    pub is_human: bool,
    #[serde(default)]
    pub ai_strategy: Option<AiStrategy>,
    #[serde(default)]
    pub ai_difficulty: Option<AiDifficulty>,
}

impl PlayerConfig {
    pub fn human(name: &str) -> Self {
        Self {
            name: name.to_string(),
            is_human: true,
            ai_strategy: None,
            ai_difficulty: None,
        }
    }

    pub fn ai(name: &str, strategy: AiStrategy) -> Self {
        Self {
            name: name.to_string(),
            is_human: false,
            ai_strategy: Some(strategy),
            ai_difficulty: None,
        }
    }

    /// Builder-style difficulty override.
    pub fn with_difficulty(mut self, difficulty: AiDifficulty) -> Self {
        self.ai_difficulty = Some(difficulty);
        self
    }
}

/// Everything needed to start a game.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub settings: GameSettings,
    #[serde(default)]
    pub players: Vec<PlayerConfig>,
}

impl GameConfig {
    pub fn new(settings: GameSettings, players: Vec<PlayerConfig>) -> Self {
        Self { settings, players }
    }

    /// Parse a config from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The seats actually used. Fewer than two configured players falls back
    /// to one human against one AI.
    pub fn effective_players(&self) -> Vec<PlayerConfig> {
        if self.players.len() < 2 {
            return vec![
                PlayerConfig::human("Player 1"),
                PlayerConfig::ai("AI Player", AiStrategy::default()),
            ];
        }
        self.players.clone()
    }

    /// Validate settings and the seat list.
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.settings.validate()?;
        let players = self.effective_players();
        if players.len() > MAX_PLAYERS {
            return Err(SettingsError::TooManyPlayers(players.len()));
        }
        if players.iter().any(|p| p.name.trim().is_empty()) {
            return Err(SettingsError::EmptyPlayerName);
        }
        if (self.settings.tile_count() as usize) < players.len() * 4 {
            return Err(SettingsError::MapTooSmall {
                width: self.settings.map_width,
                height: self.settings.map_height,
            });
        }
        Ok(())
    }
}

/// Errors from invalid game settings.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("map {width}x{height} is too small")]
    MapTooSmall { width: u32, height: u32 },
    #[error("{0} players requested, maximum is 8")]
    TooManyPlayers(usize),
    #[error("terrain ratios must be within 0.0-1.0 and sum to at most 1.0")]
    InvalidTerrainRatio,
    #[error("tiles per city must be positive")]
    InvalidCityDensity,
    #[error("automatic turn limit must be positive")]
    NoAutomaticTurns,
    #[error("player names cannot be empty")]
    EmptyPlayerName,
}
