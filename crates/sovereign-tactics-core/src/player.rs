//! Player state, statistics and AI personality.

use crate::types::{CityId, PlayerId};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// A player in the game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Position in the turn order.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Humans are handed control; everyone else is played by the AI.
    pub is_human: bool,
    /// Whether this player has been eliminated.
    pub eliminated: bool,
    /// ID of this player's starting city.
    pub capital: Option<CityId>,
    /// AI strategy (ignored for humans).
    pub ai_strategy: AiStrategy,
    /// AI difficulty (ignored for humans).
    pub ai_difficulty: AiDifficulty,
    /// Lifetime statistics.
    pub stats: PlayerStats,
    /// Counters reset at the start of each of this player's turns.
    pub turn_stats: TurnStats,
}

impl Player {
    /// Create a human player.
    pub fn human(id: PlayerId, name: String) -> Self {
        Self {
            id,
            name,
            is_human: true,
            eliminated: false,
            capital: None,
            ai_strategy: AiStrategy::default(),
            ai_difficulty: AiDifficulty::default(),
            stats: PlayerStats::default(),
            turn_stats: TurnStats::default(),
        }
    }

    /// Create an AI player.
    pub fn ai(id: PlayerId, name: String, strategy: AiStrategy, difficulty: AiDifficulty) -> Self {
        Self {
            is_human: false,
            ai_strategy: strategy,
            ai_difficulty: difficulty,
            ..Self::human(id, name)
        }
    }

    pub fn is_active(&self) -> bool {
        !self.eliminated
    }

    pub fn eliminate(&mut self) {
        self.eliminated = true;
    }

    /// Clear per-turn counters and count the turn.
    pub fn begin_turn(&mut self) {
        self.turn_stats = TurnStats::default();
        self.stats.turns_played += 1;
    }

    /// Behavior knobs derived from difficulty.
    pub fn ai_behavior(&self) -> AiBehavior {
        self.ai_difficulty.behavior()
    }
}

/// Cumulative per-player statistics.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub units_created: u32,
    pub units_lost: u32,
    pub enemies_destroyed: u32,
    pub cities_captured: u32,
    pub battles_won: u32,
    pub battles_lost: u32,
    pub turns_played: u32,
}

/// Counters for the player's current turn.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnStats {
    pub units_created_this_turn: u32,
}

/// High-level plan an AI player follows every turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiStrategy {
    /// Hunt enemy units first, then enemy cities.
    Aggressive,
    /// Keep units close to owned cities.
    Defensive,
    /// Grab neutral cities.
    Economic,
    /// Mix of expansion, combat and exploration.
    #[default]
    Balanced,
}

impl AiStrategy {
    pub const fn all() -> &'static [AiStrategy] {
        &[
            AiStrategy::Aggressive,
            AiStrategy::Defensive,
            AiStrategy::Economic,
            AiStrategy::Balanced,
        ]
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            AiStrategy::Aggressive => "aggressive",
            AiStrategy::Defensive => "defensive",
            AiStrategy::Economic => "economic",
            AiStrategy::Balanced => "balanced",
        }
    }
}

impl std::fmt::Display for AiStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AiStrategy {
    type Err = ParseAiError;

    /// Case-insensitive, matching the serialized names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AiStrategy::all()
            .iter()
            .copied()
            .find(|strategy| strategy.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseAiError::new("strategy", s))
    }
}

/// AI skill level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiDifficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl AiDifficulty {
    pub const fn all() -> &'static [AiDifficulty] {
        &[AiDifficulty::Easy, AiDifficulty::Medium, AiDifficulty::Hard]
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            AiDifficulty::Easy => "easy",
            AiDifficulty::Medium => "medium",
            AiDifficulty::Hard => "hard",
        }
    }

    pub const fn behavior(&self) -> AiBehavior {
        match self {
            AiDifficulty::Easy => AiBehavior {
                mistake_chance: 0.3,
            },
            AiDifficulty::Medium => AiBehavior {
                mistake_chance: 0.15,
            },
            AiDifficulty::Hard => AiBehavior {
                mistake_chance: 0.05,
            },
        }
    }
}

impl std::fmt::Display for AiDifficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AiDifficulty {
    type Err = ParseAiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AiDifficulty::all()
            .iter()
            .copied()
            .find(|difficulty| difficulty.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseAiError::new("difficulty", s))
    }
}

/// An AI strategy or difficulty name that matched nothing.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseAiError {
    kind: &'static str,
    value: String,
}

impl ParseAiError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Tunables applied by the AI policy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AiBehavior {
    /// Probability that a unit sits out the turn.
    pub mistake_chance: f64,
}
