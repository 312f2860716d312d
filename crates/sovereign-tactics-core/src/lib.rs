//! Sovereign Tactics Core Library
//!
//! This crate contains the simulation core for Sovereign Tactics, a
//! turn-based grid strategy game: terrain, cities, unit production,
//! movement and A* pathing, dice-roll combat, city capture, per-player
//! visibility and a rule-based AI.
//!
//! # Design Principles
//!
//! - **No UI dependencies**: hosts drive the game through [`Command`]s and
//!   render from [`GameEvent`]s
//! - **Deterministic**: all randomness flows through an injected
//!   [`RandomSource`], so the same seed replays the same game
//! - **Serializable**: full state round-trips through [`GameSnapshot`]
//! - **Single-threaded**: a [`Game`] owns its world outright

// Core modules
pub mod coord;
pub mod map;
pub mod terrain;
pub mod types;

// Game state modules
pub mod error;
pub mod player;
pub mod settings;
pub mod world;

// Map generation
pub mod mapgen;

// Units, movement and combat
pub mod combat;
pub mod pathfinding;
pub mod unit;

// Cities and production
pub mod city;

// Turn flow and commands
pub mod commands;
pub mod events;
pub mod game;

// Computer players
pub mod ai;

// Visibility
pub mod visibility;

// Randomness
pub mod random;

// Persistence and tooling
pub mod selfplay;
pub mod snapshot;

// Re-exports for convenience
pub use city::{City, ProductionRequest};
pub use combat::{resolve_city_capture, resolve_unit_combat, CityCaptureOutcome, UnitCombatOutcome};
pub use commands::Command;
pub use coord::GridCoord;
pub use error::GameError;
pub use events::{DestroyReason, EventQueue, GameEvent};
pub use game::{AttackOutcome, CaptureAttempt, Game, MoveOutcome, TurnPhase};
pub use map::Map;
pub use mapgen::{MapGenConfig, MapGenerator};
pub use pathfinding::{can_enter, find_path, follow_path, PathProgress, PathStatus};
pub use player::{
    AiBehavior, AiDifficulty, AiStrategy, ParseAiError, Player, PlayerStats, TurnStats,
};
pub use random::{RandomSource, ScriptedRandom, SeededRandom};
pub use settings::{GameConfig, GameSettings, PlayerConfig, SettingsError};
pub use snapshot::{GameSnapshot, SNAPSHOT_VERSION};
pub use terrain::Terrain;
pub use types::*;
pub use unit::{Unit, UnitDomain, UnitStats, UnitType};
pub use visibility::{VisibilityGrid, VisibilityTracker};
pub use world::WorldState;
