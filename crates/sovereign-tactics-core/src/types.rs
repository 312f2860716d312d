//! Core type aliases and constants used throughout the crate.

/// Player index into the turn order (0-7).
pub type PlayerId = u8;

/// Unique identifier for a unit.
pub type UnitId = u64;

/// Unique identifier for a city.
pub type CityId = u64;

/// Maximum number of players in a single game.
pub const MAX_PLAYERS: usize = 8;

/// Radius (Manhattan) revealed around every owned unit and city.
pub const VISIBILITY_RANGE: u32 = 2;

/// Defense value a freshly founded city starts with.
pub const DEFAULT_CITY_DEFENSE: u32 = 15;

/// Upper bound on nodes expanded by a single path search.
pub const MAX_PATH_EXPANSIONS: usize = 1000;

/// Starting (and maximum) unit health.
pub const MAX_HEALTH: u32 = 100;
