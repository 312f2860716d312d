//! Errors returned by game commands.
//!
//! A command that returns `Err` has not changed any game state.

use crate::coord::GridCoord;
use crate::settings::SettingsError;
use crate::types::{CityId, PlayerId, UnitId};
use crate::unit::UnitType;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum GameError {
    #[error("unit {unit} cannot move to {to}: {reason}")]
    InvalidMove {
        unit: UnitId,
        to: GridCoord,
        reason: &'static str,
    },

    #[error("unit {attacker} cannot attack unit {target}: {reason}")]
    InvalidAttack {
        attacker: UnitId,
        target: UnitId,
        reason: &'static str,
    },

    #[error("no path from {from} to {to}")]
    NoPathFound { from: GridCoord, to: GridCoord },

    #[error("city {city} cannot produce {unit_type}")]
    InvalidProductionType { city: CityId, unit_type: UnitType },

    #[error("player index {0} is out of range")]
    InvalidPlayerIndex(usize),

    #[error("unknown unit {0}")]
    UnknownUnit(UnitId),

    #[error("unknown city {0}")]
    UnknownCity(CityId),

    #[error("unit {unit} does not belong to player {player}")]
    NotYourUnit { unit: UnitId, player: PlayerId },

    #[error("city {city} does not belong to player {player}")]
    NotYourCity { city: CityId, player: PlayerId },

    #[error("game is not accepting player actions")]
    GameNotInProgress,

    #[error("game has already started")]
    AlreadyStarted,

    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] SettingsError),

    #[error("invalid snapshot: {0}")]
    Snapshot(String),
}
