//! The mutation vocabulary shared by human input and the AI.
//!
//! Every state change a player can make is a [`Command`], applied through
//! [`crate::game::Game::apply_command`].

use crate::coord::GridCoord;
use crate::types::{CityId, UnitId};
use crate::unit::UnitType;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    MoveUnit {
        unit_id: UnitId,
        to: GridCoord,
    },
    AttackUnit {
        attacker_id: UnitId,
        target_id: UnitId,
    },
    SetMovementPath {
        unit_id: UnitId,
        to: GridCoord,
    },
    ClearMovementPath {
        unit_id: UnitId,
    },
    StartProduction {
        city_id: CityId,
        unit_type: UnitType,
    },
    SetCapturedCityProduction {
        city_id: CityId,
        unit_type: UnitType,
    },
    CancelProduction {
        city_id: CityId,
    },
    EndTurn,
}

impl Command {
    /// Get a human-readable description of the command.
    pub fn description(&self) -> String {
        match self {
            Command::MoveUnit { unit_id, to } => format!("Move unit {} to {}", unit_id, to),
            Command::AttackUnit {
                attacker_id,
                target_id,
            } => format!("Unit {} attacks unit {}", attacker_id, target_id),
            Command::SetMovementPath { unit_id, to } => {
                format!("Route unit {} to {}", unit_id, to)
            }
            Command::ClearMovementPath { unit_id } => format!("Clear route of unit {}", unit_id),
            Command::StartProduction { city_id, unit_type }
            | Command::SetCapturedCityProduction { city_id, unit_type } => {
                format!("City {} builds {}", city_id, unit_type)
            }
            Command::CancelProduction { city_id } => format!("City {} stops production", city_id),
            Command::EndTurn => "End turn".to_string(),
        }
    }
}
