//! Notifications emitted by the engine for the host to consume.
//!
//! Events are queued only when state actually changed. The host drains the
//! queue after each command (or each `end_turn`) and renders, animates or
//! logs them as it sees fit.

use crate::coord::GridCoord;
use crate::types::{CityId, PlayerId, UnitId};
use crate::unit::UnitType;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Why a unit left the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DestroyReason {
    /// Lost a unit-vs-unit battle.
    Combat,
    /// Died attempting to take a city.
    FailedCapture,
}

/// Everything the host may want to react to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    GameStarted {
        players: usize,
        width: u32,
        height: u32,
    },
    TurnStarted {
        player: PlayerId,
        turn_number: u32,
        has_actions: bool,
    },
    TurnEnded {
        player: PlayerId,
    },
    UnitMoved {
        unit: UnitId,
        from: GridCoord,
        to: GridCoord,
    },
    UnitProduced {
        unit: UnitId,
        unit_type: UnitType,
        city: CityId,
        position: GridCoord,
    },
    UnitDestroyed {
        unit: UnitId,
        owner: PlayerId,
        reason: DestroyReason,
    },
    CombatResolved {
        attacker: UnitId,
        defender: UnitId,
        attacker_wins: bool,
    },
    CityCaptured {
        city: CityId,
        unit: UnitId,
        player: PlayerId,
        success: bool,
        /// The new owner must pick what to build before production resumes.
        awaiting_production_choice: bool,
    },
    PlayerEliminated {
        player: PlayerId,
    },
    GameEnded {
        winner: Option<PlayerId>,
    },
}

impl GameEvent {
    /// Get a human-readable description of the event.
    pub fn description(&self) -> String {
        match self {
            GameEvent::GameStarted { players, .. } => format!("Game started with {} players", players),
            GameEvent::TurnStarted {
                player,
                turn_number,
                ..
            } => format!("Turn {} for player {}", turn_number, player),
            GameEvent::TurnEnded { player } => format!("Player {} ended their turn", player),
            GameEvent::UnitMoved { unit, to, .. } => format!("Unit {} moved to {}", unit, to),
            GameEvent::UnitProduced {
                unit_type, city, ..
            } => format!("City {} produced a {}", city, unit_type),
            GameEvent::UnitDestroyed { unit, reason, .. } => {
                format!("Unit {} destroyed ({:?})", unit, reason)
            }
            GameEvent::CombatResolved {
                attacker,
                defender,
                attacker_wins,
            } => {
                let winner = if *attacker_wins { attacker } else { defender };
                format!("Unit {} attacked unit {}; unit {} won", attacker, defender, winner)
            }
            GameEvent::CityCaptured {
                city,
                player,
                success,
                ..
            } => {
                if *success {
                    format!("Player {} captured city {}", player, city)
                } else {
                    format!("Player {} failed to capture city {}", player, city)
                }
            }
            GameEvent::PlayerEliminated { player } => format!("Player {} eliminated", player),
            GameEvent::GameEnded { winner: Some(p) } => format!("Player {} won the game", p),
            GameEvent::GameEnded { winner: None } => "Game ended without a winner".to_string(),
        }
    }
}

/// FIFO of pending events.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EventQueue {
    events: VecDeque<GameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: GameEvent) {
        self.events.push_back(event);
    }

    /// Take all pending events, oldest first.
    pub fn drain(&mut self) -> Vec<GameEvent> {
        self.events.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Peek at pending events without consuming them.
    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.iter()
    }
}
