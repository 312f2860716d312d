//! Unit types, their fixed stat tables, and per-unit state.

use crate::coord::GridCoord;
use crate::types::{PlayerId, UnitId, MAX_HEALTH};
use serde::{Deserialize, Serialize};

/// A unit on the game map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Unique identifier.
    pub id: UnitId,
    /// Type of unit.
    pub unit_type: UnitType,
    /// Current position on the map.
    pub position: GridCoord,
    /// Owning player.
    pub owner: PlayerId,
    /// Movement points restored at the start of each owner turn.
    pub max_moves: u32,
    /// Movement points left this turn.
    pub moves_remaining: u32,
    /// Has the unit attacked this turn?
    pub has_attacked: bool,
    /// Current health (0-100).
    pub health: u32,
    /// Remaining tiles of a multi-turn movement order, next step first.
    pub movement_path: Vec<GridCoord>,
    /// Is the unit currently following `movement_path`?
    pub moving_along_path: bool,
    /// Set when a path finishes or gets blocked so the owner reviews the unit.
    pub needs_attention: bool,
}

impl Unit {
    /// Create a new unit with a full movement budget.
    pub fn new(id: UnitId, unit_type: UnitType, position: GridCoord, owner: PlayerId) -> Self {
        let max_moves = unit_type.stats().moves;
        Self {
            id,
            unit_type,
            position,
            owner,
            max_moves,
            moves_remaining: max_moves,
            has_attacked: false,
            health: MAX_HEALTH,
            movement_path: Vec::new(),
            moving_along_path: false,
            needs_attention: false,
        }
    }

    /// Create a freshly produced unit: it cannot move until its owner's next turn.
    pub fn produced(id: UnitId, unit_type: UnitType, position: GridCoord, owner: PlayerId) -> Self {
        let mut unit = Self::new(id, unit_type, position, owner);
        unit.moves_remaining = 0;
        unit
    }

    /// Reset for new turn.
    pub fn start_new_turn(&mut self) {
        self.moves_remaining = self.max_moves;
        self.has_attacked = false;
    }

    /// Use movement points.
    pub fn use_moves(&mut self, cost: u32) {
        self.moves_remaining = self.moves_remaining.saturating_sub(cost);
    }

    /// Check if unit can still move this turn.
    pub fn can_move(&self) -> bool {
        self.moves_remaining > 0
    }

    /// Check if unit can still attack this turn.
    pub fn can_attack(&self) -> bool {
        !self.has_attacked
    }

    /// Attack range in tiles.
    pub fn attack_range(&self) -> u32 {
        self.unit_type.attack_range()
    }

    /// Replace the movement order. The path must not include the unit's own tile.
    pub fn set_movement_path(&mut self, path: Vec<GridCoord>) {
        self.moving_along_path = !path.is_empty();
        self.movement_path = path;
        self.needs_attention = false;
    }

    /// Drop any movement order.
    pub fn clear_movement_path(&mut self) {
        self.movement_path.clear();
        self.moving_along_path = false;
    }

    /// Is a movement order in progress?
    pub fn is_following_path(&self) -> bool {
        self.moving_along_path && !self.movement_path.is_empty()
    }
}

/// Which kind of terrain a unit class travels over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitDomain {
    Land,
    Sea,
    Air,
}

/// Types of units available.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitType {
    Army,
    Tank,
    Fighter,
    Destroyer,
    Submarine,
    Cruiser,
    Battleship,
    Carrier,
}

impl UnitType {
    /// Get the stats for this unit type.
    pub const fn stats(&self) -> UnitStats {
        match self {
            UnitType::Army => UnitStats::land(1, 10, 10, 6),
            UnitType::Tank => UnitStats::land(2, 20, 20, 12),
            UnitType::Fighter => UnitStats::air(8, 12, 8, 8),
            UnitType::Destroyer => UnitStats::sea(4, 15, 12, 12),
            UnitType::Submarine => UnitStats::sea(3, 14, 8, 10),
            UnitType::Cruiser => UnitStats::sea(4, 18, 16, 16),
            UnitType::Battleship => UnitStats::sea(2, 25, 20, 20),
            UnitType::Carrier => UnitStats::sea(2, 8, 14, 24),
        }
    }

    /// Turns of production needed.
    pub const fn cost(&self) -> u32 {
        self.stats().cost
    }

    pub const fn domain(&self) -> UnitDomain {
        self.stats().domain
    }

    /// Sea units need a coastal city to be built.
    pub const fn is_naval(&self) -> bool {
        matches!(self.domain(), UnitDomain::Sea)
    }

    /// Ground units trigger the captured-city production choice.
    pub const fn is_ground(&self) -> bool {
        matches!(self.domain(), UnitDomain::Land)
    }

    /// Fighters strike two tiles away; everything else is melee.
    pub const fn attack_range(&self) -> u32 {
        match self {
            UnitType::Fighter => 2,
            _ => 1,
        }
    }

    /// Get all unit types, in production-menu order.
    pub const fn all() -> &'static [UnitType] {
        &[
            UnitType::Army,
            UnitType::Tank,
            UnitType::Fighter,
            UnitType::Destroyer,
            UnitType::Submarine,
            UnitType::Cruiser,
            UnitType::Battleship,
            UnitType::Carrier,
        ]
    }

    /// Lowercase identifier, as used in saved games.
    pub const fn name(&self) -> &'static str {
        match self {
            UnitType::Army => "army",
            UnitType::Tank => "tank",
            UnitType::Fighter => "fighter",
            UnitType::Destroyer => "destroyer",
            UnitType::Submarine => "submarine",
            UnitType::Cruiser => "cruiser",
            UnitType::Battleship => "battleship",
            UnitType::Carrier => "carrier",
        }
    }

    /// Parse a lowercase identifier.
    pub fn from_name(name: &str) -> Option<UnitType> {
        UnitType::all().iter().copied().find(|t| t.name() == name)
    }
}

impl std::fmt::Display for UnitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Stats for a unit type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStats {
    /// Movement points per turn.
    pub moves: u32,
    /// Attack strength (upper bound of the attack roll).
    pub attack: u32,
    /// Defense strength (upper bound of the defense roll).
    pub defense: u32,
    /// Production time in turns.
    pub cost: u32,
    pub domain: UnitDomain,
}

impl UnitStats {
    const fn land(moves: u32, attack: u32, defense: u32, cost: u32) -> Self {
        Self {
            moves,
            attack,
            defense,
            cost,
            domain: UnitDomain::Land,
        }
    }

    const fn sea(moves: u32, attack: u32, defense: u32, cost: u32) -> Self {
        Self {
            moves,
            attack,
            defense,
            cost,
            domain: UnitDomain::Sea,
        }
    }

    const fn air(moves: u32, attack: u32, defense: u32, cost: u32) -> Self {
        Self {
            moves,
            attack,
            defense,
            cost,
            domain: UnitDomain::Air,
        }
    }
}
