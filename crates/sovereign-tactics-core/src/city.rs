//! Cities and their unit production.
//!
//! A city builds one unit at a time. Each unit type takes a fixed number of
//! turns; extra requests wait in a FIFO queue and start as soon as the
//! current one completes.

use crate::coord::GridCoord;
use crate::types::{CityId, PlayerId, DEFAULT_CITY_DEFENSE};
use crate::unit::UnitType;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A city on the game map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    /// Unique identifier.
    pub id: CityId,
    /// Location on the map.
    pub position: GridCoord,
    /// Owning player, `None` while neutral.
    pub owner: Option<PlayerId>,
    /// City name.
    pub name: String,
    /// Is this a player's starting city?
    pub is_capital: bool,
    /// Unit currently being built.
    pub current_production: Option<UnitType>,
    /// Turns until `current_production` completes. Zero when idle.
    pub turns_remaining: u32,
    /// Requests waiting behind the current production.
    pub production_queue: VecDeque<UnitType>,
    /// Defense the city is founded with.
    pub base_defense: u32,
    /// Defense used for capture rolls, worn down by each attempt.
    pub current_defense: u32,
}

/// How a production request was accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductionRequest {
    /// Became the current production.
    Started,
    /// Appended to the queue at this position.
    Queued(usize),
}

impl City {
    /// Create a new neutral or owned city with default defenses.
    pub fn new(id: CityId, position: GridCoord, owner: Option<PlayerId>, name: String) -> Self {
        Self {
            id,
            position,
            owner,
            name,
            is_capital: false,
            current_production: None,
            turns_remaining: 0,
            production_queue: VecDeque::new(),
            base_defense: DEFAULT_CITY_DEFENSE,
            current_defense: DEFAULT_CITY_DEFENSE,
        }
    }

    pub fn is_neutral(&self) -> bool {
        self.owner.is_none()
    }

    pub fn is_owned_by(&self, player: PlayerId) -> bool {
        self.owner == Some(player)
    }

    /// No production in progress.
    pub fn is_idle(&self) -> bool {
        self.current_production.is_none()
    }

    /// Begin building a unit, or queue it behind the current one.
    pub fn start_production(&mut self, unit_type: UnitType) -> ProductionRequest {
        if self.current_production.is_some() {
            self.production_queue.push_back(unit_type);
            return ProductionRequest::Queued(self.production_queue.len() - 1);
        }
        self.current_production = Some(unit_type);
        self.turns_remaining = unit_type.cost();
        ProductionRequest::Started
    }

    /// True when the next [`City::advance`] will complete a unit.
    pub fn completes_next_turn(&self) -> bool {
        self.current_production.is_some() && self.turns_remaining <= 1
    }

    /// Count down one turn of production.
    ///
    /// Returns the finished unit type when the countdown reaches zero; the
    /// next queued request (if any) starts immediately.
    pub fn advance(&mut self) -> Option<UnitType> {
        let current = self.current_production?;
        self.turns_remaining = self.turns_remaining.saturating_sub(1);
        if self.turns_remaining > 0 {
            return None;
        }
        self.current_production = None;
        self.start_next_queued();
        Some(current)
    }

    /// Abandon the current production. The next queued request takes over.
    pub fn cancel_production(&mut self) -> Option<UnitType> {
        let cancelled = self.current_production.take();
        self.turns_remaining = 0;
        self.start_next_queued();
        cancelled
    }

    /// Remove a waiting request by queue position.
    pub fn remove_from_queue(&mut self, index: usize) -> Option<UnitType> {
        self.production_queue.remove(index)
    }

    fn start_next_queued(&mut self) {
        match self.production_queue.pop_front() {
            Some(next) => {
                self.current_production = Some(next);
                self.turns_remaining = next.cost();
            }
            None => {
                self.current_production = None;
                self.turns_remaining = 0;
            }
        }
    }

    /// Change hands. Any production in progress or queued is lost.
    pub fn capture(&mut self, new_owner: PlayerId) {
        self.owner = Some(new_owner);
        self.is_capital = false;
        self.current_production = None;
        self.turns_remaining = 0;
        self.production_queue.clear();
    }

    /// Wear defenses down by one, never below 1.
    pub fn degrade_defense(&mut self) {
        self.current_defense = self.current_defense.saturating_sub(1).max(1);
    }

    /// Restore defenses, capped at the base value.
    pub fn repair_defenses(&mut self, amount: u32) {
        self.current_defense = (self.current_defense + amount).min(self.base_defense);
    }

    /// Unit types this city can build. Naval units need a coastal city.
    pub fn available_units(&self, coastal: bool) -> Vec<UnitType> {
        UnitType::all()
            .iter()
            .copied()
            .filter(|t| coastal || !t.is_naval())
            .collect()
    }

    /// Fraction of the current production completed, 0.0 when idle.
    pub fn production_progress(&self) -> f32 {
        match self.current_production {
            Some(unit_type) => {
                let cost = unit_type.cost();
                (cost - self.turns_remaining.min(cost)) as f32 / cost as f32
            }
            None => 0.0,
        }
    }
}

/// Stock city names, handed out in a random order by map generation.
pub const CITY_NAMES: &[&str] = &[
    "New Rome",
    "Alexandria",
    "Carthage",
    "Athens",
    "Sparta",
    "Troy",
    "Babylon",
    "Memphis",
    "Thebes",
    "Damascus",
    "Jerusalem",
    "Nineveh",
    "Persepolis",
    "Samarkand",
    "Baghdad",
    "Constantinople",
    "Venice",
    "Florence",
    "Vienna",
    "Prague",
    "Warsaw",
    "Moscow",
    "Kiev",
    "Stockholm",
    "Copenhagen",
    "Amsterdam",
    "Brussels",
    "Paris",
    "London",
    "Edinburgh",
    "Dublin",
    "Madrid",
    "Lisbon",
    "Barcelona",
];
