//! Combat resolution for unit-vs-unit battles and city capture attempts.
//!
//! Each side rolls uniformly between zero and its strength; the attacker
//! wins only with a strictly higher roll, so ties favor the defender.

use crate::city::City;
use crate::random::RandomSource;
use crate::unit::UnitType;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Result of a unit-vs-unit engagement.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitCombatOutcome {
    pub attack_roll: f64,
    pub defense_roll: f64,
    pub attacker_wins: bool,
}

/// Result of a city capture attempt.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CityCaptureOutcome {
    pub attack_roll: f64,
    pub defense_roll: f64,
    pub success: bool,
    /// City defense after the attempt.
    pub remaining_defense: u32,
}

/// Roll attacker strength against defender strength.
pub fn roll_contest(attack: u32, defense: u32, rng: &mut impl RandomSource) -> (f64, f64, bool) {
    let attack_roll = rng.uniform(attack as f64);
    let defense_roll = rng.uniform(defense as f64);
    (attack_roll, defense_roll, attack_roll > defense_roll)
}

/// Resolve combat between two unit types.
pub fn resolve_unit_combat(
    attacker: UnitType,
    defender: UnitType,
    rng: &mut impl RandomSource,
) -> UnitCombatOutcome {
    let (attack_roll, defense_roll, attacker_wins) =
        roll_contest(attacker.stats().attack, defender.stats().defense, rng);
    debug!(
        %attacker,
        %defender,
        attack_roll,
        defense_roll,
        attacker_wins,
        "unit combat resolved"
    );
    UnitCombatOutcome {
        attack_roll,
        defense_roll,
        attacker_wins,
    }
}

/// Attempt to take a city. The city's defense wears down by one whatever
/// the outcome.
pub fn resolve_city_capture(
    attacker: UnitType,
    city: &mut City,
    rng: &mut impl RandomSource,
) -> CityCaptureOutcome {
    let (attack_roll, defense_roll, success) =
        roll_contest(attacker.stats().attack, city.current_defense, rng);
    city.degrade_defense();
    debug!(
        city = %city.name,
        %attacker,
        attack_roll,
        defense_roll,
        success,
        "city capture attempt"
    );
    CityCaptureOutcome {
        attack_roll,
        defense_roll,
        success,
        remaining_defense: city.current_defense,
    }
}

/// Naive odds for a preview: `attack / (attack + defense)`.
pub fn attacker_win_odds(attacker: UnitType, defender: UnitType) -> f64 {
    let attack = attacker.stats().attack as f64;
    let defense = defender.stats().defense as f64;
    if attack + defense == 0.0 {
        return 0.0;
    }
    attack / (attack + defense)
}
