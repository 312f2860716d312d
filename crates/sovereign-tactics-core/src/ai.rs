//! AI policy engine.
//!
//! An AI turn is a sequence of ordinary [`Command`]s applied through
//! [`Game::apply_command`], so AI players obey exactly the same rules as
//! humans. Strategy selects the handler; difficulty only changes how often a
//! unit sits the turn out.

use crate::commands::Command;
use crate::coord::GridCoord;
use crate::game::Game;
use crate::pathfinding::can_enter;
use crate::player::{AiBehavior, AiStrategy};
use crate::random::RandomSource;
use crate::types::{PlayerId, UnitId};
use crate::unit::{Unit, UnitType};
use crate::world::WorldState;
use std::cmp::Reverse;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Build order for aggressive players.
pub const MILITARY_PREFERENCE: [UnitType; 6] = [
    UnitType::Battleship,
    UnitType::Cruiser,
    UnitType::Destroyer,
    UnitType::Tank,
    UnitType::Fighter,
    UnitType::Army,
];

/// Build order for everyone else.
pub const BALANCED_PREFERENCE: [UnitType; 5] = [
    UnitType::Army,
    UnitType::Tank,
    UnitType::Destroyer,
    UnitType::Fighter,
    UnitType::Cruiser,
];

/// Share of a balanced player's units sent exploring each turn.
pub const EXPLORER_SHARE: f64 = 0.3;

/// How far from a city defensive players look for guards.
pub const DEFENSE_RADIUS: u32 = 3;

/// Guards assigned per city.
pub const DEFENDERS_PER_CITY: usize = 2;

/// Play one full turn for `player` and return the commands that succeeded.
///
/// Commands the game rejects are logged and skipped.
pub fn run_turn<R: RandomSource>(game: &mut Game<R>, player: PlayerId) -> Vec<Command> {
    let Some(seat) = game.world().player(player) else {
        return Vec::new();
    };
    if !seat.is_active() {
        return Vec::new();
    }
    let strategy = seat.ai_strategy;
    let behavior = seat.ai_behavior();
    let units = game.world().unit_ids_owned_by(player);

    let mut turn = AiTurn {
        game,
        player,
        behavior,
        applied: Vec::new(),
    };

    match strategy {
        AiStrategy::Aggressive => {
            turn.manage_production(&MILITARY_PREFERENCE);
            turn.move_and_attack(&units, strategy);
        }
        AiStrategy::Defensive => {
            turn.manage_production(&BALANCED_PREFERENCE);
            turn.guard_cities(&units);
        }
        AiStrategy::Economic => {
            turn.manage_production(&BALANCED_PREFERENCE);
            turn.expand(&units);
        }
        AiStrategy::Balanced => {
            turn.manage_production(&BALANCED_PREFERENCE);
            turn.move_and_attack(&units, strategy);
            let explorers = (units.len() as f64 * EXPLORER_SHARE).ceil() as usize;
            turn.explore(&units[..explorers.min(units.len())]);
        }
    }

    info!(
        player,
        ?strategy,
        commands = turn.applied.len(),
        "AI turn finished"
    );
    turn.applied
}

/// First entry of `preference` the city can build, else whatever it can.
pub fn choose_production(available: &[UnitType], preference: &[UnitType]) -> Option<UnitType> {
    preference
        .iter()
        .copied()
        .find(|unit_type| available.contains(unit_type))
        .or_else(|| available.first().copied())
}

/// Greedy single step: the free, enterable orthogonal neighbor that gets
/// closest to `target`. Ties go to the first neighbor in N, E, S, W order.
pub fn next_step_toward(world: &WorldState, unit: &Unit, target: GridCoord) -> Option<GridCoord> {
    let mut best: Option<(GridCoord, u32)> = None;
    for tile in unit.position.neighbors() {
        if !world.in_bounds(&tile)
            || !can_enter(unit.unit_type, world.terrain_at(&tile))
            || world.is_occupied(&tile)
        {
            continue;
        }
        let distance = tile.distance(&target);
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((tile, distance));
        }
    }
    best.map(|(tile, _)| tile)
}

/// First enemy unit within attack range, scanning rows top to bottom.
pub fn enemy_in_range(world: &WorldState, unit: &Unit) -> Option<UnitId> {
    let range = unit.attack_range() as i32;
    for dy in -range..=range {
        for dx in -range..=range {
            let tile = unit.position.offset(dx, dy);
            let distance = unit.position.distance(&tile);
            if distance == 0 || distance > unit.attack_range() || !world.in_bounds(&tile) {
                continue;
            }
            if let Some(other) = world.unit_at(&tile) {
                if other.owner != unit.owner {
                    return Some(other.id);
                }
            }
        }
    }
    None
}

/// Pick where a unit should head.
///
/// Balanced players favor neutral cities, then enemy cities, then enemy
/// units; aggressive players reverse that. Nearer targets win within a
/// priority, and discovery order settles remaining ties.
pub fn select_target(world: &WorldState, unit: &Unit, strategy: AiStrategy) -> Option<GridCoord> {
    let (neutral, enemy_city, enemy_unit) = match strategy {
        AiStrategy::Aggressive => (1u8, 2u8, 3u8),
        _ => (3, 2, 1),
    };

    let mut targets: Vec<(GridCoord, u8)> = Vec::new();
    targets.extend(world.neutral_cities().iter().map(|c| (c.position, neutral)));
    targets.extend(
        world
            .cities
            .values()
            .filter(|c| c.owner.map_or(false, |owner| owner != unit.owner))
            .map(|c| (c.position, enemy_city)),
    );
    targets.extend(
        world
            .units
            .values()
            .filter(|u| u.owner != unit.owner)
            .map(|u| (u.position, enemy_unit)),
    );

    targets
        .into_iter()
        .min_by_key(|(position, priority)| (Reverse(*priority), unit.position.distance(position)))
        .map(|(position, _)| position)
}

struct AiTurn<'a, R> {
    game: &'a mut Game<R>,
    player: PlayerId,
    behavior: AiBehavior,
    applied: Vec<Command>,
}

impl<'a, R: RandomSource> AiTurn<'a, R> {
    fn issue(&mut self, command: Command) -> bool {
        match self.game.apply_command(&command) {
            Ok(()) => {
                debug!(player = self.player, command = %command.description(), "AI command");
                self.applied.push(command);
                true
            }
            Err(err) => {
                debug!(player = self.player, %err, "AI command rejected");
                false
            }
        }
    }

    fn unit(&self, id: UnitId) -> Option<Unit> {
        self.game.world().unit(id).cloned()
    }

    /// Roll for a wasted unit turn.
    fn blunders(&mut self) -> bool {
        let mistake_chance = self.behavior.mistake_chance;
        self.game.rng_mut().chance(mistake_chance)
    }

    fn manage_production(&mut self, preference: &[UnitType]) {
        let orders: Vec<Command> = {
            let world = self.game.world();
            world
                .cities_owned_by(self.player)
                .into_iter()
                .filter(|city| city.is_idle())
                .filter_map(|city| {
                    choose_production(&world.available_units(city), preference).map(|unit_type| {
                        Command::StartProduction {
                            city_id: city.id,
                            unit_type,
                        }
                    })
                })
                .collect()
        };
        for order in orders {
            self.issue(order);
        }
    }

    fn move_and_attack(&mut self, units: &[UnitId], strategy: AiStrategy) {
        for &unit_id in units {
            let Some(unit) = self.unit(unit_id) else {
                continue;
            };
            if !unit.can_move() && !unit.can_attack() {
                continue;
            }
            if self.blunders() {
                debug!(unit = unit_id, "AI unit idles");
                continue;
            }

            if unit.can_attack() {
                if let Some(target_id) = enemy_in_range(self.game.world(), &unit) {
                    if self.issue(Command::AttackUnit {
                        attacker_id: unit_id,
                        target_id,
                    }) {
                        continue;
                    }
                    debug!(
                        unit = unit_id,
                        target = target_id,
                        "attack rejected; moving instead"
                    );
                }
            }

            if unit.can_move() {
                let step = select_target(self.game.world(), &unit, strategy)
                    .and_then(|target| next_step_toward(self.game.world(), &unit, target));
                if let Some(to) = step {
                    self.issue(Command::MoveUnit { unit_id, to });
                }
            }
        }
    }

    fn guard_cities(&mut self, units: &[UnitId]) {
        let cities: Vec<GridCoord> = self
            .game
            .world()
            .cities_owned_by(self.player)
            .iter()
            .map(|city| city.position)
            .collect();
        let mut assigned = BTreeSet::new();

        for city in cities {
            let guards: Vec<UnitId> = units
                .iter()
                .copied()
                .filter(|id| !assigned.contains(id))
                .filter(|id| {
                    self.unit(*id)
                        .map_or(false, |u| u.position.distance(&city) <= DEFENSE_RADIUS)
                })
                .take(DEFENDERS_PER_CITY)
                .collect();

            for unit_id in guards {
                assigned.insert(unit_id);
                let Some(unit) = self.unit(unit_id) else {
                    continue;
                };
                if !unit.can_move() || unit.position.is_adjacent(&city) {
                    continue;
                }
                if self.blunders() {
                    continue;
                }

                let world = self.game.world();
                let mut posts: Vec<GridCoord> = world
                    .map
                    .neighbors(&city)
                    .into_iter()
                    .filter(|tile| {
                        world.city_at(tile).is_none()
                            && can_enter(unit.unit_type, world.terrain_at(tile))
                            && !world.is_occupied(tile)
                    })
                    .collect();
                posts.sort_by_key(|post| unit.position.distance(post));

                let direct = posts
                    .iter()
                    .copied()
                    .find(|post| self.game.can_move_to(unit_id, *post));
                let to = direct.or_else(|| {
                    posts
                        .first()
                        .and_then(|post| next_step_toward(self.game.world(), &unit, *post))
                });
                if let Some(to) = to {
                    self.issue(Command::MoveUnit { unit_id, to });
                }
            }
        }
    }

    fn expand(&mut self, units: &[UnitId]) {
        for &unit_id in units {
            let Some(unit) = self.unit(unit_id) else {
                continue;
            };
            if !unit.can_move() || self.blunders() {
                continue;
            }
            let world = self.game.world();
            let step = world
                .neutral_cities()
                .into_iter()
                .min_by_key(|city| unit.position.distance(&city.position))
                .and_then(|city| next_step_toward(world, &unit, city.position));
            if let Some(to) = step {
                self.issue(Command::MoveUnit { unit_id, to });
            }
        }
    }

    fn explore(&mut self, units: &[UnitId]) {
        for &unit_id in units {
            let Some(unit) = self.unit(unit_id) else {
                continue;
            };
            if !unit.can_move() {
                continue;
            }
            let mut directions = unit.position.neighbors();
            self.game.rng_mut().shuffle(&mut directions[..]);
            let to = directions
                .into_iter()
                .find(|tile| self.game.can_move_to(unit_id, *tile));
            if let Some(to) = to {
                self.issue(Command::MoveUnit { unit_id, to });
            }
        }
    }
}
