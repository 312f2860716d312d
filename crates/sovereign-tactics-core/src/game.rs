//! Turn controller and command API.
//!
//! [`Game`] owns the world, the per-player visibility grids, the event queue
//! and the random source. It sequences player turns, applies [`Command`]s
//! after validating them, runs AI players, and decides when the game ends.
//!
//! # Example
//!
//! ```
//! use sovereign_tactics_core::{Game, GameConfig, GameSettings, PlayerConfig, SeededRandom};
//! use sovereign_tactics_core::player::AiStrategy;
//!
//! let settings = GameSettings::new(20, 16).with_seed(7);
//! let config = GameConfig::new(
//!     settings,
//!     vec![PlayerConfig::human("Ada"), PlayerConfig::ai("Bot", AiStrategy::Balanced)],
//! );
//! let game = Game::initialize(config, SeededRandom::from_seed(7)).unwrap();
//! assert_eq!(game.turn_number(), 1);
//! ```

use crate::ai;
use crate::city::ProductionRequest;
use crate::combat::{resolve_city_capture, resolve_unit_combat, UnitCombatOutcome};
use crate::commands::Command;
use crate::coord::GridCoord;
use crate::error::GameError;
use crate::events::{DestroyReason, EventQueue, GameEvent};
use crate::mapgen::{MapGenConfig, MapGenerator};
use crate::pathfinding::{can_enter, find_path, follow_path, PathStatus};
use crate::player::Player;
use crate::random::{RandomSource, SeededRandom};
use crate::settings::{GameConfig, GameSettings, SettingsError};
use crate::types::{CityId, PlayerId, UnitId};
use crate::unit::{Unit, UnitType};
use crate::visibility::VisibilityTracker;
use crate::world::WorldState;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use tracing::{debug, error, info, warn};

/// Where the turn cycle currently stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    /// Built but not started.
    Setup,
    /// A human player is acting; the game waits for `end_turn`.
    AwaitingPlayerActions { player_index: usize },
    /// The current turn ends without input (AI, eliminated, or nothing to do).
    AutoAdvancing { player_index: usize },
    /// Terminal.
    Ended { winner: Option<PlayerId> },
}

/// Result of trying to take a city.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureAttempt {
    pub city: CityId,
    pub success: bool,
    pub awaiting_production_choice: bool,
}

/// Result of a successful `move_unit` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    pub from: GridCoord,
    pub to: GridCoord,
    pub moves_used: u32,
    /// Set when the destination was a city the mover did not own.
    pub capture: Option<CaptureAttempt>,
}

/// Result of a successful `attack_unit` call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttackOutcome {
    pub combat: UnitCombatOutcome,
    /// The winner stepped onto the defender's tile.
    pub attacker_advanced: bool,
    pub capture: Option<CaptureAttempt>,
}

/// A running game session.
#[derive(Clone, Debug)]
pub struct Game<R = SeededRandom> {
    pub(crate) world: WorldState,
    pub(crate) settings: GameSettings,
    pub(crate) visibility: VisibilityTracker,
    pub(crate) phase: TurnPhase,
    pub(crate) current_player_index: usize,
    pub(crate) turn_number: u32,
    pub(crate) events: EventQueue,
    pub(crate) rng: R,
}

impl<R: RandomSource> Game<R> {
    /// Build a new game from configuration and start it.
    ///
    /// The map comes from `settings.seed`; `rng` drives combat and AI.
    /// Each player is given the neutral city closest to its starting corner
    /// plus one army.
    pub fn initialize(config: GameConfig, rng: R) -> Result<Self, GameError> {
        config.validate()?;
        let seats = config.effective_players();
        let settings = config.settings.clone();

        let generated = MapGenerator::new(
            settings.seed,
            MapGenConfig::from_settings(&settings, seats.len()),
        )
        .generate();

        let players = seats
            .iter()
            .enumerate()
            .map(|(index, seat)| {
                let id = index as PlayerId;
                if seat.is_human {
                    Player::human(id, seat.name.clone())
                } else {
                    Player::ai(
                        id,
                        seat.name.clone(),
                        seat.ai_strategy.unwrap_or_default(),
                        seat.ai_difficulty.unwrap_or_default(),
                    )
                }
            })
            .collect();

        let mut world = WorldState::new(generated.map, players);
        for site in generated.cities {
            world.add_city(site.position, None, site.name);
        }
        assign_starting_positions(&mut world)?;

        let mut game = Self::with_world(world, settings, rng);
        game.start()?;
        Ok(game)
    }

    /// Wrap a prepared world without starting it. Call [`Game::start`] next.
    pub fn with_world(world: WorldState, settings: GameSettings, rng: R) -> Self {
        let visibility =
            VisibilityTracker::new(world.players.len(), world.map.width, world.map.height);
        Self {
            world,
            settings,
            visibility,
            phase: TurnPhase::Setup,
            current_player_index: 0,
            turn_number: 1,
            events: EventQueue::new(),
            rng,
        }
    }

    /// Begin turn 1 for player 0 and run any automatic turns that follow.
    pub fn start(&mut self) -> Result<(), GameError> {
        if self.phase != TurnPhase::Setup {
            return Err(GameError::AlreadyStarted);
        }
        if self.world.players.is_empty() {
            return Err(GameError::InvalidPlayerIndex(0));
        }

        info!(
            players = self.world.players.len(),
            width = self.world.map.width,
            height = self.world.map.height,
            "game started"
        );
        self.events.push(GameEvent::GameStarted {
            players: self.world.players.len(),
            width: self.world.map.width,
            height: self.world.map.height,
        });

        for index in 0..self.world.players.len() {
            self.refresh_visibility(index as PlayerId);
        }

        self.current_player_index = 0;
        self.turn_number = 1;
        self.begin_player_turn();
        self.run_automatic_turns();
        Ok(())
    }

    // ---- Accessors ----

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    /// Direct world access for scenario setup and tooling. Bypasses all rules.
    pub fn world_mut(&mut self) -> &mut WorldState {
        &mut self.world
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn visibility(&self) -> &VisibilityTracker {
        &self.visibility
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    pub fn current_player_index(&self) -> usize {
        self.current_player_index
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.world.players.get(self.current_player_index)
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, TurnPhase::Ended { .. })
    }

    /// The winner, once the game has ended with one.
    pub fn winner(&self) -> Option<PlayerId> {
        match self.phase {
            TurnPhase::Ended { winner } => winner,
            _ => None,
        }
    }

    /// Take all events queued since the last drain.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain()
    }

    pub fn pending_events(&self) -> &EventQueue {
        &self.events
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    // ---- Turn flow ----

    /// End the current player's turn and advance through automatic turns.
    pub fn end_turn(&mut self) -> Result<(), GameError> {
        match self.phase {
            TurnPhase::AwaitingPlayerActions { .. } | TurnPhase::AutoAdvancing { .. } => {
                self.finish_current_turn();
                self.run_automatic_turns();
                Ok(())
            }
            TurnPhase::Setup | TurnPhase::Ended { .. } => Err(GameError::GameNotInProgress),
        }
    }

    /// Resume automatic turns, e.g. after hitting `max_automatic_turns`.
    pub fn advance(&mut self) -> Result<(), GameError> {
        match self.phase {
            TurnPhase::Setup | TurnPhase::Ended { .. } => Err(GameError::GameNotInProgress),
            _ => {
                self.run_automatic_turns();
                Ok(())
            }
        }
    }

    fn begin_player_turn(&mut self) {
        let index = self.current_player_index;
        let Some(player) = self.world.players.get(index) else {
            error!(
                index,
                players = self.world.players.len(),
                "current player index out of range"
            );
            self.finish_game(None);
            return;
        };
        let player_id = player.id;
        let is_human = player.is_human;

        if !player.is_active() {
            self.phase = TurnPhase::AutoAdvancing {
                player_index: index,
            };
            return;
        }

        if let Some(player) = self.world.players.get_mut(index) {
            player.begin_turn();
        }
        for unit in self
            .world
            .units
            .values_mut()
            .filter(|u| u.owner == player_id)
        {
            unit.start_new_turn();
        }

        self.advance_production(player_id);
        // AI seats choose their own builds; leftovers are defaulted after the AI turn.
        if is_human {
            self.default_idle_cities(player_id);
        }
        self.continue_paths(player_id);
        self.refresh_visibility(player_id);

        let has_actions = self.has_legal_actions(player_id);
        info!(
            player = player_id,
            turn = self.turn_number,
            has_actions,
            "turn started"
        );
        self.events.push(GameEvent::TurnStarted {
            player: player_id,
            turn_number: self.turn_number,
            has_actions,
        });

        self.phase = if is_human && has_actions {
            TurnPhase::AwaitingPlayerActions {
                player_index: index,
            }
        } else {
            TurnPhase::AutoAdvancing {
                player_index: index,
            }
        };
    }

    fn advance_production(&mut self, player: PlayerId) {
        for city_id in self.world.city_ids_owned_by(player) {
            let Some(city) = self.world.city(city_id) else {
                continue;
            };
            let position = city.position;

            if let Some(unit_type) = city.current_production {
                if city.completes_next_turn() {
                    match self.world.spawn_site(&position, unit_type) {
                        Some(site) => {
                            if let Some(city) = self.world.city_mut(city_id) {
                                city.advance();
                            }
                            self.place_produced_unit(player, city_id, unit_type, site);
                        }
                        None => {
                            warn!(
                                city = city_id,
                                %unit_type,
                                "no room around city; production stalled"
                            );
                        }
                    }
                } else if let Some(city) = self.world.city_mut(city_id) {
                    city.advance();
                }
            }
        }
    }

    /// Start an army in every owned city that has nothing to build.
    fn default_idle_cities(&mut self, player: PlayerId) {
        for city_id in self.world.city_ids_owned_by(player) {
            if let Some(city) = self.world.city_mut(city_id) {
                if city.is_idle() {
                    city.start_production(UnitType::Army);
                    debug!(city = city_id, "idle city defaulted to army");
                }
            }
        }
    }

    fn place_produced_unit(
        &mut self,
        player: PlayerId,
        city: CityId,
        unit_type: UnitType,
        position: GridCoord,
    ) {
        let id = self.world.allocate_unit_id();
        self.world
            .add_unit(Unit::produced(id, unit_type, position, player));
        if let Some(owner) = self.world.player_mut(player) {
            owner.stats.units_created += 1;
            owner.turn_stats.units_created_this_turn += 1;
        }
        info!(player, city, unit = id, %unit_type, %position, "unit produced");
        self.events.push(GameEvent::UnitProduced {
            unit: id,
            unit_type,
            city,
            position,
        });
    }

    fn continue_paths(&mut self, player: PlayerId) {
        for unit_id in self.world.unit_ids_owned_by(player) {
            let Some(progress) = follow_path(&mut self.world, unit_id) else {
                continue;
            };
            if progress.steps > 0 {
                self.events.push(GameEvent::UnitMoved {
                    unit: unit_id,
                    from: progress.from,
                    to: progress.to,
                });
            }
            if progress.status == PathStatus::Blocked {
                debug!(unit = unit_id, at = %progress.to, "path blocked");
            }
        }
    }

    fn refresh_visibility(&mut self, player: PlayerId) {
        self.visibility
            .recompute(player, &self.world, self.settings.persistent_exploration);
    }

    /// Whether `player` has anything meaningful to do right now.
    ///
    /// True when a unit is flagged for attention, when a unit that is not on
    /// a path can step somewhere or reach an enemy unit or a city it does not
    /// own, or when an idle city has something to build.
    pub fn has_legal_actions(&self, player: PlayerId) -> bool {
        let units = self.world.units_owned_by(player);
        if units.iter().any(|u| u.needs_attention && u.can_move()) {
            return true;
        }

        for unit in units
            .iter()
            .filter(|u| u.can_move() && !u.is_following_path())
        {
            for tile in self.world.map.neighbors(&unit.position) {
                if can_enter(unit.unit_type, self.world.terrain_at(&tile))
                    && !self.world.is_occupied(&tile)
                {
                    return true;
                }
                if unit.can_attack()
                    && self
                        .world
                        .unit_at(&tile)
                        .map_or(false, |other| other.owner != player)
                {
                    return true;
                }
                if self
                    .world
                    .city_at(&tile)
                    .map_or(false, |city| !city.is_owned_by(player))
                {
                    return true;
                }
            }
        }

        self.world
            .cities_owned_by(player)
            .iter()
            .any(|city| city.is_idle() && !self.world.available_units(city).is_empty())
    }

    fn finish_current_turn(&mut self) {
        let index = self.current_player_index;
        if let Some(player) = self.world.players.get(index) {
            if player.is_active() {
                debug!(player = player.id, "turn ended");
                self.events.push(GameEvent::TurnEnded { player: player.id });
            }
        }

        let count = self.world.players.len().max(1);
        self.current_player_index = (index + 1) % count;
        if self.current_player_index == 0 {
            self.turn_number += 1;
        }

        self.check_game_end();
        if !self.is_over() {
            self.begin_player_turn();
        }
    }

    fn run_automatic_turns(&mut self) {
        let mut processed = 0u32;
        while let TurnPhase::AutoAdvancing { player_index } = self.phase {
            if processed >= self.settings.max_automatic_turns {
                debug!(processed, "automatic turn limit reached; pausing");
                break;
            }
            processed += 1;

            let seat = self
                .world
                .players
                .get(player_index)
                .map(|p| (p.id, p.is_active(), p.is_human));
            if let Some((id, true, false)) = seat {
                if self.has_legal_actions(id) {
                    let commands = ai::run_turn(self, id);
                    debug!(player = id, commands = commands.len(), "AI turn played");
                }
                self.default_idle_cities(id);
            }

            if matches!(self.phase, TurnPhase::AutoAdvancing { .. }) {
                self.finish_current_turn();
            }
        }
    }

    fn check_game_end(&mut self) {
        if self.is_over() {
            return;
        }

        let alive = self.world.alive_players();
        if alive.len() <= 1 {
            self.finish_game(alive.first().copied());
            return;
        }

        for player in alive {
            if self.world.has_presence(player) {
                continue;
            }
            if let Some(p) = self.world.player_mut(player) {
                p.eliminate();
            }
            info!(player, "player eliminated");
            self.events.push(GameEvent::PlayerEliminated { player });
        }

        let alive = self.world.alive_players();
        if alive.len() <= 1 {
            self.finish_game(alive.first().copied());
            return;
        }

        if self.settings.max_turns > 0 && self.turn_number > self.settings.max_turns {
            let leader = self.score_leader();
            info!(max_turns = self.settings.max_turns, "turn limit reached");
            self.finish_game(leader);
        }
    }

    /// Most cities, then most units, then lowest player ID.
    fn score_leader(&self) -> Option<PlayerId> {
        self.world.alive_players().into_iter().max_by_key(|&player| {
            (
                self.world.cities_owned_by(player).len(),
                self.world.units_owned_by(player).len(),
                Reverse(player),
            )
        })
    }

    fn finish_game(&mut self, winner: Option<PlayerId>) {
        info!(?winner, turn = self.turn_number, "game ended");
        self.phase = TurnPhase::Ended { winner };
        self.events.push(GameEvent::GameEnded { winner });
    }

    // ---- Commands ----

    /// The player whose actions are currently accepted.
    pub fn active_player(&self) -> Result<PlayerId, GameError> {
        match self.phase {
            TurnPhase::AwaitingPlayerActions { player_index }
            | TurnPhase::AutoAdvancing { player_index } => self
                .world
                .players
                .get(player_index)
                .map(|p| p.id)
                .ok_or(GameError::InvalidPlayerIndex(player_index)),
            TurnPhase::Setup | TurnPhase::Ended { .. } => Err(GameError::GameNotInProgress),
        }
    }

    fn owned_unit(&self, unit_id: UnitId) -> Result<&Unit, GameError> {
        let player = self.active_player()?;
        let unit = self
            .world
            .unit(unit_id)
            .ok_or(GameError::UnknownUnit(unit_id))?;
        if unit.owner != player {
            return Err(GameError::NotYourUnit {
                unit: unit_id,
                player,
            });
        }
        Ok(unit)
    }

    fn owned_city_check(&self, city_id: CityId) -> Result<(), GameError> {
        let player = self.active_player()?;
        let city = self
            .world
            .city(city_id)
            .ok_or(GameError::UnknownCity(city_id))?;
        if !city.is_owned_by(player) {
            return Err(GameError::NotYourCity {
                city: city_id,
                player,
            });
        }
        Ok(())
    }

    fn check_buildable(&self, city_id: CityId, unit_type: UnitType) -> Result<(), GameError> {
        self.owned_city_check(city_id)?;
        let city = self
            .world
            .city(city_id)
            .ok_or(GameError::UnknownCity(city_id))?;
        if !self.world.available_units(city).contains(&unit_type) {
            return Err(GameError::InvalidProductionType {
                city: city_id,
                unit_type,
            });
        }
        Ok(())
    }

    /// Validate a direct move; returns its cost in move points.
    fn check_move(&self, unit_id: UnitId, to: GridCoord) -> Result<u32, GameError> {
        let unit = self.owned_unit(unit_id)?;
        let invalid = |reason: &'static str| GameError::InvalidMove {
            unit: unit_id,
            to,
            reason,
        };

        if !unit.can_move() {
            return Err(invalid("no moves remaining"));
        }
        if !self.world.in_bounds(&to) {
            return Err(invalid("destination is off the map"));
        }
        let distance = unit.position.distance(&to);
        if distance == 0 {
            return Err(invalid("unit is already there"));
        }
        if distance > unit.moves_remaining {
            return Err(invalid("destination out of range"));
        }
        if !can_enter(unit.unit_type, self.world.terrain_at(&to)) {
            return Err(invalid("terrain not enterable"));
        }
        if self.world.is_occupied(&to) {
            return Err(invalid("destination occupied"));
        }
        Ok(distance)
    }

    /// Whether [`Game::move_unit`] would accept this move.
    pub fn can_move_to(&self, unit_id: UnitId, to: GridCoord) -> bool {
        self.check_move(unit_id, to).is_ok()
    }

    /// Move a unit directly, paying Manhattan distance in move points.
    ///
    /// Moving onto a city the player does not own is a capture attempt.
    pub fn move_unit(&mut self, unit_id: UnitId, to: GridCoord) -> Result<MoveOutcome, GameError> {
        let cost = self.check_move(unit_id, to)?;
        let (from, owner) = {
            let unit = self.owned_unit(unit_id)?;
            (unit.position, unit.owner)
        };

        let foreign_city = self
            .world
            .city_at(&to)
            .filter(|city| !city.is_owned_by(owner))
            .map(|city| city.id);
        if let Some(city_id) = foreign_city {
            let capture = self.attempt_capture(unit_id, city_id)?;
            return Ok(MoveOutcome {
                from,
                to,
                moves_used: cost,
                capture: Some(capture),
            });
        }

        let unit = self
            .world
            .unit_mut(unit_id)
            .ok_or(GameError::UnknownUnit(unit_id))?;
        unit.position = to;
        unit.use_moves(cost);
        unit.clear_movement_path();
        unit.needs_attention = false;

        debug!(unit = unit_id, %from, %to, cost, "unit moved");
        self.events.push(GameEvent::UnitMoved {
            unit: unit_id,
            from,
            to,
        });
        self.refresh_visibility(owner);

        Ok(MoveOutcome {
            from,
            to,
            moves_used: cost,
            capture: None,
        })
    }

    fn attempt_capture(
        &mut self,
        unit_id: UnitId,
        city_id: CityId,
    ) -> Result<CaptureAttempt, GameError> {
        let (unit_type, owner, from) = {
            let unit = self
                .world
                .unit(unit_id)
                .ok_or(GameError::UnknownUnit(unit_id))?;
            (unit.unit_type, unit.owner, unit.position)
        };
        let is_human = self.world.player(owner).map_or(false, |p| p.is_human);

        let city = self
            .world
            .cities
            .get_mut(&city_id)
            .ok_or(GameError::UnknownCity(city_id))?;
        let to = city.position;
        let outcome = resolve_city_capture(unit_type, city, &mut self.rng);

        if !outcome.success {
            self.world.remove_unit(unit_id);
            if let Some(p) = self.world.player_mut(owner) {
                p.stats.units_lost += 1;
            }
            info!(
                player = owner,
                city = city_id,
                remaining_defense = outcome.remaining_defense,
                "city capture failed"
            );
            self.events.push(GameEvent::CityCaptured {
                city: city_id,
                unit: unit_id,
                player: owner,
                success: false,
                awaiting_production_choice: false,
            });
            self.events.push(GameEvent::UnitDestroyed {
                unit: unit_id,
                owner,
                reason: DestroyReason::FailedCapture,
            });
            return Ok(CaptureAttempt {
                city: city_id,
                success: false,
                awaiting_production_choice: false,
            });
        }

        let previous_owner = city.owner;
        city.capture(owner);
        let awaiting = is_human && unit_type.is_ground();
        if !awaiting {
            city.start_production(UnitType::Army);
        }
        let name = city.name.clone();

        if let Some(previous) = previous_owner.and_then(|p| self.world.player_mut(p)) {
            if previous.capital == Some(city_id) {
                previous.capital = None;
            }
        }
        if let Some(unit) = self.world.unit_mut(unit_id) {
            unit.position = to;
            unit.moves_remaining = 0;
            unit.clear_movement_path();
            unit.needs_attention = false;
        }
        if let Some(p) = self.world.player_mut(owner) {
            p.stats.cities_captured += 1;
        }

        info!(
            player = owner,
            city = %name,
            previous_owner = ?previous_owner,
            "city captured"
        );
        if from != to {
            self.events.push(GameEvent::UnitMoved {
                unit: unit_id,
                from,
                to,
            });
        }
        self.events.push(GameEvent::CityCaptured {
            city: city_id,
            unit: unit_id,
            player: owner,
            success: true,
            awaiting_production_choice: awaiting,
        });
        self.refresh_visibility(owner);

        Ok(CaptureAttempt {
            city: city_id,
            success: true,
            awaiting_production_choice: awaiting,
        })
    }

    /// Attack an enemy unit within range. Each unit attacks at most once per
    /// turn. The loser is removed; a winner that can stand on the defender's
    /// tile moves there, capturing any city it finds.
    pub fn attack_unit(
        &mut self,
        attacker_id: UnitId,
        target_id: UnitId,
    ) -> Result<AttackOutcome, GameError> {
        let attacker = self.owned_unit(attacker_id)?;
        let target = self
            .world
            .unit(target_id)
            .ok_or(GameError::UnknownUnit(target_id))?;
        let invalid = |reason: &'static str| GameError::InvalidAttack {
            attacker: attacker_id,
            target: target_id,
            reason,
        };

        if target.owner == attacker.owner {
            return Err(invalid("cannot attack own unit"));
        }
        if attacker.has_attacked {
            return Err(invalid("already attacked this turn"));
        }
        let distance = attacker.position.distance(&target.position);
        if distance == 0 || distance > attacker.attack_range() {
            return Err(invalid("target out of range"));
        }

        let (attacker_type, attacker_owner) = (attacker.unit_type, attacker.owner);
        let (target_type, target_owner, target_position) =
            (target.unit_type, target.owner, target.position);

        let combat = resolve_unit_combat(attacker_type, target_type, &mut self.rng);
        self.events.push(GameEvent::CombatResolved {
            attacker: attacker_id,
            defender: target_id,
            attacker_wins: combat.attacker_wins,
        });

        if !combat.attacker_wins {
            self.world.remove_unit(attacker_id);
            self.record_battle(target_owner, attacker_owner);
            info!(winner = target_id, loser = attacker_id, "attack repelled");
            self.events.push(GameEvent::UnitDestroyed {
                unit: attacker_id,
                owner: attacker_owner,
                reason: DestroyReason::Combat,
            });
            return Ok(AttackOutcome {
                combat,
                attacker_advanced: false,
                capture: None,
            });
        }

        self.world.remove_unit(target_id);
        self.record_battle(attacker_owner, target_owner);
        info!(winner = attacker_id, loser = target_id, "defender destroyed");
        self.events.push(GameEvent::UnitDestroyed {
            unit: target_id,
            owner: target_owner,
            reason: DestroyReason::Combat,
        });

        let from = {
            let unit = self
                .world
                .unit_mut(attacker_id)
                .ok_or(GameError::UnknownUnit(attacker_id))?;
            unit.has_attacked = true;
            unit.position
        };

        if !can_enter(attacker_type, self.world.terrain_at(&target_position)) {
            return Ok(AttackOutcome {
                combat,
                attacker_advanced: false,
                capture: None,
            });
        }

        let contested_city = self
            .world
            .city_at(&target_position)
            .filter(|city| !city.is_owned_by(attacker_owner))
            .map(|city| city.id);
        let capture = match contested_city {
            Some(city_id) => Some(self.attempt_capture(attacker_id, city_id)?),
            None => {
                if let Some(unit) = self.world.unit_mut(attacker_id) {
                    unit.position = target_position;
                    unit.clear_movement_path();
                }
                self.events.push(GameEvent::UnitMoved {
                    unit: attacker_id,
                    from,
                    to: target_position,
                });
                self.refresh_visibility(attacker_owner);
                None
            }
        };

        let attacker_advanced = capture.map_or(true, |c| c.success);
        Ok(AttackOutcome {
            combat,
            attacker_advanced,
            capture,
        })
    }

    fn record_battle(&mut self, winner: PlayerId, loser: PlayerId) {
        if let Some(p) = self.world.player_mut(winner) {
            p.stats.enemies_destroyed += 1;
            p.stats.battles_won += 1;
        }
        if let Some(p) = self.world.player_mut(loser) {
            p.stats.units_lost += 1;
            p.stats.battles_lost += 1;
        }
    }

    /// Plan a multi-turn route. The unit does not move now; it walks the
    /// stored path at the start of each of its owner's turns.
    /// Returns the number of steps planned.
    pub fn set_movement_path(&mut self, unit_id: UnitId, to: GridCoord) -> Result<usize, GameError> {
        let (unit_type, from) = {
            let unit = self.owned_unit(unit_id)?;
            (unit.unit_type, unit.position)
        };
        let path = find_path(unit_type, from, to, &self.world.map)
            .filter(|path| path.len() > 1)
            .ok_or(GameError::NoPathFound { from, to })?;

        let steps: Vec<GridCoord> = path.into_iter().skip(1).collect();
        let count = steps.len();
        let unit = self
            .world
            .unit_mut(unit_id)
            .ok_or(GameError::UnknownUnit(unit_id))?;
        unit.set_movement_path(steps);
        debug!(unit = unit_id, %from, %to, steps = count, "movement path set");
        Ok(count)
    }

    pub fn clear_movement_path(&mut self, unit_id: UnitId) -> Result<(), GameError> {
        self.owned_unit(unit_id)?;
        if let Some(unit) = self.world.unit_mut(unit_id) {
            unit.clear_movement_path();
        }
        Ok(())
    }

    /// Start building `unit_type`, or queue it behind the current build.
    pub fn start_production(
        &mut self,
        city_id: CityId,
        unit_type: UnitType,
    ) -> Result<ProductionRequest, GameError> {
        self.check_buildable(city_id, unit_type)?;
        let city = self
            .world
            .city_mut(city_id)
            .ok_or(GameError::UnknownCity(city_id))?;
        let request = city.start_production(unit_type);
        debug!(city = city_id, %unit_type, ?request, "production requested");
        Ok(request)
    }

    /// Pick the build for a freshly captured city, replacing whatever it
    /// was set to.
    pub fn set_captured_city_production(
        &mut self,
        city_id: CityId,
        unit_type: UnitType,
    ) -> Result<(), GameError> {
        self.check_buildable(city_id, unit_type)?;
        let city = self
            .world
            .city_mut(city_id)
            .ok_or(GameError::UnknownCity(city_id))?;
        city.production_queue.clear();
        city.cancel_production();
        city.start_production(unit_type);
        debug!(city = city_id, %unit_type, "captured city production chosen");
        Ok(())
    }

    /// Abandon the current build; the next queued type (if any) takes over.
    pub fn cancel_production(&mut self, city_id: CityId) -> Result<Option<UnitType>, GameError> {
        self.owned_city_check(city_id)?;
        let city = self
            .world
            .city_mut(city_id)
            .ok_or(GameError::UnknownCity(city_id))?;
        Ok(city.cancel_production())
    }

    /// Apply any command on behalf of the active player.
    pub fn apply_command(&mut self, command: &Command) -> Result<(), GameError> {
        match *command {
            Command::MoveUnit { unit_id, to } => self.move_unit(unit_id, to).map(|_| ()),
            Command::AttackUnit {
                attacker_id,
                target_id,
            } => self.attack_unit(attacker_id, target_id).map(|_| ()),
            Command::SetMovementPath { unit_id, to } => {
                self.set_movement_path(unit_id, to).map(|_| ())
            }
            Command::ClearMovementPath { unit_id } => self.clear_movement_path(unit_id),
            Command::StartProduction { city_id, unit_type } => {
                self.start_production(city_id, unit_type).map(|_| ())
            }
            Command::SetCapturedCityProduction { city_id, unit_type } => {
                self.set_captured_city_production(city_id, unit_type)
            }
            Command::CancelProduction { city_id } => self.cancel_production(city_id).map(|_| ()),
            Command::EndTurn => self.end_turn(),
        }
    }
}

/// Hand each player the neutral city nearest its anchor, mark it as the
/// capital, start an army there and place one starting army beside it.
fn assign_starting_positions(world: &mut WorldState) -> Result<(), GameError> {
    let width = world.map.width as i32;
    let height = world.map.height as i32;
    let anchors = [
        GridCoord::new(0, 0),
        GridCoord::new(width - 1, height - 1),
        GridCoord::new(width - 1, 0),
        GridCoord::new(0, height - 1),
        GridCoord::new(width / 2, 0),
        GridCoord::new(width / 2, height - 1),
        GridCoord::new(0, height / 2),
        GridCoord::new(width - 1, height / 2),
    ];

    for index in 0..world.players.len() {
        let player = index as PlayerId;
        let anchor = anchors[index % anchors.len()];
        let city_id = world
            .neutral_cities()
            .into_iter()
            .min_by_key(|city| city.position.distance(&anchor))
            .map(|city| city.id)
            .ok_or(GameError::InvalidConfig(SettingsError::MapTooSmall {
                width: world.map.width,
                height: world.map.height,
            }))?;

        let city = world
            .city_mut(city_id)
            .ok_or(GameError::UnknownCity(city_id))?;
        city.owner = Some(player);
        city.is_capital = true;
        city.start_production(UnitType::Army);
        let position = city.position;

        if let Some(p) = world.players.get_mut(index) {
            p.capital = Some(city_id);
        }

        let site = world
            .empty_adjacent_for(&position, UnitType::Army)
            .or_else(|| (!world.is_occupied(&position)).then_some(position));
        if let Some(site) = site {
            world.spawn_unit(UnitType::Army, site, player);
        }
        debug!(player, city = city_id, %position, "starting city assigned");
    }
    Ok(())
}
