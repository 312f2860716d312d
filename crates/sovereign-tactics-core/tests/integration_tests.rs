//! Integration tests for complete Sovereign Tactics game flows.
//!
//! These tests verify end-to-end scenarios including:
//! - Game setup and initialization
//! - Turn flow and player rotation
//! - Movement, paths and production
//! - Combat and city capture
//! - Elimination and the turn limit

use sovereign_tactics_core::{
    city::ProductionRequest,
    events::{DestroyReason, GameEvent},
    game::{Game, TurnPhase},
    settings::{GameConfig, GameSettings, PlayerConfig, SettingsError},
    Command, GameError, GridCoord, Map, Player, ScriptedRandom, Terrain, UnitType, WorldState,
};

// =============================================================================
// Test Helpers
// =============================================================================

fn c(x: i32, y: i32) -> GridCoord {
    GridCoord::new(x, y)
}

/// Open 10x10 land map, two humans, one city and one army each.
///
/// City 1 at (0, 0) and army 1 at (2, 2) belong to player 0; city 2 at
/// (9, 9) and army 2 at (7, 7) belong to player 1.
fn standard_duel() -> WorldState {
    let mut world = WorldState::new(
        Map::filled(10, 10, Terrain::Land),
        vec![
            Player::human(0, "Ada".to_string()),
            Player::human(1, "Grace".to_string()),
        ],
    );
    world.add_city(c(0, 0), Some(0), "Alpha".to_string());
    world.add_city(c(9, 9), Some(1), "Omega".to_string());
    world.spawn_unit(UnitType::Army, c(2, 2), 0);
    world.spawn_unit(UnitType::Army, c(7, 7), 1);
    world
}

fn start_with(
    world: WorldState,
    settings: GameSettings,
    rng: ScriptedRandom,
) -> Game<ScriptedRandom> {
    let mut game = Game::with_world(world, settings, rng);
    game.start().unwrap();
    game
}

fn start(world: WorldState, rng: ScriptedRandom) -> Game<ScriptedRandom> {
    let settings = GameSettings::new(world.map.width, world.map.height);
    start_with(world, settings, rng)
}

/// Rolls that make the attacker win: 0.9 * attack against 0.1 * defense.
fn attacker_wins() -> ScriptedRandom {
    ScriptedRandom::new(vec![0.9, 0.1])
}

fn defender_wins() -> ScriptedRandom {
    ScriptedRandom::new(vec![0.1, 0.9])
}

// =============================================================================
// Setup
// =============================================================================

#[test]
fn test_initialize_assigns_capitals_and_armies() {
    let config = GameConfig::new(
        GameSettings::new(20, 20).with_seed(3),
        vec![PlayerConfig::human("Ada"), PlayerConfig::human("Grace")],
    );
    let mut game = Game::initialize(config, ScriptedRandom::constant(0.5)).unwrap();
    let world = game.world();

    for player in &world.players {
        let capital = player.capital.expect("capital assigned");
        let city = world.city(capital).unwrap();
        assert!(city.is_owned_by(player.id));
        assert!(city.is_capital);
        assert_eq!(world.cities_owned_by(player.id).len(), 1);

        let armies = world.units_owned_by(player.id);
        assert_eq!(armies.len(), 1);
        assert_eq!(armies[0].unit_type, UnitType::Army);
        assert!(armies[0].position.distance(&city.position) <= 1);
    }
    assert_eq!(world.neutral_cities().len(), 2);
    assert_eq!(
        game.phase(),
        TurnPhase::AwaitingPlayerActions { player_index: 0 }
    );

    let events = game.drain_events();
    assert_eq!(
        events[0],
        GameEvent::GameStarted {
            players: 2,
            width: 20,
            height: 20
        }
    );
}

#[test]
fn test_initialize_defaults_to_human_versus_ai() {
    let config = GameConfig::new(GameSettings::new(20, 20).with_seed(8), vec![]);
    let game = Game::initialize(config, ScriptedRandom::constant(0.5)).unwrap();
    let players = &game.world().players;
    assert_eq!(players.len(), 2);
    assert!(players[0].is_human);
    assert_eq!(players[0].name, "Player 1");
    assert!(!players[1].is_human);
    assert_eq!(players[1].name, "AI Player");
}

#[test]
fn test_initialize_rejects_too_many_players() {
    let players = (0..9).map(|i| PlayerConfig::human(&format!("P{i}"))).collect();
    let config = GameConfig::new(GameSettings::new(40, 40), players);
    let err = Game::initialize(config, ScriptedRandom::constant(0.5)).unwrap_err();
    assert_eq!(
        err,
        GameError::InvalidConfig(SettingsError::TooManyPlayers(9))
    );
}

// =============================================================================
// Turn Flow
// =============================================================================

#[test]
fn test_turn_rotation_wraps_and_counts_rounds() {
    let mut game = start(standard_duel(), ScriptedRandom::constant(0.5));
    assert_eq!(game.turn_number(), 1);
    game.drain_events();

    game.end_turn().unwrap();
    assert_eq!(
        game.phase(),
        TurnPhase::AwaitingPlayerActions { player_index: 1 }
    );
    assert_eq!(game.turn_number(), 1);
    let events = game.drain_events();
    assert!(events.contains(&GameEvent::TurnEnded { player: 0 }));
    assert!(events.contains(&GameEvent::TurnStarted {
        player: 1,
        turn_number: 1,
        has_actions: true
    }));

    game.end_turn().unwrap();
    assert_eq!(game.current_player_index(), 0);
    assert_eq!(game.turn_number(), 2);
}

#[test]
fn test_units_reset_at_owner_turn_start() {
    let mut game = start(standard_duel(), ScriptedRandom::constant(0.5));
    game.move_unit(1, c(2, 3)).unwrap();
    assert_eq!(game.world().unit(1).unwrap().moves_remaining, 0);

    game.end_turn().unwrap();
    // Not yet: it's player 1's turn.
    assert_eq!(game.world().unit(1).unwrap().moves_remaining, 0);
    game.end_turn().unwrap();
    assert_eq!(game.world().unit(1).unwrap().moves_remaining, 1);
}

#[test]
fn test_human_without_actions_is_skipped() {
    let mut world = standard_duel();
    world.remove_unit(2);
    let mut game = start(world, ScriptedRandom::constant(0.5));
    game.drain_events();

    game.end_turn().unwrap();
    assert_eq!(
        game.phase(),
        TurnPhase::AwaitingPlayerActions { player_index: 0 }
    );
    assert_eq!(game.turn_number(), 2);

    let events = game.drain_events();
    assert!(events.contains(&GameEvent::TurnStarted {
        player: 1,
        turn_number: 1,
        has_actions: false
    }));
    assert!(events.contains(&GameEvent::TurnEnded { player: 1 }));
}

#[test]
fn test_eliminated_player_turn_is_silent() {
    let mut world = WorldState::new(
        Map::filled(10, 10, Terrain::Land),
        vec![
            Player::human(0, "Ada".to_string()),
            Player::human(1, "Grace".to_string()),
            Player::human(2, "Linus".to_string()),
        ],
    );
    world.add_city(c(0, 0), Some(0), "Alpha".to_string());
    world.add_city(c(9, 9), Some(1), "Omega".to_string());
    world.spawn_unit(UnitType::Army, c(2, 2), 0);
    world.spawn_unit(UnitType::Army, c(7, 7), 1);
    let doomed = world.spawn_unit(UnitType::Army, c(2, 3), 2);
    let mut game = start(world, attacker_wins());

    game.attack_unit(1, doomed).unwrap();
    game.end_turn().unwrap();
    assert!(game.world().players[2].eliminated);
    assert!(!game.is_over());

    game.drain_events();
    game.end_turn().unwrap();
    let events = game.drain_events();
    assert!(!events.iter().any(|e| matches!(
        e,
        GameEvent::TurnStarted { player: 2, .. } | GameEvent::TurnEnded { player: 2 }
    )));
    assert_eq!(game.current_player_index(), 0);
    assert_eq!(game.turn_number(), 2);
}

// =============================================================================
// Movement
// =============================================================================

#[test]
fn test_move_costs_manhattan_distance() {
    let mut world = standard_duel();
    let tank = world.spawn_unit(UnitType::Tank, c(4, 4), 0);
    let mut game = start(world, ScriptedRandom::constant(0.5));

    let outcome = game.move_unit(tank, c(5, 5)).unwrap();
    assert_eq!(outcome.moves_used, 2);
    assert_eq!(outcome.from, c(4, 4));
    assert_eq!(game.world().unit(tank).unwrap().position, c(5, 5));
    assert_eq!(game.world().unit(tank).unwrap().moves_remaining, 0);

    let err = game.move_unit(tank, c(5, 6)).unwrap_err();
    assert!(matches!(
        err,
        GameError::InvalidMove {
            reason: "no moves remaining",
            ..
        }
    ));
}

#[test]
fn test_move_rejections_leave_state_untouched() {
    let mut world = standard_duel();
    world.map.set_terrain(&c(3, 2), Terrain::Mountains);
    world.map.set_terrain(&c(2, 1), Terrain::Ocean);
    world.spawn_unit(UnitType::Army, c(1, 2), 0);
    let mut game = start(world, ScriptedRandom::constant(0.5));
    let before = game.world().clone();

    assert!(game.move_unit(1, c(3, 2)).is_err());
    assert!(game.move_unit(1, c(2, 1)).is_err());
    assert!(game.move_unit(1, c(1, 2)).is_err());
    assert!(game.move_unit(1, c(2, 2)).is_err());
    assert!(game.move_unit(1, c(-1, 2)).is_err());
    assert_eq!(game.world(), &before);
}

#[test]
fn test_set_movement_path_walks_at_turn_start() {
    let mut world = standard_duel();
    // A second unit keeps player 0 in control while army 1 travels.
    world.spawn_unit(UnitType::Army, c(5, 0), 0);
    let mut game = start(world, ScriptedRandom::constant(0.5));

    assert_eq!(game.set_movement_path(1, c(2, 5)).unwrap(), 3);
    let unit = game.world().unit(1).unwrap();
    assert_eq!(unit.position, c(2, 2));
    assert!(unit.moving_along_path);

    let expected = [c(2, 3), c(2, 4), c(2, 5)];
    for step in expected {
        game.end_turn().unwrap();
        game.end_turn().unwrap();
        assert_eq!(game.world().unit(1).unwrap().position, step);
    }

    let unit = game.world().unit(1).unwrap();
    assert!(unit.movement_path.is_empty());
    assert!(!unit.moving_along_path);
    assert!(unit.needs_attention);
}

#[test]
fn test_set_movement_path_failures() {
    let mut world = standard_duel();
    world.map.set_terrain(&c(5, 5), Terrain::Ocean);
    let mut game = start(world, ScriptedRandom::constant(0.5));

    assert_eq!(
        game.set_movement_path(1, c(5, 5)),
        Err(GameError::NoPathFound {
            from: c(2, 2),
            to: c(5, 5)
        })
    );
    assert!(matches!(
        game.set_movement_path(1, c(2, 2)),
        Err(GameError::NoPathFound { .. })
    ));
}

#[test]
fn test_direct_move_cancels_path() {
    let mut game = start(standard_duel(), ScriptedRandom::constant(0.5));
    game.set_movement_path(1, c(2, 6)).unwrap();
    game.move_unit(1, c(3, 2)).unwrap();
    let unit = game.world().unit(1).unwrap();
    assert!(unit.movement_path.is_empty());
    assert!(!unit.moving_along_path);
}

// =============================================================================
// Production
// =============================================================================

#[test]
fn test_army_produced_after_six_turns() {
    let mut game = start(standard_duel(), ScriptedRandom::constant(0.5));
    assert_eq!(
        game.world().city(1).unwrap().current_production,
        Some(UnitType::Army)
    );

    for _ in 0..12 {
        game.end_turn().unwrap();
    }
    assert_eq!(game.turn_number(), 7);
    assert_eq!(game.current_player_index(), 0);

    let units = game.world().units_owned_by(0);
    assert_eq!(units.len(), 2);
    let produced = game.world().unit_at(&c(0, 0)).unwrap();
    assert_eq!(produced.unit_type, UnitType::Army);
    assert_eq!(produced.moves_remaining, 0);

    let player = &game.world().players[0];
    assert_eq!(player.stats.units_created, 1);
    assert_eq!(player.turn_stats.units_created_this_turn, 1);

    assert!(game.drain_events().iter().any(|e| matches!(
        e,
        GameEvent::UnitProduced {
            city: 1,
            unit_type: UnitType::Army,
            ..
        }
    )));
    // The idle city picked up a new army immediately.
    assert_eq!(game.world().city(1).unwrap().turns_remaining, 6);
}

#[test]
fn test_production_stalls_without_room() {
    let mut world = standard_duel();
    world.spawn_unit(UnitType::Army, c(0, 0), 0);
    let blocker = world.spawn_unit(UnitType::Army, c(1, 0), 0);
    world.spawn_unit(UnitType::Army, c(0, 1), 0);
    let city = world.city_mut(1).unwrap();
    city.start_production(UnitType::Army);
    city.turns_remaining = 1;

    let mut game = start(world, ScriptedRandom::constant(0.5));
    let city = game.world().city(1).unwrap();
    assert_eq!(city.current_production, Some(UnitType::Army));
    assert_eq!(city.turns_remaining, 1);
    assert_eq!(game.world().units_owned_by(0).len(), 4);

    game.move_unit(blocker, c(2, 0)).unwrap();
    game.end_turn().unwrap();
    game.end_turn().unwrap();

    let produced = game.world().unit_at(&c(1, 0)).unwrap();
    assert_eq!(produced.owner, 0);
    assert_eq!(produced.moves_remaining, 0);
    assert_eq!(game.world().units_owned_by(0).len(), 5);
}

#[test]
fn test_naval_units_need_a_coast() {
    let mut world = standard_duel();
    world.map.set_terrain(&c(1, 1), Terrain::Ocean);
    let inland = world.add_city(c(5, 5), Some(0), "Inland".to_string());
    let mut game = start(world, ScriptedRandom::constant(0.5));

    assert_eq!(
        game.start_production(1, UnitType::Destroyer),
        Ok(ProductionRequest::Queued(0))
    );
    assert_eq!(
        game.start_production(inland, UnitType::Destroyer),
        Err(GameError::InvalidProductionType {
            city: inland,
            unit_type: UnitType::Destroyer
        })
    );

    assert_eq!(game.cancel_production(1), Ok(Some(UnitType::Army)));
    let city = game.world().city(1).unwrap();
    assert_eq!(city.current_production, Some(UnitType::Destroyer));
    assert_eq!(city.turns_remaining, UnitType::Destroyer.cost());
}

#[test]
fn test_cannot_touch_enemy_city() {
    let mut game = start(standard_duel(), ScriptedRandom::constant(0.5));
    assert_eq!(
        game.start_production(2, UnitType::Tank),
        Err(GameError::NotYourCity { city: 2, player: 0 })
    );
    assert_eq!(
        game.cancel_production(2),
        Err(GameError::NotYourCity { city: 2, player: 0 })
    );
}

// =============================================================================
// Combat and Capture
// =============================================================================

#[test]
fn test_attack_win_advances_attacker() {
    let mut world = standard_duel();
    let target = world.spawn_unit(UnitType::Army, c(2, 3), 1);
    let mut game = start(world, attacker_wins());

    let outcome = game.attack_unit(1, target).unwrap();
    assert!(outcome.combat.attacker_wins);
    assert!(outcome.attacker_advanced);

    let attacker = game.world().unit(1).unwrap();
    assert_eq!(attacker.position, c(2, 3));
    assert!(attacker.has_attacked);
    assert_eq!(attacker.moves_remaining, 1);
    assert!(game.world().unit(target).is_none());

    let winner = &game.world().players[0].stats;
    assert_eq!(winner.battles_won, 1);
    assert_eq!(winner.enemies_destroyed, 1);
    let loser = &game.world().players[1].stats;
    assert_eq!(loser.units_lost, 1);
    assert_eq!(loser.battles_lost, 1);

    assert!(game.drain_events().contains(&GameEvent::UnitDestroyed {
        unit: target,
        owner: 1,
        reason: DestroyReason::Combat
    }));
}

#[test]
fn test_attack_loss_removes_attacker_once() {
    let mut world = standard_duel();
    let target = world.spawn_unit(UnitType::Army, c(2, 3), 1);
    let mut game = start(world, defender_wins());

    let outcome = game.attack_unit(1, target).unwrap();
    assert!(!outcome.combat.attacker_wins);
    assert!(game.world().unit(1).is_none());
    assert_eq!(game.world().unit(target).unwrap().position, c(2, 3));

    let loser = &game.world().players[0].stats;
    assert_eq!(loser.units_lost, 1);
    assert_eq!(loser.battles_lost, 1);
    assert_eq!(game.world().players[1].stats.battles_won, 1);
}

#[test]
fn test_equal_rolls_favor_defender() {
    let mut world = standard_duel();
    let target = world.spawn_unit(UnitType::Army, c(2, 3), 1);
    let mut game = start(world, ScriptedRandom::constant(0.5));

    let outcome = game.attack_unit(1, target).unwrap();
    assert_eq!(outcome.combat.attack_roll, outcome.combat.defense_roll);
    assert!(!outcome.combat.attacker_wins);
}

#[test]
fn test_attack_validation() {
    let mut world = standard_duel();
    let fighter = world.spawn_unit(UnitType::Fighter, c(4, 4), 0);
    let far = world.spawn_unit(UnitType::Army, c(4, 7), 1);
    let near = world.spawn_unit(UnitType::Army, c(4, 6), 1);
    let friend = world.spawn_unit(UnitType::Army, c(3, 4), 0);
    let next = world.spawn_unit(UnitType::Army, c(5, 6), 1);
    let mut game = start(world, attacker_wins());

    assert!(matches!(
        game.attack_unit(fighter, far),
        Err(GameError::InvalidAttack {
            reason: "target out of range",
            ..
        })
    ));
    assert!(matches!(
        game.attack_unit(fighter, friend),
        Err(GameError::InvalidAttack {
            reason: "cannot attack own unit",
            ..
        })
    ));

    game.attack_unit(fighter, near).unwrap();
    assert!(matches!(
        game.attack_unit(fighter, next),
        Err(GameError::InvalidAttack {
            reason: "already attacked this turn",
            ..
        })
    ));
}

#[test]
fn test_capture_neutral_city_awaits_choice_for_humans() {
    let mut world = standard_duel();
    let neutral = world.add_city(c(2, 3), None, "Free".to_string());
    let mut game = start(world, attacker_wins());

    let outcome = game.move_unit(1, c(2, 3)).unwrap();
    let capture = outcome.capture.unwrap();
    assert!(capture.success);
    assert!(capture.awaiting_production_choice);

    let city = game.world().city(neutral).unwrap();
    assert_eq!(city.owner, Some(0));
    assert!(city.is_idle());
    assert_eq!(city.current_defense, 14);

    let unit = game.world().unit(1).unwrap();
    assert_eq!(unit.position, c(2, 3));
    assert_eq!(unit.moves_remaining, 0);
    assert_eq!(game.world().players[0].stats.cities_captured, 1);

    game.apply_command(&Command::SetCapturedCityProduction {
        city_id: neutral,
        unit_type: UnitType::Tank,
    })
    .unwrap();
    assert_eq!(
        game.world().city(neutral).unwrap().current_production,
        Some(UnitType::Tank)
    );
}

#[test]
fn test_failed_capture_destroys_unit() {
    let mut world = standard_duel();
    let neutral = world.add_city(c(2, 3), None, "Free".to_string());
    let mut game = start(world, defender_wins());
    game.drain_events();

    let outcome = game.move_unit(1, c(2, 3)).unwrap();
    assert!(!outcome.capture.unwrap().success);
    assert!(game.world().unit(1).is_none());

    let city = game.world().city(neutral).unwrap();
    assert!(city.is_neutral());
    assert_eq!(city.current_defense, 14);
    assert_eq!(game.world().players[0].stats.units_lost, 1);

    let events = game.drain_events();
    assert!(events.contains(&GameEvent::UnitDestroyed {
        unit: 1,
        owner: 0,
        reason: DestroyReason::FailedCapture
    }));
}

#[test]
fn test_attack_onto_enemy_city_attempts_capture() {
    let mut world = standard_duel();
    let raider = world.spawn_unit(UnitType::Army, c(8, 9), 0);
    let guard = world.spawn_unit(UnitType::Army, c(9, 9), 1);
    let mut game = start(world, attacker_wins());

    let outcome = game.attack_unit(raider, guard).unwrap();
    let capture = outcome.capture.unwrap();
    assert!(capture.success);
    assert_eq!(capture.city, 2);

    let city = game.world().city(2).unwrap();
    assert_eq!(city.owner, Some(0));
    assert!(!city.is_capital);
    assert_eq!(game.world().unit(raider).unwrap().position, c(9, 9));
}

#[test]
fn test_commands_from_json() {
    let mut game = start(standard_duel(), ScriptedRandom::constant(0.5));
    let command: Command =
        serde_json::from_str(r#"{"type":"MoveUnit","unit_id":1,"to":{"x":2,"y":3}}"#).unwrap();
    game.apply_command(&command).unwrap();
    assert_eq!(game.world().unit(1).unwrap().position, c(2, 3));
}

// =============================================================================
// Game End
// =============================================================================

#[test]
fn test_last_player_standing_wins() {
    let mut world = WorldState::new(
        Map::filled(8, 8, Terrain::Land),
        vec![
            Player::human(0, "Ada".to_string()),
            Player::human(1, "Grace".to_string()),
        ],
    );
    world.add_city(c(0, 0), Some(0), "Alpha".to_string());
    world.spawn_unit(UnitType::Army, c(2, 2), 0);
    let last = world.spawn_unit(UnitType::Army, c(2, 3), 1);
    let mut game = start(world, attacker_wins());

    game.attack_unit(1, last).unwrap();
    game.end_turn().unwrap();

    assert_eq!(game.phase(), TurnPhase::Ended { winner: Some(0) });
    assert_eq!(game.winner(), Some(0));
    let events = game.drain_events();
    assert!(events.contains(&GameEvent::PlayerEliminated { player: 1 }));
    assert_eq!(
        events.last(),
        Some(&GameEvent::GameEnded { winner: Some(0) })
    );
    assert_eq!(game.end_turn(), Err(GameError::GameNotInProgress));
}

#[test]
fn test_turn_limit_crowns_score_leader() {
    let mut world = standard_duel();
    world.add_city(c(0, 9), Some(1), "Beta".to_string());
    let settings = GameSettings {
        max_turns: 2,
        ..GameSettings::new(10, 10)
    };
    let mut game = start_with(world, settings, ScriptedRandom::constant(0.5));

    for _ in 0..3 {
        game.end_turn().unwrap();
    }
    assert!(!game.is_over());
    game.end_turn().unwrap();

    assert_eq!(game.turn_number(), 3);
    assert_eq!(game.winner(), Some(1));
    assert!(matches!(
        game.move_unit(1, c(2, 3)),
        Err(GameError::GameNotInProgress)
    ));
}
