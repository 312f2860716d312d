//! AI behavior tests.
//!
//! Scripted scenarios check each strategy's choices; randomized all-AI games
//! (driven by `rand`) check that AI play never breaks world invariants.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sovereign_tactics_core::{
    can_enter, AiDifficulty, AiStrategy, Game, GameConfig, GameEvent, GameSettings, GridCoord,
    Map, Player, PlayerConfig, RandomSource, ScriptedRandom, Terrain, TurnPhase, UnitType,
    WorldState,
};
use std::collections::HashSet;

// =============================================================================
// Test Helpers
// =============================================================================

/// `rand`-backed random source for property-style runs.
#[derive(Debug)]
struct StdRandom(StdRng);

impl StdRandom {
    fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl RandomSource for StdRandom {
    fn next_f64(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

fn c(x: i32, y: i32) -> GridCoord {
    GridCoord::new(x, y)
}

/// Player 0 is an AI with the given strategy; player 1 is a human whose
/// army at (8, 8) keeps the game waiting after the AI's first turn.
fn ai_versus_human(strategy: AiStrategy, difficulty: AiDifficulty) -> WorldState {
    let mut world = WorldState::new(
        Map::filled(10, 10, Terrain::Land),
        vec![
            Player::ai(0, "Bot".to_string(), strategy, difficulty),
            Player::human(1, "Ada".to_string()),
        ],
    );
    world.add_city(c(0, 0), Some(0), "Forge".to_string());
    world.add_city(c(9, 9), Some(1), "Haven".to_string());
    world.spawn_unit(UnitType::Army, c(8, 8), 1);
    world
}

fn start(world: WorldState, rng: ScriptedRandom) -> Game<ScriptedRandom> {
    let mut game = Game::with_world(world, GameSettings::new(10, 10), rng);
    game.start().unwrap();
    game
}

fn assert_world_invariants<R: RandomSource>(game: &Game<R>) {
    let world = game.world();
    let mut occupied = HashSet::new();
    for unit in world.units.values() {
        assert!(
            occupied.insert(unit.position),
            "two units share {}",
            unit.position
        );
        assert!(world.in_bounds(&unit.position));
        assert!(can_enter(unit.unit_type, world.terrain_at(&unit.position)));
        assert!(unit.moves_remaining <= unit.max_moves);
    }
    for city in world.cities.values() {
        assert!(city.current_defense >= 1);
        assert!(city.current_defense <= city.base_defense);
        if city.current_production.is_none() {
            assert_eq!(city.turns_remaining, 0);
        }
        assert_eq!(world.terrain_at(&city.position), Terrain::City);
    }
}

// =============================================================================
// Strategy Scenarios
// =============================================================================

#[test]
fn test_aggressive_ai_attacks_adjacent_enemy() {
    let mut world = ai_versus_human(AiStrategy::Aggressive, AiDifficulty::Hard);
    let attacker = world.spawn_unit(UnitType::Army, c(2, 2), 0);
    let victim = world.spawn_unit(UnitType::Army, c(2, 3), 1);
    // No blunder, then a winning attack roll against a losing defense roll.
    let mut game = start(world, ScriptedRandom::new(vec![0.9, 0.9, 0.1]));

    assert_eq!(
        game.phase(),
        TurnPhase::AwaitingPlayerActions { player_index: 1 }
    );
    assert!(game.drain_events().contains(&GameEvent::CombatResolved {
        attacker,
        defender: victim,
        attacker_wins: true
    }));
    assert!(game.world().unit(victim).is_none());
    assert_eq!(game.world().unit(attacker).unwrap().position, c(2, 3));
}

#[test]
fn test_economic_ai_heads_for_neutral_city() {
    let mut world = ai_versus_human(AiStrategy::Economic, AiDifficulty::Hard);
    let settler = world.spawn_unit(UnitType::Army, c(2, 2), 0);
    world.add_city(c(2, 6), None, "Prize".to_string());
    let game = start(world, ScriptedRandom::constant(0.9));

    assert_eq!(game.world().unit(settler).unwrap().position, c(2, 3));
}

#[test]
fn test_balanced_ai_prefers_neutral_city_over_enemy() {
    let mut world = ai_versus_human(AiStrategy::Balanced, AiDifficulty::Hard);
    let unit = world.spawn_unit(UnitType::Army, c(4, 4), 0);
    world.add_city(c(4, 0), None, "Prize".to_string());
    world.spawn_unit(UnitType::Army, c(6, 4), 1);
    let game = start(world, ScriptedRandom::constant(0.9));

    // One step north toward the neutral city; the explorer pass only
    // touches units that still have moves.
    assert_eq!(game.world().unit(unit).unwrap().position, c(4, 3));
}

#[test]
fn test_defensive_ai_walks_back_to_city() {
    let mut world = ai_versus_human(AiStrategy::Defensive, AiDifficulty::Hard);
    world.add_city(c(5, 5), Some(0), "Keep".to_string());
    let guard = world.spawn_unit(UnitType::Army, c(5, 8), 0);
    let game = start(world, ScriptedRandom::constant(0.9));

    assert_eq!(game.world().unit(guard).unwrap().position, c(5, 7));
}

#[test]
fn test_defensive_ai_leaves_posted_guard() {
    let mut world = ai_versus_human(AiStrategy::Defensive, AiDifficulty::Hard);
    world.add_city(c(5, 5), Some(0), "Keep".to_string());
    let guard = world.spawn_unit(UnitType::Army, c(5, 6), 0);
    let game = start(world, ScriptedRandom::constant(0.9));

    assert_eq!(game.world().unit(guard).unwrap().position, c(5, 6));
}

#[test]
fn test_mistakes_idle_units() {
    let mut world = ai_versus_human(AiStrategy::Economic, AiDifficulty::Easy);
    let settler = world.spawn_unit(UnitType::Army, c(2, 2), 0);
    world.add_city(c(2, 6), None, "Prize".to_string());
    // Every draw is below the easy mistake chance.
    let game = start(world, ScriptedRandom::constant(0.1));

    assert_eq!(game.world().unit(settler).unwrap().position, c(2, 2));
}

// =============================================================================
// Production Choices
// =============================================================================

/// Player 0 is an AI owning a port at (0, 0) on an ocean column at x = 1.
fn port_versus_human(strategy: AiStrategy) -> Game<ScriptedRandom> {
    let mut map = Map::filled(12, 12, Terrain::Land);
    for y in 0..12 {
        map.set_terrain(&c(1, y), Terrain::Ocean);
    }
    let mut world = WorldState::new(
        map,
        vec![
            Player::ai(0, "Bot".to_string(), strategy, AiDifficulty::Hard),
            Player::human(1, "Ada".to_string()),
        ],
    );
    world.add_city(c(0, 0), Some(0), "Port".to_string());
    world.add_city(c(11, 11), Some(1), "Haven".to_string());
    world.spawn_unit(UnitType::Army, c(10, 10), 1);
    let settings = GameSettings::new(12, 12);
    let mut game = Game::with_world(world, settings, ScriptedRandom::constant(0.9));
    game.start().unwrap();
    game
}

#[test]
fn test_aggressive_port_builds_warships() {
    let mut game = port_versus_human(AiStrategy::Aggressive);
    assert_eq!(
        game.world().city(1).unwrap().current_production,
        Some(UnitType::Battleship)
    );

    let mut built = Vec::new();
    for _ in 0..25 {
        game.end_turn().unwrap();
        built.extend(game.drain_events().into_iter().filter_map(|event| match event {
            GameEvent::UnitProduced {
                unit_type, city: 1, ..
            } => Some(unit_type),
            _ => None,
        }));
    }
    assert_eq!(built, vec![UnitType::Battleship]);
    // The next build is chosen by the AI again, not defaulted.
    assert_eq!(
        game.world().city(1).unwrap().current_production,
        Some(UnitType::Battleship)
    );
}

#[test]
fn test_defensive_port_builds_armies() {
    let game = port_versus_human(AiStrategy::Defensive);
    assert_eq!(
        game.world().city(1).unwrap().current_production,
        Some(UnitType::Army)
    );
}

#[test]
fn test_human_idle_city_defaults_to_army() {
    let game = port_versus_human(AiStrategy::Aggressive);
    assert_eq!(
        game.world().city(2).unwrap().current_production,
        Some(UnitType::Army)
    );
}

// =============================================================================
// Randomized All-AI Games
// =============================================================================

#[test]
fn test_all_ai_games_keep_invariants() {
    for seed in 0..4u64 {
        let settings = GameSettings {
            max_turns: 30,
            max_automatic_turns: 4,
            ..GameSettings::new(24, 24).with_seed(seed)
        };
        let config = GameConfig::new(
            settings,
            AiStrategy::all()
                .iter()
                .enumerate()
                .map(|(i, strategy)| PlayerConfig::ai(&format!("AI {i}"), *strategy))
                .collect(),
        );
        let mut game = Game::initialize(config, StdRandom::seeded(seed)).unwrap();
        assert_world_invariants(&game);

        let mut rounds = 0;
        while !game.is_over() {
            game.advance().unwrap();
            assert_world_invariants(&game);
            rounds += 1;
            assert!(rounds < 1000, "game {seed} never finished");
        }
        assert!(game.turn_number() <= 31);
    }
}

#[test]
fn test_ai_attack_stats_balance() {
    let settings = GameSettings {
        max_turns: 40,
        ..GameSettings::new(16, 12).with_seed(99)
    };
    let config = GameConfig::new(
        settings,
        vec![
            PlayerConfig::ai("Red", AiStrategy::Aggressive).with_difficulty(AiDifficulty::Hard),
            PlayerConfig::ai("Blue", AiStrategy::Aggressive).with_difficulty(AiDifficulty::Hard),
        ],
    );
    let mut game = Game::initialize(config, StdRandom::seeded(99)).unwrap();
    while !game.is_over() {
        game.advance().unwrap();
    }

    let stats: Vec<_> = game.world().players.iter().map(|p| p.stats.clone()).collect();
    let won: u32 = stats.iter().map(|s| s.battles_won).sum();
    let lost: u32 = stats.iter().map(|s| s.battles_lost).sum();
    assert_eq!(won, lost);
    let destroyed: u32 = stats.iter().map(|s| s.enemies_destroyed).sum();
    assert_eq!(destroyed, won);
}
