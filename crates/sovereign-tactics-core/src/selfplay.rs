//! Headless self-play harness.
//!
//! Runs all-AI games to completion and collects per-player statistics. Used
//! by the `sovereign-selfplay` binary for balance checks and as a soak test
//! for the engine.

use crate::error::GameError;
use crate::events::GameEvent;
use crate::game::Game;
use crate::player::{AiDifficulty, AiStrategy, PlayerStats};
use crate::random::SeededRandom;
use crate::settings::{GameConfig, GameSettings, PlayerConfig};
use crate::types::PlayerId;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Configuration for one self-play game.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SelfPlayConfig {
    pub map_width: u32,
    pub map_height: u32,
    pub num_players: usize,
    /// Seeds both the map and the combat/AI random stream.
    pub seed: u64,
    /// Round limit; the score leader wins once it is exceeded.
    pub max_turns: u32,
    /// Strategy per seat, cycled when shorter than `num_players`.
    pub strategies: Vec<AiStrategy>,
    pub difficulty: AiDifficulty,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        Self {
            map_width: 30,
            map_height: 20,
            num_players: 2,
            seed: 42,
            max_turns: 150,
            strategies: vec![AiStrategy::Balanced],
            difficulty: AiDifficulty::Medium,
        }
    }
}

impl SelfPlayConfig {
    pub fn strategy_for(&self, seat: usize) -> AiStrategy {
        if self.strategies.is_empty() {
            return AiStrategy::default();
        }
        self.strategies[seat % self.strategies.len()]
    }

    /// The game configuration this run plays.
    pub fn game_config(&self) -> GameConfig {
        let settings = GameSettings {
            max_turns: self.max_turns.max(1),
            ..GameSettings::new(self.map_width, self.map_height).with_seed(self.seed)
        };
        let players = (0..self.num_players)
            .map(|seat| {
                PlayerConfig::ai(&format!("AI {}", seat + 1), self.strategy_for(seat))
                    .with_difficulty(self.difficulty)
            })
            .collect();
        GameConfig::new(settings, players)
    }
}

/// How a self-play game finished.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Every other player was eliminated.
    Conquest { winner: PlayerId },
    /// The round limit was reached; the score leader wins.
    TurnLimit { winner: Option<PlayerId> },
    /// Nobody left standing.
    Stalemate,
}

/// End-of-game summary for one seat.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub player_id: PlayerId,
    pub name: String,
    pub strategy: AiStrategy,
    pub stats: PlayerStats,
    pub final_cities: usize,
    pub final_units: usize,
    pub eliminated: bool,
}

/// Counters gathered from the event stream.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GameMetrics {
    pub turns_played: u32,
    pub total_combats: u32,
    pub total_captures: u32,
    pub failed_captures: u32,
    pub units_produced: u32,
    pub players: Vec<PlayerSummary>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SelfPlayResult {
    pub seed: u64,
    pub outcome: Outcome,
    pub metrics: GameMetrics,
    /// Wall clock.
    pub duration_ms: u64,
}

impl SelfPlayResult {
    pub fn winner(&self) -> Option<PlayerId> {
        match self.outcome {
            Outcome::Conquest { winner } => Some(winner),
            Outcome::TurnLimit { winner } => winner,
            Outcome::Stalemate => None,
        }
    }
}

/// Results across several seeds.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchSelfPlayResult {
    pub games_played: u32,
    pub results: Vec<SelfPlayResult>,
    pub aggregate: AggregateMetrics,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AggregateMetrics {
    pub avg_game_length: f64,
    /// Wins per seat.
    pub win_counts: Vec<u32>,
    /// Fraction of games decided by elimination.
    pub conquest_rate: f64,
    pub avg_combats: f64,
}

/// Play one all-AI game to the end.
pub fn run_selfplay(config: &SelfPlayConfig) -> Result<SelfPlayResult, GameError> {
    let start = std::time::Instant::now();
    let mut game = Game::initialize(config.game_config(), SeededRandom::from_seed(config.seed))?;
    let mut metrics = GameMetrics::default();

    loop {
        for event in game.drain_events() {
            record_event(&event, &mut metrics);
        }
        if game.is_over() {
            break;
        }
        game.advance()?;
        debug!(turn = game.turn_number(), "self-play batch of turns done");
    }

    metrics.turns_played = game.turn_number();
    metrics.players = summarize_players(&game, config);

    let alive = game.world().alive_players();
    let outcome = match (game.winner(), alive.len()) {
        (_, 0) => Outcome::Stalemate,
        (Some(winner), 1) => Outcome::Conquest { winner },
        (winner, _) => Outcome::TurnLimit { winner },
    };

    info!(
        seed = config.seed,
        ?outcome,
        turns = metrics.turns_played,
        "self-play game finished"
    );
    Ok(SelfPlayResult {
        seed: config.seed,
        outcome,
        metrics,
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

/// Play `num_games` games on consecutive seeds.
pub fn run_batch_selfplay(
    config: &SelfPlayConfig,
    num_games: u32,
) -> Result<BatchSelfPlayResult, GameError> {
    let mut results = Vec::with_capacity(num_games as usize);
    for i in 0..num_games {
        let game_config = SelfPlayConfig {
            seed: config.seed.wrapping_add(i as u64),
            ..config.clone()
        };
        results.push(run_selfplay(&game_config)?);
    }

    let aggregate = aggregate_metrics(&results, config.num_players);
    Ok(BatchSelfPlayResult {
        games_played: num_games,
        results,
        aggregate,
    })
}

fn record_event(event: &GameEvent, metrics: &mut GameMetrics) {
    match event {
        GameEvent::CombatResolved { .. } => metrics.total_combats += 1,
        GameEvent::CityCaptured { success: true, .. } => metrics.total_captures += 1,
        GameEvent::CityCaptured { success: false, .. } => metrics.failed_captures += 1,
        GameEvent::UnitProduced { .. } => metrics.units_produced += 1,
        _ => {}
    }
}

fn summarize_players(game: &Game, config: &SelfPlayConfig) -> Vec<PlayerSummary> {
    let world = game.world();
    world
        .players
        .iter()
        .enumerate()
        .map(|(seat, player)| PlayerSummary {
            player_id: player.id,
            name: player.name.clone(),
            strategy: config.strategy_for(seat),
            stats: player.stats.clone(),
            final_cities: world.cities_owned_by(player.id).len(),
            final_units: world.units_owned_by(player.id).len(),
            eliminated: player.eliminated,
        })
        .collect()
}

fn aggregate_metrics(results: &[SelfPlayResult], num_players: usize) -> AggregateMetrics {
    if results.is_empty() {
        return AggregateMetrics {
            win_counts: vec![0; num_players],
            ..Default::default()
        };
    }

    let games = results.len() as f64;
    let mut win_counts = vec![0u32; num_players];
    for winner in results.iter().filter_map(|r| r.winner()) {
        if let Some(count) = win_counts.get_mut(winner as usize) {
            *count += 1;
        }
    }
    let conquests = results
        .iter()
        .filter(|r| matches!(r.outcome, Outcome::Conquest { .. }))
        .count();

    AggregateMetrics {
        avg_game_length: results
            .iter()
            .map(|r| r.metrics.turns_played as f64)
            .sum::<f64>()
            / games,
        win_counts,
        conquest_rate: conquests as f64 / games,
        avg_combats: results
            .iter()
            .map(|r| r.metrics.total_combats as f64)
            .sum::<f64>()
            / games,
    }
}
