//! Sovereign Tactics self-play runner.
//!
//! Plays all-AI games headlessly and prints the results as JSON:
//! - `sovereign-selfplay --seed 7` - one game
//! - `sovereign-selfplay --games 20 --strategy aggressive --strategy economic` - a batch
//! - `sovereign-selfplay --config run.json` - settings from a file

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use sovereign_tactics_core::selfplay::{run_batch_selfplay, run_selfplay, SelfPlayConfig};
use sovereign_tactics_core::{AiDifficulty, AiStrategy};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "sovereign-selfplay")]
#[command(about = "Run headless AI-vs-AI Sovereign Tactics games", version)]
struct Cli {
    /// JSON file with a full self-play configuration (flags are ignored)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the first game
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Number of AI players
    #[arg(short, long, default_value_t = 2)]
    players: usize,

    /// Map width in tiles
    #[arg(long, default_value_t = 30)]
    width: u32,

    /// Map height in tiles
    #[arg(long, default_value_t = 20)]
    height: u32,

    /// Round limit per game
    #[arg(long, default_value_t = 150)]
    max_turns: u32,

    /// Games to play on consecutive seeds
    #[arg(short, long, default_value_t = 1)]
    games: u32,

    /// Strategy per seat (repeat to vary; cycles over seats)
    #[arg(long = "strategy")]
    strategies: Vec<AiStrategy>,

    /// AI difficulty for every seat
    #[arg(long, default_value = "medium")]
    difficulty: AiDifficulty,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn selfplay_config(&self) -> Result<SelfPlayConfig, String> {
        if let Some(path) = &self.config {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
            return serde_json::from_str(&text)
                .map_err(|e| format!("invalid config {}: {e}", path.display()));
        }

        let strategies = if self.strategies.is_empty() {
            vec![AiStrategy::Balanced]
        } else {
            self.strategies.clone()
        };
        Ok(SelfPlayConfig {
            map_width: self.width,
            map_height: self.height,
            num_players: self.players,
            seed: self.seed,
            max_turns: self.max_turns,
            strategies,
            difficulty: self.difficulty,
        })
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match cli.selfplay_config() {
        Ok(config) => config,
        Err(message) => {
            error!("{message}");
            return ExitCode::FAILURE;
        }
    };
    info!(
        seed = config.seed,
        players = config.num_players,
        games = cli.games,
        "starting self-play"
    );

    let output = if cli.games > 1 {
        run_batch_selfplay(&config, cli.games).map(|batch| to_json(&batch, cli.pretty))
    } else {
        run_selfplay(&config).map(|result| to_json(&result, cli.pretty))
    };

    match output {
        Ok(Ok(json)) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Ok(Err(e)) => {
            error!(error = %e, "failed to encode results");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!(error = %e, "self-play failed");
            ExitCode::FAILURE
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}
