use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::error::Error;
use std::path::PathBuf;

use shut_the_box::logging::setup_logging;
use shut_the_box::{play_game, MCTSHyperparameters};

#[derive(Parser, Debug)]
#[command(
    name = "shut_the_box",
    about = "Play Shut the Box games with the Monte Carlo Tree Search player"
)]
struct Config {
    /// Number of games to play
    #[arg(short = 'g', long, default_value_t = 10)]
    games: usize,

    /// JSON file with MCTS hyperparameters (flags below override it)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Search iterations before each decision
    #[arg(short = 's', long)]
    simulations: Option<usize>,

    /// Initial exploration constant
    #[arg(short = 'c', long)]
    exploration: Option<f64>,

    /// Factor applied to the exploration constant after each turn
    #[arg(long)]
    decay: Option<f64>,

    /// Number of tiles in the box
    #[arg(short = 't', long)]
    tiles: Option<u8>,

    /// RNG seed for reproducible runs
    #[arg(short = 'r', long)]
    seed: Option<u64>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Write rotated log files to this directory instead of stderr
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

impl Config {
    fn hyperparameters(&self) -> Result<MCTSHyperparameters, Box<dyn Error>> {
        let mut params = match &self.config {
            Some(path) => MCTSHyperparameters::from_json_file(path)?,
            None => MCTSHyperparameters::default(),
        };
        if let Some(simulations) = self.simulations {
            params.simulations_per_turn = simulations;
            params.max_simulations = params.max_simulations.max(simulations.saturating_mul(10));
        }
        if let Some(exploration) = self.exploration {
            params.exploration_constant = exploration;
        }
        if let Some(decay) = self.decay {
            params.exploration_decay = decay;
        }
        if let Some(tiles) = self.tiles {
            params.num_tiles = tiles;
        }
        if self.seed.is_some() {
            params.seed = self.seed;
        }
        params.validate()?;
        Ok(params)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::parse();
    let _logger = setup_logging(&config.log_level, config.log_dir.as_deref())?;

    let mut params = config.hyperparameters()?;
    log::info!("🎲 Shut the Box MCTS: {} games, {}", config.games, params.to_config_string());

    let mut dice_rng = match params.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    let base_seed = params.seed;

    let mut scores = Vec::with_capacity(config.games);
    for game_idx in 0..config.games {
        // distinct but reproducible search seed per game
        params.seed = base_seed.map(|seed| seed.wrapping_add(game_idx as u64 + 1));

        let outcome = play_game(&params, &mut dice_rng)?;
        log::info!(
            "Game {}/{}: score {} tiles {:?} after {} turns{}",
            game_idx + 1,
            config.games,
            outcome.score,
            outcome.tiles,
            outcome.turns,
            if outcome.won { " 🏆" } else { "" }
        );
        scores.push(outcome.score);
    }

    if !scores.is_empty() {
        let count = scores.len() as f64;
        let mean = scores.iter().map(|&s| f64::from(s)).sum::<f64>() / count;
        let wins = scores.iter().filter(|&&s| s == 0).count();
        log::info!(
            "Average score {:.2} over {} games, {} shut the box ({:.1}%)",
            mean,
            scores.len(),
            wins,
            100.0 * wins as f64 / count
        );
    }

    Ok(())
}
