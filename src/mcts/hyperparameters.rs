//! MCTS Hyperparameters Configuration
//!
//! All tunable knobs of the search and of the whole-game driver. Values can be
//! loaded from a JSON file and overridden from the command line.

use crate::game::game_state::MAX_TILES;
use crate::{Result, ShutTheBoxError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// MCTS hyperparameters configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MCTSHyperparameters {
    // ========== Exploration ==========
    /// Exploration constant `c` used on the first turn
    /// Default: 1.0
    pub exploration_constant: f64,

    /// Factor applied to `c` after every real turn
    /// 0.5 halves exploration each turn, shifting towards exploitation late in the game
    /// Default: 0.5
    pub exploration_decay: f64,

    // ========== Simulation Budget ==========
    /// Search iterations run before each real decision
    /// Default: 1000
    pub simulations_per_turn: usize,

    /// Upper simulation budget carried by the controller
    /// Default: 10000 (ten times the per-turn budget)
    pub max_simulations: usize,

    // ========== Game ==========
    /// Number of tiles in a fresh box
    /// Default: 9
    pub num_tiles: u8,

    /// RNG seed for reproducible searches; `None` draws one from the OS
    pub seed: Option<u64>,
}

impl Default for MCTSHyperparameters {
    fn default() -> Self {
        Self {
            exploration_constant: 1.0,
            exploration_decay: 0.5,
            simulations_per_turn: 1000,
            max_simulations: 10_000,
            num_tiles: 9,
            seed: None,
        }
    }
}

impl MCTSHyperparameters {
    /// Loads a configuration from a JSON file; missing fields keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let params: Self = serde_json::from_str(&contents)?;
        params.validate()?;
        Ok(params)
    }

    /// Exploration constant for the given zero-based turn.
    pub fn get_exploration(&self, turn: usize) -> f64 {
        let exponent = i32::try_from(turn).unwrap_or(i32::MAX);
        self.exploration_constant * self.exploration_decay.powi(exponent)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.exploration_constant.is_finite() || self.exploration_constant < 0.0 {
            return Err(ShutTheBoxError::InvalidConfig(format!(
                "exploration_constant must be a non-negative number, got {}",
                self.exploration_constant
            )));
        }
        if !(self.exploration_decay > 0.0 && self.exploration_decay <= 1.0) {
            return Err(ShutTheBoxError::InvalidConfig(format!(
                "exploration_decay must be in (0, 1], got {}",
                self.exploration_decay
            )));
        }
        if self.simulations_per_turn == 0 {
            return Err(ShutTheBoxError::InvalidConfig(
                "simulations_per_turn must be positive".to_string(),
            ));
        }
        if self.num_tiles == 0 || self.num_tiles > MAX_TILES {
            return Err(ShutTheBoxError::InvalidConfig(format!(
                "num_tiles must be between 1 and {}, got {}",
                MAX_TILES, self.num_tiles
            )));
        }
        if self.max_simulations < self.simulations_per_turn {
            log::warn!(
                "max_simulations ({}) is below simulations_per_turn ({})",
                self.max_simulations,
                self.simulations_per_turn
            );
        }
        Ok(())
    }

    /// Create a configuration string for logging
    pub fn to_config_string(&self) -> String {
        format!(
            "c[{:.3}x{:.2}]_sims[{}/{}]_tiles[{}]_seed[{}]",
            self.exploration_constant,
            self.exploration_decay,
            self.simulations_per_turn,
            self.max_simulations,
            self.num_tiles,
            self.seed.map_or_else(|| "random".to_string(), |s| s.to_string())
        )
    }
}
