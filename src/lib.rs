//! # Shut the Box Library
//!
//! Game engine and Monte Carlo Tree Search player for "Shut the Box": a row of
//! numbered tiles, one or two dice per turn, and the obligation to shut tiles
//! summing exactly to the roll until no valid move remains.
//!
//! ## Features
//!
//! - **Game Engine**: tile set, dice, valid-combination enumeration
//! - **AI Engine**: three-phase MCTS (round start, pre-roll, post-roll) with
//!   root advancement across real turns
//! - **Driver**: whole-game loop used by the `shut_the_box` binary
//!
//! ## Usage
//!
//! ```no_run
//! use shut_the_box::{GameState, MonteCarlo, TileDecision};
//!
//! let mut mc = MonteCarlo::new(GameState::new(9)?, 10_000);
//! mc.simulate(1000, 1.0);
//! let dice = mc.roll_decision()?;
//! let roll = dice.roll(&mut rand::rng());
//! match mc.tile_decision(roll)? {
//!     TileDecision::Shut(tiles) => println!("shutting {:?}", tiles),
//!     TileDecision::NoMove => println!("game over at {}", mc.score()),
//! }
//! # Ok::<(), shut_the_box::ShutTheBoxError>(())
//! ```

// ============================================================================
// PUBLIC API MODULES
// ============================================================================

/// Core game logic and rules
pub mod game;

/// Monte Carlo Tree Search AI engine
pub mod mcts;

/// Whole-game driver on top of the search controller
pub mod play;

/// Logger initialisation shared by the binaries
pub mod logging;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

pub use game::dice::{roll_probability, Dice};
pub use game::game_state::{GameState, Tile};

pub use mcts::algorithm::MonteCarlo;
pub use mcts::hyperparameters::MCTSHyperparameters;
pub use mcts::mcts_result::{SimulationSummary, TileDecision};
pub use mcts::node::Phase;

pub use play::{play_game, GameOutcome};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Main error type for the Shut the Box library
#[derive(Debug, thiserror::Error)]
pub enum ShutTheBoxError {
    #[error("Wrong phase: expected {expected:?} root, found {found:?}")]
    WrongPhase { expected: Phase, found: Phase },

    #[error("Invalid move: tiles {tiles:?} cannot be shut from {remaining:?}")]
    InvalidMove { tiles: Vec<Tile>, remaining: Vec<Tile> },

    #[error("Invalid dice roll: {dice} dice cannot produce {value}")]
    InvalidDiceRoll { dice: u8, value: u8 },

    #[error("Illegal dice choice: {dice} dice cannot be thrown while tile {max_tile} is open")]
    IllegalDice { dice: u8, max_tile: Tile },

    #[error("Game over: no decision left to make (score {score})")]
    GameOver { score: u32 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ShutTheBoxError>;

// ============================================================================
// LIBRARY VERSION INFO
// ============================================================================

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Library description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
