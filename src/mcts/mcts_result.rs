use crate::game::game_state::Tile;
use serde::{Deserialize, Serialize};

/// Outcome of a committed tile decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileDecision {
    /// Tiles shut this turn.
    Shut(Vec<Tile>),
    /// The roll leaves no valid combination: the game is over.
    NoMove,
}

impl TileDecision {
    pub fn is_no_move(&self) -> bool {
        matches!(self, TileDecision::NoMove)
    }
}

/// Counters returned by one `simulate` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationSummary {
    /// Iterations that ran a rollout and backpropagated its score.
    pub completed: usize,
    /// Iterations whose selected leaf was an already shut box.
    pub skipped: usize,
}

impl SimulationSummary {
    pub fn iterations(&self) -> usize {
        self.completed + self.skipped
    }
}
