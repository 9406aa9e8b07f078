//! Whole-game driver: lets the search controller play one game of Shut the Box.

use crate::game::game_state::{GameState, Tile};
use crate::mcts::algorithm::MonteCarlo;
use crate::mcts::hyperparameters::MCTSHyperparameters;
use crate::mcts::mcts_result::TileDecision;
use crate::Result;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Final position of a played game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOutcome {
    pub score: u32,
    pub tiles: Vec<Tile>,
    pub turns: usize,
    pub won: bool,
}

/// Plays a full game, searching before every turn.
///
/// The real dice are thrown with `rng`; the search itself uses the controller's
/// own generator (seeded from `hyperparams.seed` when set). The exploration
/// constant decays by `exploration_decay` after each turn.
pub fn play_game<R: Rng + ?Sized>(
    hyperparams: &MCTSHyperparameters,
    rng: &mut R,
) -> Result<GameOutcome> {
    hyperparams.validate()?;
    let state = GameState::new(hyperparams.num_tiles)?;
    let mut mc = MonteCarlo::with_hyperparameters(state, hyperparams);

    // warm-up so the first decision does not start from an empty tree
    mc.simulate(
        hyperparams.simulations_per_turn,
        hyperparams.get_exploration(0),
    );

    let mut turns = 0;
    while mc.score() > 0 {
        let c = hyperparams.get_exploration(turns);
        mc.simulate(hyperparams.simulations_per_turn, c);

        let dice = mc.roll_decision()?;
        let roll = dice.roll(rng);
        let decision = mc.tile_decision(roll)?;
        turns += 1;

        match decision {
            TileDecision::Shut(tiles) => log::info!(
                "turn {}: {} dice rolled {}, shut {:?} -> score {} {:?}",
                turns,
                dice,
                roll,
                tiles,
                mc.score(),
                mc.tiles()
            ),
            TileDecision::NoMove => {
                log::info!(
                    "turn {}: {} dice rolled {}, no move -> final score {}",
                    turns,
                    dice,
                    roll,
                    mc.score()
                );
                break;
            }
        }
    }

    Ok(GameOutcome {
        score: mc.score(),
        tiles: mc.tiles().to_vec(),
        turns,
        won: mc.score() == 0,
    })
}
