//! Monte Carlo Tree Search controller for Shut the Box.
//!
//! [`MonteCarlo`] owns the search tree whose root is the real game position.
//! [`MonteCarlo::simulate`] grows the tree with selection, expansion, rollout
//! and backpropagation; [`MonteCarlo::roll_decision`] and
//! [`MonteCarlo::tile_decision`] commit real moves and advance the root into
//! the subtree that was already searched, dropping every sibling line.
//! The `commit_*` methods follow moves chosen outside the search the same way.
use crate::game::dice::Dice;
use crate::game::game_state::{GameState, Tile};
use crate::game::simulate_game::{simulate_round, RolloutStart};
use crate::mcts::hyperparameters::MCTSHyperparameters;
use crate::mcts::mcts_result::{SimulationSummary, TileDecision};
use crate::mcts::node::{NodeId, NodeKind, Phase, SimulationNode};
use crate::mcts::selection::{backpropagate, choose_child, select_lowest_average};
use crate::mcts::tree::Tree;
use crate::{Result, ShutTheBoxError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Search controller holding the current real position as the tree root.
#[derive(Debug)]
pub struct MonteCarlo {
    tree: Tree,
    max_simulations: usize,
    rng: StdRng,
}

impl MonteCarlo {
    /// Starts a search at `state`. `max_simulations` is only a default budget
    /// for callers; [`simulate`](Self::simulate) runs whatever it is asked to.
    pub fn new(state: GameState, max_simulations: usize) -> Self {
        Self::with_rng(state, max_simulations, StdRng::from_rng(&mut rand::rng()))
    }

    /// Starts a search seeded from `hyperparams.seed` when present.
    pub fn with_hyperparameters(state: GameState, hyperparams: &MCTSHyperparameters) -> Self {
        let rng = match hyperparams.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        Self::with_rng(state, hyperparams.max_simulations, rng)
    }

    pub fn with_rng(state: GameState, max_simulations: usize, rng: StdRng) -> Self {
        Self {
            tree: Tree::new(state),
            max_simulations,
            rng,
        }
    }

    /// Runs search iterations from the current root.
    ///
    /// Each iteration descends to a leaf, expands it, plays one random rollout
    /// from the chosen child and backpropagates the final score to the root.
    ///
    /// # Arguments
    /// * `rounds` - Number of iterations to attempt
    /// * `c` - Exploration constant used at decision nodes
    ///
    /// # Returns
    /// How many iterations backpropagated a score and how many reached a shut
    /// box and were skipped
    pub fn simulate(&mut self, rounds: usize, c: f64) -> SimulationSummary {
        let mut summary = SimulationSummary::default();

        for _ in 0..rounds {
            let mut current = NodeId::ROOT;
            while self.tree.get(current).has_children() {
                current = choose_child(&mut self.tree, current, c, &mut self.rng);
            }

            // a shut box has nothing left to learn
            if self.tree.get(current).state.is_won() {
                summary.skipped += 1;
                continue;
            }

            self.tree.expand(current);
            let child = choose_child(&mut self.tree, current, c, &mut self.rng);
            let score = self.rollout(child);
            backpropagate(&mut self.tree, child, score);
            summary.completed += 1;
        }

        log::debug!(
            "simulate: {} rounds (c={:.4}) -> {} completed, {} skipped, root {} visits, avg {:.3}, {} nodes",
            rounds,
            c,
            summary.completed,
            summary.skipped,
            self.root().visits,
            self.root().average,
            self.tree.len()
        );
        summary
    }

    /// Random playout from a copy of `id`'s snapshot.
    fn rollout(&mut self, id: NodeId) -> u32 {
        let node = self.tree.get(id);
        let start = match node.kind {
            NodeKind::RoundStart { .. } => RolloutStart::RoundStart,
            NodeKind::PreRoll { dice } => RolloutStart::PreRoll(dice),
            NodeKind::PostRoll { roll } => RolloutStart::PostRoll(roll),
        };
        simulate_round(node.state.clone(), start, &mut self.rng)
    }

    /// Commits the dice count with the lowest average score and returns it.
    ///
    /// # Returns
    /// The committed dice count; the root becomes the matching PreRoll node
    ///
    /// # Errors
    /// `WrongPhase` unless the root is a RoundStart node, `GameOver` if the box
    /// is already shut. The tree is untouched on error.
    pub fn roll_decision(&mut self) -> Result<Dice> {
        self.expect_phase(Phase::RoundStart)?;
        if self.root().state.is_won() {
            return Err(ShutTheBoxError::GameOver { score: 0 });
        }

        self.tree.expand(NodeId::ROOT);
        let choice = select_lowest_average(&self.tree, NodeId::ROOT)
            .or_else(|| self.root().children().first().copied())
            .ok_or(ShutTheBoxError::GameOver {
                score: self.score(),
            })?;

        let NodeKind::PreRoll { dice } = self.tree.get(choice).kind else {
            return Err(ShutTheBoxError::WrongPhase {
                expected: Phase::PreRoll,
                found: self.tree.get(choice).phase(),
            });
        };
        let (visits, average) = (self.tree.get(choice).visits, self.tree.get(choice).average);

        self.tree.reroot(choice);
        log::info!(
            "roll decision: {} dice (avg {:.3} over {} rollouts), score {}",
            dice,
            average,
            visits,
            self.score()
        );
        Ok(dice)
    }

    /// Follows the real `roll` and commits the tile combination with the lowest
    /// average score.
    ///
    /// Without statistics for this roll, a random valid combination is played.
    ///
    /// # Arguments
    /// * `roll` - Total shown by the dice committed at the root
    ///
    /// # Returns
    /// The tiles shut, or [`TileDecision::NoMove`] when the roll leaves no valid
    /// combination. In that case the root stays on the dead PostRoll node.
    ///
    /// # Errors
    /// `WrongPhase` unless the root is a PreRoll node, `InvalidDiceRoll` if the
    /// committed dice cannot show `roll`.
    pub fn tile_decision(&mut self, roll: u8) -> Result<TileDecision> {
        self.commit_roll(roll)?;

        self.tree.expand(NodeId::ROOT);
        if self.root().is_terminal() {
            log::info!("tile decision: roll {} leaves no move, final score {}", roll, self.score());
            return Ok(TileDecision::NoMove);
        }

        let choice = match select_lowest_average(&self.tree, NodeId::ROOT) {
            Some(child) => child,
            None => {
                let children = self.tree.root().children();
                log::debug!("tile decision: no statistics for roll {}, playing at random", roll);
                children[self.rng.random_range(0..children.len())]
            }
        };

        let NodeKind::RoundStart { removed } = &self.tree.get(choice).kind else {
            return Err(ShutTheBoxError::WrongPhase {
                expected: Phase::RoundStart,
                found: self.tree.get(choice).phase(),
            });
        };
        let removed = removed.clone();

        self.tree.reroot(choice);
        log::info!("tile decision: roll {} shuts {:?}, score {}", roll, removed, self.score());
        Ok(TileDecision::Shut(removed))
    }

    // ========== Following moves made outside the search ==========

    /// Advances the root into the PreRoll child for `dice`, whoever chose it.
    pub fn commit_dice(&mut self, dice: Dice) -> Result<()> {
        self.expect_phase(Phase::RoundStart)?;
        if self.root().state.is_won() {
            return Err(ShutTheBoxError::GameOver { score: 0 });
        }

        self.tree.expand(NodeId::ROOT);
        let child = self
            .root()
            .children()
            .iter()
            .copied()
            .find(|&id| self.tree.get(id).kind == NodeKind::PreRoll { dice })
            .ok_or(ShutTheBoxError::IllegalDice {
                dice: dice.count(),
                max_tile: self.state().max_tile_remaining().unwrap_or(0),
            })?;

        self.tree.reroot(child);
        log::debug!("followed dice choice: {}", dice);
        Ok(())
    }

    /// Advances the root from PreRoll into the PostRoll child for `roll`.
    ///
    /// Fails with `WrongPhase` unless the root is a PreRoll node and with
    /// `InvalidDiceRoll` if the committed dice cannot show `roll`.
    pub fn commit_roll(&mut self, roll: u8) -> Result<()> {
        self.expect_phase(Phase::PreRoll)?;
        let NodeKind::PreRoll { dice } = self.root().kind else {
            return Err(ShutTheBoxError::WrongPhase {
                expected: Phase::PreRoll,
                found: self.root().phase(),
            });
        };
        dice.validate_roll(roll)?;

        self.tree.expand(NodeId::ROOT);
        let post_roll = self
            .tree
            .child_with_roll(NodeId::ROOT, roll)
            .ok_or(ShutTheBoxError::InvalidDiceRoll {
                dice: dice.count(),
                value: roll,
            })?;
        self.tree.reroot(post_roll);
        Ok(())
    }

    /// Advances the root from PostRoll into the RoundStart child reached by
    /// shutting `tiles`, in any order.
    ///
    /// Fails with `WrongPhase` unless the root is a PostRoll node and with
    /// `InvalidMove` if `tiles` is not a valid combination for the roll.
    pub fn commit_tiles(&mut self, tiles: &[Tile]) -> Result<()> {
        self.expect_phase(Phase::PostRoll)?;

        let mut wanted = tiles.to_vec();
        wanted.sort_unstable();

        self.tree.expand(NodeId::ROOT);
        let child = self.root().children().iter().copied().find(|&id| {
            matches!(&self.tree.get(id).kind, NodeKind::RoundStart { removed } if {
                let mut removed = removed.clone();
                removed.sort_unstable();
                removed == wanted
            })
        });
        let Some(child) = child else {
            return Err(ShutTheBoxError::InvalidMove {
                tiles: tiles.to_vec(),
                remaining: self.tiles().to_vec(),
            });
        };

        self.tree.reroot(child);
        log::debug!("followed tile choice: {:?}, score {}", tiles, self.score());
        Ok(())
    }

    fn expect_phase(&self, expected: Phase) -> Result<()> {
        let found = self.root().phase();
        if found == expected {
            Ok(())
        } else {
            Err(ShutTheBoxError::WrongPhase { expected, found })
        }
    }

    fn root(&self) -> &SimulationNode {
        self.tree.root()
    }

    // ========== Read-only accessors ==========

    pub fn state(&self) -> &GameState {
        &self.root().state
    }

    pub fn score(&self) -> u32 {
        self.state().score()
    }

    pub fn tiles(&self) -> &[Tile] {
        self.state().tiles()
    }

    pub fn root_phase(&self) -> Phase {
        self.root().phase()
    }

    pub fn root_visits(&self) -> u32 {
        self.root().visits
    }

    /// Running average at the root, `None` before the first rollout.
    pub fn root_average(&self) -> Option<f64> {
        (self.root().visits > 0).then_some(self.root().average)
    }

    pub fn max_simulations(&self) -> usize {
        self.max_simulations
    }

    /// Number of nodes reachable from the root.
    pub fn tree_size(&self) -> usize {
        self.tree.len()
    }

    pub fn tree_depth(&self) -> usize {
        self.tree.depth(NodeId::ROOT)
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }
}
