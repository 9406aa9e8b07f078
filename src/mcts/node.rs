//! Node records for the three-phase Shut the Box search tree
//!
//! A turn is modelled as three consecutive node phases:
//! - RoundStart: decision, how many dice to throw
//! - PreRoll: chance, the dice are committed but not yet thrown
//! - PostRoll: decision, which tiles to shut for the roll
//!
//! Nodes live in the [`Tree`](crate::mcts::tree::Tree) arena and refer to each
//! other by [`NodeId`], so the parent link is a plain index and never owns anything.

use crate::game::dice::Dice;
use crate::game::game_state::{GameState, Tile};
use serde::{Deserialize, Serialize};

/// Index of a node inside its tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

/// Phase tag of a node, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    RoundStart,
    PreRoll,
    PostRoll,
}

/// Phase of a node together with the data that phase carries.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Start of a turn. `removed` holds the tiles shut to get here.
    RoundStart { removed: Vec<Tile> },
    /// Dice count committed, roll outcome unknown.
    PreRoll { dice: Dice },
    /// Roll outcome known, tiles still to be chosen.
    PostRoll { roll: u8 },
}

/// Expansion status of a node.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Expansion {
    #[default]
    NotExpanded,
    /// Expanded and no move exists: the game ends on this line.
    Terminal,
    Expanded(Vec<NodeId>),
}

/// A node in the search tree
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationNode {
    /// Exclusive snapshot of the game at this node
    pub state: GameState,

    /// Parent index, `None` for the current root
    pub parent: Option<NodeId>,

    pub kind: NodeKind,

    pub expansion: Expansion,

    /// Number of rollouts folded into `average`
    pub visits: u32,

    /// Running mean of the terminal scores seen through this node
    pub average: f64,

    /// Score of the tree's original root, used to normalise exploitation
    pub max_score: f64,
}

impl SimulationNode {
    /// Creates the root of a fresh tree; its score becomes the tree's `max_score`.
    pub fn new_root(state: GameState) -> Self {
        let max_score = f64::from(state.score());
        Self::new(state, None, NodeKind::RoundStart { removed: Vec::new() }, max_score)
    }

    fn new(state: GameState, parent: Option<NodeId>, kind: NodeKind, max_score: f64) -> Self {
        Self {
            state,
            parent,
            kind,
            expansion: Expansion::NotExpanded,
            visits: 0,
            average: 0.0,
            max_score,
        }
    }

    pub fn phase(&self) -> Phase {
        match self.kind {
            NodeKind::RoundStart { .. } => Phase::RoundStart,
            NodeKind::PreRoll { .. } => Phase::PreRoll,
            NodeKind::PostRoll { .. } => Phase::PostRoll,
        }
    }

    pub fn children(&self) -> &[NodeId] {
        match &self.expansion {
            Expansion::Expanded(children) => children,
            Expansion::NotExpanded | Expansion::Terminal => &[],
        }
    }

    pub fn has_children(&self) -> bool {
        !self.children().is_empty()
    }

    pub fn is_expanded(&self) -> bool {
        !matches!(self.expansion, Expansion::NotExpanded)
    }

    /// True for a shut box or a roll that leaves no valid move.
    pub fn is_terminal(&self) -> bool {
        match self.kind {
            NodeKind::RoundStart { .. } => self.state.is_won(),
            _ => matches!(self.expansion, Expansion::Terminal),
        }
    }

    /// Folds one rollout score into the running mean.
    pub fn record(&mut self, score: u32) {
        let games = f64::from(self.visits);
        self.average = (self.average * games + f64::from(score)) / (games + 1.0);
        self.visits += 1;
    }

    /// Builds this node's children, in canonical order, with `own_id` as their parent.
    ///
    /// Returns `None` for a won RoundStart, which is never expanded.
    pub fn build_children(&self, own_id: NodeId) -> Option<Vec<SimulationNode>> {
        let parent = Some(own_id);
        match &self.kind {
            NodeKind::RoundStart { .. } => {
                if self.state.is_won() {
                    return None;
                }
                let children = Dice::legal_for(&self.state)
                    .iter()
                    .map(|&dice| {
                        Self::new(
                            self.state.clone(),
                            parent,
                            NodeKind::PreRoll { dice },
                            self.max_score,
                        )
                    })
                    .collect();
                Some(children)
            }
            NodeKind::PreRoll { dice } => {
                let children = dice
                    .roll_range()
                    .map(|roll| {
                        Self::new(
                            self.state.clone(),
                            parent,
                            NodeKind::PostRoll { roll },
                            self.max_score,
                        )
                    })
                    .collect();
                Some(children)
            }
            NodeKind::PostRoll { roll } => {
                let children = self
                    .state
                    .valid_combinations(*roll)
                    .into_iter()
                    .filter_map(|combination| {
                        let mut next = self.state.clone();
                        match next.apply_combination(&combination) {
                            Ok(()) => Some(Self::new(
                                next,
                                parent,
                                NodeKind::RoundStart {
                                    removed: combination,
                                },
                                self.max_score,
                            )),
                            Err(e) => {
                                log::warn!("Skipping combination {:?}: {}", combination, e);
                                None
                            }
                        }
                    })
                    .collect();
                Some(children)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_box() -> GameState {
        GameState::new(9).unwrap()
    }

    #[test]
    fn test_new_root() {
        let node = SimulationNode::new_root(full_box());

        assert_eq!(node.phase(), Phase::RoundStart);
        assert_eq!(node.parent, None);
        assert_eq!(node.visits, 0);
        assert_eq!(node.max_score, 45.0);
        assert!(!node.is_expanded());
        assert!(!node.has_children());
        assert!(!node.is_terminal());
    }

    #[test]
    fn test_record_keeps_running_mean() {
        let mut node = SimulationNode::new_root(full_box());

        node.record(10);
        node.record(20);
        node.record(0);

        assert_eq!(node.visits, 3);
        assert!((node.average - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_round_start_children_follow_legal_dice() {
        let node = SimulationNode::new_root(GameState::from_tiles([7, 8, 9]).unwrap());
        let children = node.build_children(NodeId::ROOT).unwrap();

        assert_eq!(children.len(), 1);
        assert_eq!(children[0].kind, NodeKind::PreRoll { dice: Dice::Two });
        assert_eq!(children[0].parent, Some(NodeId::ROOT));
        assert_eq!(children[0].max_score, 24.0);

        let low = SimulationNode::new_root(GameState::from_tiles([1, 2, 6]).unwrap());
        let dice: Vec<NodeKind> = low
            .build_children(NodeId::ROOT)
            .unwrap()
            .into_iter()
            .map(|child| child.kind)
            .collect();
        assert_eq!(
            dice,
            vec![
                NodeKind::PreRoll { dice: Dice::Two },
                NodeKind::PreRoll { dice: Dice::One },
            ]
        );
    }

    #[test]
    fn test_won_round_start_is_never_expanded() {
        let node = SimulationNode::new_root(GameState::from_tiles(std::iter::empty()).unwrap());
        assert!(node.is_terminal());
        assert!(node.build_children(NodeId::ROOT).is_none());
    }

    #[test]
    fn test_pre_roll_children_cover_roll_range() {
        let root = SimulationNode::new_root(full_box());
        let pre_roll = SimulationNode::new(
            full_box(),
            Some(NodeId::ROOT),
            NodeKind::PreRoll { dice: Dice::One },
            root.max_score,
        );

        let rolls: Vec<NodeKind> = pre_roll
            .build_children(NodeId(1))
            .unwrap()
            .into_iter()
            .map(|child| child.kind)
            .collect();
        let expected: Vec<NodeKind> = (1..=6).map(|roll| NodeKind::PostRoll { roll }).collect();
        assert_eq!(rolls, expected);
    }

    #[test]
    fn test_post_roll_children_apply_each_combination() {
        let post_roll = SimulationNode::new(
            full_box(),
            Some(NodeId(1)),
            NodeKind::PostRoll { roll: 7 },
            45.0,
        );
        let children = post_roll.build_children(NodeId(2)).unwrap();

        assert_eq!(children.len(), 5);
        for child in &children {
            let NodeKind::RoundStart { removed } = &child.kind else {
                panic!("post-roll child must be a round start");
            };
            assert_eq!(child.state.score(), 45 - 7);
            assert!(removed.iter().all(|tile| !child.state.tiles().contains(tile)));
        }
        assert_eq!(post_roll.state.score(), 45);
    }

    #[test]
    fn test_post_roll_without_move_has_no_children() {
        let post_roll = SimulationNode::new(
            GameState::from_tiles([9]).unwrap(),
            None,
            NodeKind::PostRoll { roll: 2 },
            9.0,
        );
        assert_eq!(post_roll.build_children(NodeId::ROOT), Some(Vec::new()));
    }
}
