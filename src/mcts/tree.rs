//! Arena-allocated search tree.
//!
//! Nodes are stored in a contiguous vector and referenced by [`NodeId`].
//! Re-rooting copies the surviving subtree into a fresh arena, so nodes that
//! are no longer reachable from the root are dropped rather than leaked.

use crate::game::game_state::GameState;
use crate::mcts::node::{Expansion, NodeId, NodeKind, SimulationNode};
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<SimulationNode>,
}

impl Tree {
    /// Create a tree holding a single RoundStart root for `state`.
    pub fn new(state: GameState) -> Self {
        Self {
            nodes: vec![SimulationNode::new_root(state)],
        }
    }

    /// # Panics
    /// Panics if the NodeId does not belong to this tree.
    pub fn get(&self, id: NodeId) -> &SimulationNode {
        &self.nodes[id.0]
    }

    /// # Panics
    /// Panics if the NodeId does not belong to this tree.
    pub fn get_mut(&mut self, id: NodeId) -> &mut SimulationNode {
        &mut self.nodes[id.0]
    }

    pub fn root(&self) -> &SimulationNode {
        self.get(NodeId::ROOT)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Expands `id` once. Calling it again, or on a won RoundStart, does nothing.
    ///
    /// Children are appended to the arena in canonical order. A PostRoll node
    /// whose roll matches no combination is marked terminal instead.
    ///
    /// # Arguments
    /// * `id` - Node to expand; must belong to this tree
    pub fn expand(&mut self, id: NodeId) {
        if self.get(id).is_expanded() {
            return;
        }
        let Some(children) = self.get(id).build_children(id) else {
            return;
        };

        let expansion = if children.is_empty() {
            Expansion::Terminal
        } else {
            let first = self.nodes.len();
            self.nodes.extend(children);
            Expansion::Expanded((first..self.nodes.len()).map(NodeId).collect())
        };
        self.get_mut(id).expansion = expansion;
    }

    /// The PostRoll child of `id` carrying `roll`, if any.
    pub fn child_with_roll(&self, id: NodeId, roll: u8) -> Option<NodeId> {
        self.get(id)
            .children()
            .iter()
            .copied()
            .find(|&child| matches!(self.get(child).kind, NodeKind::PostRoll { roll: r } if r == roll))
    }

    /// Makes `new_root` the root and discards everything outside its subtree.
    ///
    /// Surviving nodes keep their statistics and child order; ids are reassigned
    /// breadth-first, so the new root is always [`NodeId::ROOT`].
    pub fn reroot(&mut self, new_root: NodeId) {
        if new_root == NodeId::ROOT {
            return;
        }

        let mut old: Vec<Option<SimulationNode>> =
            std::mem::take(&mut self.nodes).into_iter().map(Some).collect();
        let mut remap: Vec<Option<NodeId>> = vec![None; old.len()];

        let mut order = Vec::new();
        let mut queue = VecDeque::from([new_root]);
        while let Some(id) = queue.pop_front() {
            remap[id.0] = Some(NodeId(order.len()));
            order.push(id);
            if let Some(node) = &old[id.0] {
                queue.extend(node.children().iter().copied());
            }
        }

        let mut nodes = Vec::with_capacity(order.len());
        for id in order {
            let Some(mut node) = old[id.0].take() else {
                continue;
            };
            node.parent = if id == new_root {
                None
            } else {
                node.parent.and_then(|parent| remap[parent.0])
            };
            if let Expansion::Expanded(children) = &mut node.expansion {
                for child in children.iter_mut() {
                    if let Some(mapped) = remap[child.0] {
                        *child = mapped;
                    }
                }
            }
            nodes.push(node);
        }
        self.nodes = nodes;
    }

    /// Length of the longest child chain below `id` (0 for a leaf).
    pub fn depth(&self, id: NodeId) -> usize {
        self.get(id)
            .children()
            .iter()
            .map(|&child| self.depth(child) + 1)
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::dice::Dice;
    use crate::mcts::node::Phase;

    #[test]
    fn test_tree_creation() {
        let tree = Tree::new(GameState::new(9).unwrap());
        assert_eq!(tree.len(), 1);
        assert!(!tree.is_empty());
        assert_eq!(tree.root().phase(), Phase::RoundStart);
        assert_eq!(tree.depth(NodeId::ROOT), 0);
    }

    #[test]
    fn test_expand_is_idempotent() {
        let mut tree = Tree::new(GameState::from_tiles([1, 2, 3]).unwrap());

        tree.expand(NodeId::ROOT);
        assert_eq!(tree.len(), 3);
        let children = tree.root().children().to_vec();

        tree.expand(NodeId::ROOT);
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.root().children(), children.as_slice());
    }

    #[test]
    fn test_expand_dead_roll_marks_terminal() {
        let mut tree = Tree::new(GameState::from_tiles([8, 9]).unwrap());
        tree.expand(NodeId::ROOT);
        let pre_roll = tree.root().children()[0];
        tree.expand(pre_roll);

        let dead = tree.child_with_roll(pre_roll, 3).unwrap();
        tree.expand(dead);

        assert_eq!(tree.get(dead).expansion, Expansion::Terminal);
        assert!(tree.get(dead).is_terminal());
        assert!(!tree.get(dead).has_children());
    }

    #[test]
    fn test_won_root_is_not_expanded() {
        let mut tree = Tree::new(GameState::from_tiles(std::iter::empty()).unwrap());
        tree.expand(NodeId::ROOT);
        assert_eq!(tree.len(), 1);
        assert!(!tree.root().is_expanded());
    }

    #[test]
    fn test_reroot_keeps_only_subtree() {
        let mut tree = Tree::new(GameState::from_tiles([1, 2, 3]).unwrap());
        tree.expand(NodeId::ROOT);
        let children = tree.root().children().to_vec();
        let (two_dice, one_die) = (children[0], children[1]);
        assert_eq!(tree.get(one_die).kind, NodeKind::PreRoll { dice: Dice::One });

        tree.expand(two_dice);
        tree.expand(one_die);
        tree.get_mut(one_die).record(4);
        assert_eq!(tree.len(), 1 + 2 + 11 + 6);

        tree.reroot(one_die);

        assert_eq!(tree.len(), 1 + 6);
        assert_eq!(tree.root().kind, NodeKind::PreRoll { dice: Dice::One });
        assert_eq!(tree.root().parent, None);
        assert_eq!(tree.root().visits, 1);
        for (roll, &child) in (1..=6).zip(tree.root().children()) {
            assert_eq!(tree.get(child).kind, NodeKind::PostRoll { roll });
            assert_eq!(tree.get(child).parent, Some(NodeId::ROOT));
        }
        assert_eq!(tree.depth(NodeId::ROOT), 1);
    }
}
