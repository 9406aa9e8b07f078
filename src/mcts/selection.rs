//! Selection and backpropagation for the three-phase search tree
//!
//! - RoundStart / PostRoll nodes (decisions): UCB1 variant over the children
//! - PreRoll nodes (chance): follow the dice that are actually thrown
//!
//! Lower scores are better in Shut the Box, so the exploitation term is
//! `(max_score - average) / max_score`: it grows as fewer tiles stay open.

use crate::mcts::node::{NodeId, NodeKind, Phase, SimulationNode};
use crate::mcts::tree::Tree;
use rand::Rng;

/// Exploration value of `node` under a parent visited `parent_visits` times.
///
/// Formula: (max - avg) / max + c × sqrt(ln(N_parent) / N_child)
///
/// Unvisited nodes score +inf so they are always tried before any visited sibling.
pub fn exploration_value(node: &SimulationNode, parent_visits: u32, c: f64) -> f64 {
    if node.visits == 0 {
        return f64::INFINITY;
    }
    let exploitation = (node.max_score - node.average) / node.max_score;
    let exploration = (f64::from(parent_visits).ln() / f64::from(node.visits)).sqrt();
    exploitation + c * exploration
}

/// Child of a decision node with the highest exploration value.
///
/// Ties go to the first child in canonical order.
pub fn select_decision_child(tree: &Tree, id: NodeId, c: f64) -> Option<NodeId> {
    let parent_visits = tree.get(id).visits;
    let mut best: Option<(NodeId, f64)> = None;

    for &child in tree.get(id).children() {
        let value = exploration_value(tree.get(child), parent_visits, c);
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((child, value)),
        }
    }

    best.map(|(child, _)| child)
}

/// Child of a chance node matching a freshly thrown roll.
pub fn select_chance_child<R: Rng + ?Sized>(tree: &Tree, id: NodeId, rng: &mut R) -> Option<NodeId> {
    match tree.get(id).kind {
        NodeKind::PreRoll { dice } => tree.child_with_roll(id, dice.roll(rng)),
        _ => None,
    }
}

/// Applies the node's own selection rule once.
///
/// A PostRoll node is expanded on demand; one that turns out to have no move
/// (or any other childless node) selects itself.
pub fn choose_child<R: Rng + ?Sized>(tree: &mut Tree, id: NodeId, c: f64, rng: &mut R) -> NodeId {
    let selected = match tree.get(id).phase() {
        Phase::RoundStart => select_decision_child(tree, id, c),
        Phase::PreRoll => select_chance_child(tree, id, rng),
        Phase::PostRoll => {
            tree.expand(id);
            select_decision_child(tree, id, c)
        }
    };
    selected.unwrap_or(id)
}

/// Visited child with the lowest running average; ties go to the first one.
///
/// `None` when no child has been visited yet.
pub fn select_lowest_average(tree: &Tree, id: NodeId) -> Option<NodeId> {
    let mut best: Option<(NodeId, f64)> = None;

    for &child in tree.get(id).children() {
        let node = tree.get(child);
        if node.visits == 0 {
            continue;
        }
        match best {
            Some((_, best_average)) if node.average >= best_average => {}
            _ => best = Some((child, node.average)),
        }
    }

    best.map(|(child, _)| child)
}

/// Folds `score` into `from` and every ancestor up to the root.
pub fn backpropagate(tree: &mut Tree, from: NodeId, score: u32) {
    let mut current = Some(from);
    while let Some(id) = current {
        let node = tree.get_mut(id);
        node.record(score);
        current = node.parent;
    }
}
