//! Property checks for the Shut the Box search controller.

use assert_matches::assert_matches;
use rand::rngs::StdRng;
use rand::SeedableRng;
use shut_the_box::mcts::node::{NodeId, NodeKind};
use shut_the_box::mcts::tree::Tree;
use shut_the_box::{Dice, GameState, MonteCarlo, Phase, ShutTheBoxError, TileDecision};

fn seeded(state: GameState, seed: u64) -> MonteCarlo {
    MonteCarlo::with_rng(state, 10_000, StdRng::seed_from_u64(seed))
}

fn for_each_node(tree: &Tree, mut f: impl FnMut(NodeId)) {
    for index in 0..tree.len() {
        f(NodeId(index));
    }
}

#[test]
fn test_averages_stay_within_bounds() {
    let mut mc = seeded(GameState::new(9).unwrap(), 100);
    mc.simulate(1500, 1.0);

    let tree = mc.tree();
    for_each_node(tree, |id| {
        let node = tree.get(id);
        if node.visits > 0 {
            assert!(node.average >= 0.0, "negative average at {:?}", id);
            assert!(node.average <= node.max_score, "average above max at {:?}", id);
        }
    });
}

#[test]
fn test_visits_match_completed_rounds() {
    let mut mc = seeded(GameState::new(9).unwrap(), 7);
    let summary = mc.simulate(1000, 1.0);

    assert_eq!(summary.completed + summary.skipped, 1000);
    assert_eq!(mc.root_visits() as usize, summary.completed);

    let more = mc.simulate(250, 1.0);
    assert_eq!(mc.root_visits() as usize, summary.completed + more.completed);
}

#[test]
fn test_parent_visits_cover_children() {
    let mut mc = seeded(GameState::new(10).unwrap(), 3);
    mc.simulate(800, 1.2);

    let tree = mc.tree();
    for_each_node(tree, |id| {
        let node = tree.get(id);
        let below: u32 = node.children().iter().map(|&c| tree.get(c).visits).sum();
        assert!(below <= node.visits);
        for &child in node.children() {
            assert_eq!(tree.get(child).parent, Some(id));
        }
    });
}

#[test]
fn test_tree_snapshots_are_not_corrupted_by_rollouts() {
    let mut mc = seeded(GameState::new(9).unwrap(), 55);
    mc.simulate(600, 1.0);

    let tree = mc.tree();
    for_each_node(tree, |id| {
        let node = tree.get(id);
        match (&node.kind, node.parent) {
            (NodeKind::RoundStart { removed }, Some(parent)) => {
                let before = tree.get(parent).state.score();
                let shut: u32 = removed.iter().map(|&t| u32::from(t)).sum();
                assert_eq!(node.state.score() + shut, before);
            }
            (_, Some(parent)) => assert_eq!(node.state, tree.get(parent).state),
            (_, None) => assert_eq!(node.state, GameState::new(9).unwrap()),
        }
    });
}

#[test]
fn test_seven_eight_nine_forces_two_dice() {
    let mut mc = seeded(GameState::from_tiles([7, 8, 9]).unwrap(), 12);
    assert_eq!(mc.state().max_tile_remaining(), Some(9));
    mc.simulate(300, 1.0);

    let tree = mc.tree();
    for_each_node(tree, |id| {
        let node = tree.get(id);
        if node.state.max_tile_remaining().is_some_and(|tile| tile > 6) {
            if let NodeKind::PreRoll { dice } = node.kind {
                assert_eq!(dice, Dice::Two);
            }
        }
    });
    assert_eq!(mc.roll_decision().unwrap(), Dice::Two);
}

#[test]
fn test_full_turn_sequence() {
    let mut mc = seeded(GameState::new(9).unwrap(), 77);
    let mut rng = StdRng::seed_from_u64(77);

    let mut turns = 0;
    loop {
        mc.simulate(300, 1.0);
        assert_matches!(
            mc.tile_decision(7),
            Err(ShutTheBoxError::WrongPhase { .. })
        );
        let dice = mc.roll_decision().unwrap();
        let score_before = mc.score();
        let roll = dice.roll(&mut rng);

        match mc.tile_decision(roll).unwrap() {
            TileDecision::Shut(tiles) => {
                let shut: u32 = tiles.iter().map(|&t| u32::from(t)).sum();
                assert_eq!(shut, u32::from(roll));
                assert_eq!(mc.score(), score_before - shut);
            }
            TileDecision::NoMove => {
                assert_eq!(mc.root_phase(), Phase::PostRoll);
                assert_eq!(mc.score(), score_before);
                break;
            }
        }
        turns += 1;
        if mc.score() == 0 {
            assert_matches!(mc.roll_decision(), Err(ShutTheBoxError::GameOver { .. }));
            break;
        }
        assert!(turns < 20);
    }
}
