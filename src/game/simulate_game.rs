use crate::game::dice::Dice;
use crate::game::game_state::GameState;
use rand::prelude::IndexedRandom;
use rand::Rng;

/// Phase a random playout starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloutStart {
    /// About to choose how many dice to throw.
    RoundStart,
    /// Dice count committed, roll not yet seen.
    PreRoll(Dice),
    /// Roll known, tiles not yet chosen.
    PostRoll(u8),
}

/// Plays `state` out with uniformly random decisions and returns the final score.
///
/// Takes the state by value: the caller hands over its own copy, so a
/// playout can never touch a snapshot held by the search tree.
pub fn simulate_round<R: Rng + ?Sized>(
    mut state: GameState,
    start: RolloutStart,
    rng: &mut R,
) -> u32 {
    let mut phase = start;

    loop {
        phase = match phase {
            RolloutStart::RoundStart => {
                if state.is_won() {
                    return 0;
                }
                RolloutStart::PreRoll(choose_dice(&state, rng))
            }
            RolloutStart::PreRoll(dice) => RolloutStart::PostRoll(dice.roll(rng)),
            RolloutStart::PostRoll(roll) => {
                let combinations = state.valid_combinations(roll);
                let Some(combination) = combinations.choose(rng) else {
                    return state.score();
                };
                // enumerated from this very state, so every tile is open
                if let Err(e) = state.apply_combination(combination) {
                    log::warn!("Rollout stopped on combination {:?}: {}", combination, e);
                    return state.score();
                }
                RolloutStart::RoundStart
            }
        };
    }
}

/// Uniformly random legal dice count for `state`.
fn choose_dice<R: Rng + ?Sized>(state: &GameState, rng: &mut R) -> Dice {
    let legal = Dice::legal_for(state);
    legal[rng.random_range(0..legal.len())]
}
