pub mod dice;
pub mod game_state;
pub mod get_valid_combinations;
pub mod simulate_game;
