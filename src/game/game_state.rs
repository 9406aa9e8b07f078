use crate::game::dice::Dice;
use crate::game::get_valid_combinations::get_valid_combinations;
use crate::{Result, ShutTheBoxError};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A numbered tile in the box.
pub type Tile = u8;

/// Largest box the engine accepts (classic boxes ship with 9, 10 or 12 tiles).
pub const MAX_TILES: u8 = 12;

/// Tiles still open in the box. Tiles are kept sorted ascending and unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameState {
    tiles: Vec<Tile>,
}

impl GameState {
    /// Creates a fresh box holding tiles `1..=num_tiles`.
    pub fn new(num_tiles: u8) -> Result<Self> {
        if num_tiles == 0 || num_tiles > MAX_TILES {
            return Err(ShutTheBoxError::InvalidConfig(format!(
                "num_tiles must be between 1 and {} (received {})",
                MAX_TILES, num_tiles
            )));
        }
        Ok(Self {
            tiles: (1..=num_tiles).collect(),
        })
    }

    /// Builds a state from an arbitrary set of open tiles.
    pub fn from_tiles<I>(tiles: I) -> Result<Self>
    where
        I: IntoIterator<Item = Tile>,
    {
        let mut tiles: Vec<Tile> = tiles.into_iter().collect();
        if tiles.contains(&0) {
            return Err(ShutTheBoxError::InvalidMove {
                tiles: vec![0],
                remaining: Vec::new(),
            });
        }
        tiles.sort_unstable();
        tiles.dedup();
        Ok(Self { tiles })
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Sum of the open tiles. Lower is better, 0 means the box is shut.
    pub fn score(&self) -> u32 {
        self.tiles.iter().map(|&tile| u32::from(tile)).sum()
    }

    pub fn is_won(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Highest open tile, `None` once the box is shut.
    pub fn max_tile_remaining(&self) -> Option<Tile> {
        self.tiles.last().copied()
    }

    pub fn roll_dice<R: Rng + ?Sized>(&self, dice: Dice, rng: &mut R) -> u8 {
        dice.roll(rng)
    }

    /// Every subset of the open tiles summing exactly to `roll`.
    pub fn valid_combinations(&self, roll: u8) -> Vec<Vec<Tile>> {
        get_valid_combinations(&self.tiles, roll)
    }

    /// Shuts the given tiles. Nothing is removed unless every tile is open.
    pub fn apply_combination(&mut self, combination: &[Tile]) -> Result<()> {
        let mut requested = combination.to_vec();
        requested.sort_unstable();
        let has_duplicates = requested.windows(2).any(|pair| pair[0] == pair[1]);

        if has_duplicates || !requested.iter().all(|tile| self.tiles.contains(tile)) {
            return Err(ShutTheBoxError::InvalidMove {
                tiles: combination.to_vec(),
                remaining: self.tiles.clone(),
            });
        }

        self.tiles.retain(|tile| !requested.contains(tile));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_new_box_has_all_tiles() {
        let state = GameState::new(9).unwrap();
        assert_eq!(state.tiles(), &[1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(state.score(), 45);
        assert_eq!(state.max_tile_remaining(), Some(9));
        assert!(!state.is_won());
    }

    #[test]
    fn test_new_box_rejects_bad_sizes() {
        assert_matches!(GameState::new(0), Err(ShutTheBoxError::InvalidConfig(_)));
        assert_matches!(GameState::new(13), Err(ShutTheBoxError::InvalidConfig(_)));
        assert!(GameState::new(12).is_ok());
    }

    #[test]
    fn test_from_tiles_sorts_and_dedups() {
        let state = GameState::from_tiles([9, 7, 8, 7]).unwrap();
        assert_eq!(state.tiles(), &[7, 8, 9]);
        assert_matches!(
            GameState::from_tiles([0, 3]),
            Err(ShutTheBoxError::InvalidMove { .. })
        );
    }

    #[test]
    fn test_empty_box_is_won() {
        let state = GameState::from_tiles(std::iter::empty()).unwrap();
        assert_eq!(state.score(), 0);
        assert!(state.is_won());
        assert_eq!(state.max_tile_remaining(), None);
    }

    #[test]
    fn test_apply_combination_removes_tiles() {
        let mut state = GameState::new(9).unwrap();
        state.apply_combination(&[4, 3]).unwrap();
        assert_eq!(state.tiles(), &[1, 2, 5, 6, 7, 8, 9]);
        assert_eq!(state.score(), 38);
    }

    #[test]
    fn test_apply_combination_is_all_or_nothing() {
        let mut state = GameState::from_tiles([1, 2, 5]).unwrap();

        let missing = state.apply_combination(&[1, 3]);
        assert_matches!(missing, Err(ShutTheBoxError::InvalidMove { .. }));
        assert_eq!(state.tiles(), &[1, 2, 5]);

        let duplicated = state.apply_combination(&[5, 5]);
        assert_matches!(duplicated, Err(ShutTheBoxError::InvalidMove { .. }));
        assert_eq!(state.tiles(), &[1, 2, 5]);
    }

    #[test]
    fn test_clone_does_not_alias() {
        let original = GameState::new(9).unwrap();
        let mut copy = original.clone();
        copy.apply_combination(&[1, 6]).unwrap();

        assert_eq!(original.tiles(), &[1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(copy.tiles(), &[2, 3, 4, 5, 7, 8, 9]);
    }
}
