use crate::game::game_state::GameState;
use crate::{Result, ShutTheBoxError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// Number of dice thrown in a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dice {
    One,
    Two,
}

impl Dice {
    pub fn count(self) -> u8 {
        match self {
            Dice::One => 1,
            Dice::Two => 2,
        }
    }

    /// Every total the dice can show.
    pub fn roll_range(self) -> RangeInclusive<u8> {
        self.count()..=6 * self.count()
    }

    /// Sum of `count()` independent uniform 1..=6 draws.
    pub fn roll<R: Rng + ?Sized>(self, rng: &mut R) -> u8 {
        (0..self.count()).map(|_| rng.random_range(1..=6u8)).sum()
    }

    pub fn validate_roll(self, value: u8) -> Result<()> {
        if self.roll_range().contains(&value) {
            Ok(())
        } else {
            Err(ShutTheBoxError::InvalidDiceRoll {
                dice: self.count(),
                value,
            })
        }
    }

    /// Dice counts a player may choose from, two dice first.
    ///
    /// A single die is only allowed once every tile above 6 is shut.
    pub fn legal_for(state: &GameState) -> &'static [Dice] {
        match state.max_tile_remaining() {
            Some(max_tile) if max_tile > 6 => &[Dice::Two],
            _ => &[Dice::Two, Dice::One],
        }
    }
}

impl TryFrom<u8> for Dice {
    type Error = ShutTheBoxError;

    fn try_from(count: u8) -> Result<Self> {
        match count {
            1 => Ok(Dice::One),
            2 => Ok(Dice::Two),
            _ => Err(ShutTheBoxError::InvalidDiceRoll {
                dice: count,
                value: 0,
            }),
        }
    }
}

impl fmt::Display for Dice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.count())
    }
}

/// Probability of rolling exactly `value` with `dice_rolled` dice.
pub fn roll_probability(dice_rolled: u8, value: u8) -> Result<f64> {
    let dice = Dice::try_from(dice_rolled)?;
    dice.validate_roll(value)?;

    let probability = match dice {
        Dice::One => 1.0 / 6.0,
        Dice::Two => (6.0 - (f64::from(value) - 7.0).abs()) / 36.0,
    };
    Ok(probability)
}
