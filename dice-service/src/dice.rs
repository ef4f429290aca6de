use std::ops::RangeInclusive;
use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of dice values for the game.
///
/// The service draws through a single shared implementation so tests can
/// substitute a scripted one.
pub trait Dice: Send + Sync {
    /// A single die value.
    fn roll(&self) -> u32;

    /// The total a player has to reach with two rolls.
    fn target(&self) -> u32;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiceBounds {
    pub roll: RangeInclusive<u32>,
    pub target: RangeInclusive<u32>,
}

/// Process-wide dice seeded once at startup.
pub struct SeededDice {
    bounds: DiceBounds,
    rng: Mutex<StdRng>,
}

impl SeededDice {
    pub fn new(bounds: DiceBounds, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            bounds,
            rng: Mutex::new(rng),
        }
    }

    fn draw(&self, range: &RangeInclusive<u32>) -> u32 {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.gen_range(range.clone())
    }
}

impl Dice for SeededDice {
    fn roll(&self) -> u32 {
        self.draw(&self.bounds.roll)
    }

    fn target(&self) -> u32 {
        self.draw(&self.bounds.target)
    }
}
