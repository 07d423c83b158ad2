//! Random source for piece selection
//!
//! The game only ever asks one question of randomness: "pick an index below N".
//! Keeping that behind a trait lets tests drive the piece sequence exactly.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Uniform index selection
pub trait Randomizer {
    /// Return an index in `0..n`, uniformly distributed. `n` is never zero.
    fn pick(&mut self, n: usize) -> usize;
}

/// ChaCha-backed randomizer, reproducible for a given seed
#[derive(Debug, Clone)]
pub struct SeededRandomizer {
    rng: ChaCha8Rng,
}

impl SeededRandomizer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Randomizer for SeededRandomizer {
    fn pick(&mut self, n: usize) -> usize {
        self.rng.gen_range(0..n)
    }
}

/// Replays a fixed list of indices, wrapping around at the end
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct ScriptedRandomizer {
    picks: Vec<usize>,
    pos: usize,
}

#[cfg(test)]
impl ScriptedRandomizer {
    pub fn new(picks: Vec<usize>) -> Self {
        assert!(!picks.is_empty());
        Self { picks, pos: 0 }
    }
}

#[cfg(test)]
impl Randomizer for ScriptedRandomizer {
    fn pick(&mut self, n: usize) -> usize {
        let value = self.picks[self.pos % self.picks.len()] % n;
        self.pos += 1;
        value
    }
}
