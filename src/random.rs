//! Injectable randomness for tie-breaks.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait RandomSource {
    /// Uniform index in `0..len`. `len` is never 0.
    fn next_index(&mut self, len: usize) -> usize;
}

/// `StdRng`-backed source. Reproducible when built with `seeded`.
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn seeded(seed: u64) -> Self {
        SeededRandom {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        SeededRandom {
            rng: StdRng::from_entropy(),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len.max(1))
    }
}

/// Always takes the first option. Useful where a test wants the deterministic
/// ordering to show through.
#[derive(Default)]
pub struct FirstChoice;

impl RandomSource for FirstChoice {
    fn next_index(&mut self, _len: usize) -> usize {
        0
    }
}

/// Pick one element uniformly, or `None` from an empty slice.
pub fn choose<T: Copy>(source: &mut dyn RandomSource, items: &[T]) -> Option<T> {
    if items.is_empty() {
        return None;
    }
    let index = source.next_index(items.len()).min(items.len() - 1);
    items.get(index).copied()
}
