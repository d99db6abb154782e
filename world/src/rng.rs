//! Seeded generator driving spawn placement, hazard placement and wandering.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Reproducible pseudo-random sequence.
///
/// The same seed followed by the same call sequence always yields the same
/// values.
#[derive(Clone, Debug)]
pub struct SimRng {
    seed: u64,
    inner: ChaCha8Rng,
}

impl SimRng {
    /// Creates a generator positioned at the start of the sequence for `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Restarts the sequence from the provided seed.
    pub fn seed(&mut self, value: u64) {
        *self = Self::new(value);
    }

    /// Seed the current sequence started from.
    #[must_use]
    pub const fn current_seed(&self) -> u64 {
        self.seed
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    /// Next integer in `[min, max]`, both inclusive.
    ///
    /// # Panics
    ///
    /// Panics when `min > max`.
    pub fn next_int(&mut self, min: u32, max: u32) -> u32 {
        assert!(min <= max, "empty range {min}..={max}");
        let span = f64::from(max - min) + 1.0;
        let offset = (self.next_f64() * span).floor() as u32;
        min + offset.min(max - min)
    }
}
