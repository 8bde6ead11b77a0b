//! Randomness for picking coordinates and insertion offsets
//!
//! The engine never reaches for a global RNG. Callers hand in a
//! `RandomSource`: `RngSource` wraps any `rand` generator, `FixedSequence`
//! replays a script for tests.

use rand::Rng;

pub trait RandomSource {
    /// Uniform value in `[0, bound)`. `bound` must be non-zero.
    fn below(&mut self, bound: u32) -> u32;
}

/// Adapter for any `rand::Rng`
#[derive(Debug, Clone)]
pub struct RngSource<R: Rng>(pub R);

impl RngSource<rand::rngs::ThreadRng> {
    /// Thread-local CSPRNG seeded from the OS
    pub fn thread() -> Self {
        Self(rand::thread_rng())
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn below(&mut self, bound: u32) -> u32 {
        self.0.gen_range(0..bound)
    }
}

/// Replays a fixed list of values (cycled), each reduced modulo the bound
#[derive(Debug, Clone)]
pub struct FixedSequence {
    values: Vec<u32>,
    cursor: usize,
}

impl FixedSequence {
    pub fn new(values: Vec<u32>) -> Self {
        Self { values, cursor: 0 }
    }
}

impl RandomSource for FixedSequence {
    fn below(&mut self, bound: u32) -> u32 {
        if self.values.is_empty() {
            return 0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value % bound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_fixed_sequence_cycles() {
        let mut rng = FixedSequence::new(vec![1, 7]);
        assert_eq!(rng.below(10), 1);
        assert_eq!(rng.below(5), 2);
        assert_eq!(rng.below(10), 1);
    }

    #[test]
    fn test_empty_sequence_yields_zero() {
        let mut rng = FixedSequence::new(Vec::new());
        assert_eq!(rng.below(10), 0);
    }

    #[test]
    fn test_rng_source_in_range() {
        let mut rng = RngSource(StdRng::seed_from_u64(42));
        for bound in [1u32, 4, 5, 32, 420, 3200] {
            for _ in 0..100 {
                assert!(rng.below(bound) < bound);
            }
        }
    }
}
