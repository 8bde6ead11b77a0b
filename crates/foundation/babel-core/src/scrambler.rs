//! Reversible Scrambler
//!
//! A full-period linear congruential map over `Z_M` with `M = 2^15565`:
//!
//! ```text
//! scramble(n)   = (A·n + C)        mod M
//! unscramble(x) = A⁻¹ · (x − C)    mod M
//! ```
//!
//! `A` is odd, so it is a unit modulo any power of two and the map is a
//! bijection. This obscures addresses; it is not encryption.
//!
//! The same recurrence, iterated, doubles as the filler generator
//! (`SymbolStream`). The two uses share parameters and nothing else.

use lazy_static::lazy_static;
use num_bigint::BigUint;
use num_traits::One;

use crate::math::modular_inverse;

/// Knuth's MMIX multiplier
pub const MULTIPLIER: u64 = 6364136223846793005;
pub const INCREMENT: u64 = 1;
pub const MODULUS_BITS: usize = 15565;

/// Values discarded from the head of every symbol stream
pub const WARMUP_STEPS: usize = 20;

lazy_static! {
    static ref MODULUS: BigUint = BigUint::one() << MODULUS_BITS;
    static ref MODULUS_MASK: BigUint = &*MODULUS - BigUint::one();
    static ref A: BigUint = BigUint::from(MULTIPLIER);
    static ref A_INVERSE: BigUint = modular_inverse(&A, &MODULUS);
}

pub struct Scrambler;

impl Scrambler {
    /// `M = 2^15565`
    pub fn modulus() -> &'static BigUint {
        &MODULUS
    }

    /// `A⁻¹ mod M`, computed once per process
    pub fn inverse_multiplier() -> &'static BigUint {
        &A_INVERSE
    }

    pub fn scramble(n: &BigUint) -> BigUint {
        // M is a power of two: reduce with a mask
        (&*A * n + INCREMENT) & &*MODULUS_MASK
    }

    pub fn unscramble(x: &BigUint) -> BigUint {
        // x − C wraps modulo M, so add M first to stay unsigned
        let shifted = (x + &*MODULUS - INCREMENT) & &*MODULUS_MASK;
        (&*A_INVERSE * shifted) & &*MODULUS_MASK
    }

    /// Symbol stream over `radix` symbols seeded by `seed`
    pub fn stream(seed: &BigUint, radix: u32) -> SymbolStream {
        SymbolStream::new(seed, radix)
    }
}

/// Iterates the scrambler from a seed, yielding `state mod radix`.
///
/// The first `WARMUP_STEPS` states are skipped so that neighbouring small
/// seeds do not start on visibly related symbols.
#[derive(Debug, Clone)]
pub struct SymbolStream {
    state: BigUint,
    radix: BigUint,
}

impl SymbolStream {
    pub fn new(seed: &BigUint, radix: u32) -> Self {
        let mut state = seed.clone();
        for _ in 0..WARMUP_STEPS {
            state = Scrambler::scramble(&state);
        }
        Self { state, radix: BigUint::from(radix) }
    }
}

impl Iterator for SymbolStream {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        self.state = Scrambler::scramble(&self.state);
        let digit = (&self.state % &self.radix).iter_u32_digits().next().unwrap_or(0);
        Some(digit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;
    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};

    fn random_below_modulus(rng: &mut StdRng) -> BigUint {
        let mut bytes = vec![0u8; MODULUS_BITS / 8 + 1];
        rng.fill_bytes(&mut bytes);
        BigUint::from_bytes_le(&bytes) % Scrambler::modulus()
    }

    #[test]
    fn test_modulus_size() {
        assert_eq!(Scrambler::modulus().bits(), MODULUS_BITS as u64 + 1);
    }

    #[test]
    fn test_inverse_multiplier() {
        let product = BigUint::from(MULTIPLIER) * Scrambler::inverse_multiplier();
        assert_eq!(product % Scrambler::modulus(), BigUint::one());
    }

    #[test]
    fn test_scramble_small_values() {
        assert_eq!(Scrambler::scramble(&BigUint::zero()), BigUint::one());
        assert_eq!(
            Scrambler::scramble(&BigUint::one()),
            BigUint::from(MULTIPLIER + INCREMENT)
        );
    }

    #[test]
    fn test_roundtrip_edges() {
        let max = Scrambler::modulus() - BigUint::one();
        for n in [BigUint::zero(), BigUint::one(), max] {
            assert_eq!(Scrambler::unscramble(&Scrambler::scramble(&n)), n);
        }
    }

    #[test]
    fn test_roundtrip_random() {
        let mut rng = StdRng::seed_from_u64(0xbabe1);
        for _ in 0..16 {
            let n = random_below_modulus(&mut rng);
            let scrambled = Scrambler::scramble(&n);
            assert!(&scrambled < Scrambler::modulus());
            assert_eq!(Scrambler::unscramble(&scrambled), n);
        }
    }

    #[test]
    fn test_unscramble_zero_wraps() {
        // 0 − C ≡ M − 1
        let n = Scrambler::unscramble(&BigUint::zero());
        assert_eq!(Scrambler::scramble(&n), BigUint::zero());
    }

    #[test]
    fn test_stream_deterministic() {
        let seed = BigUint::from(94144u32);
        let a: Vec<u32> = Scrambler::stream(&seed, 29).take(64).collect();
        let b: Vec<u32> = Scrambler::stream(&seed, 29).take(64).collect();

        assert_eq!(a, b);
        assert!(a.iter().all(|d| *d < 29));
    }

    #[test]
    fn test_stream_skips_warmup() {
        let seed = BigUint::from(7u32);
        let mut state = seed.clone();
        for _ in 0..=WARMUP_STEPS {
            state = Scrambler::scramble(&state);
        }
        let expected = (state % BigUint::from(29u32)).iter_u32_digits().next().unwrap_or(0);

        assert_eq!(Scrambler::stream(&seed, 29).next(), Some(expected));
    }
}
