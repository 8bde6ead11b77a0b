//! Modular arithmetic on big integers

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, Signed, Zero};

/// Multiplicative inverse of `a` modulo `m` (extended Euclid).
///
/// The result is normalized into `[0, m)`. Coprimality of `a` and `m` is the
/// caller's responsibility: when `gcd(a, m) != 1` the returned value is not an
/// inverse.
pub fn modular_inverse(a: &BigUint, m: &BigUint) -> BigUint {
    if m.is_zero() {
        return BigUint::zero();
    }

    let m_signed = BigInt::from_biguint(Sign::Plus, m.clone());
    let mut rn = (m_signed.clone(), BigInt::from_biguint(Sign::Plus, a.clone()));
    let mut tn = (BigInt::zero(), BigInt::one());

    while !rn.1.is_zero() {
        let q = &rn.0 / &rn.1;
        let next_t = &tn.0 - &q * &tn.1;
        let next_r = &rn.0 - &q * &rn.1;
        tn = (tn.1, next_t);
        rn = (rn.1, next_r);
    }

    let mut t = tn.0 % &m_signed;
    if t.is_negative() {
        t += &m_signed;
    }
    t.to_biguint().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(n: u64) -> BigUint {
        BigUint::from(n)
    }

    #[test]
    fn test_small_inverse() {
        assert_eq!(modular_inverse(&big(3), &big(26)), big(9));
        assert_eq!(modular_inverse(&big(7), &big(26)), big(15));
    }

    #[test]
    fn test_inverse_of_one() {
        assert_eq!(modular_inverse(&big(1), &big(1000)), big(1));
    }

    #[test]
    fn test_inverse_modulo_power_of_two() {
        let a = big(6364136223846793005);
        let m = BigUint::one() << 200usize;
        let inv = modular_inverse(&a, &m);

        assert!(inv < m);
        assert_eq!((&a * &inv) % &m, BigUint::one());
    }

    #[test]
    fn test_non_coprime_does_not_panic() {
        let inv = modular_inverse(&big(4), &big(8));
        assert!(inv < big(8));
        assert_ne!((big(4) * inv) % big(8), big(1));
    }
}
