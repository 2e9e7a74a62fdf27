//! Modular arithmetic over power-of-two moduli used by the arithmetic families.

/// `a * b mod modulus`, without overflow.
#[inline]
pub fn mul_mod(a: u64, b: u64, modulus: u64) -> u64 {
    ((u128::from(a) * u128::from(b)) % u128::from(modulus)) as u64
}

/// Multiplicative inverse of `value` modulo `modulus`, if it exists.
pub fn modular_inverse(value: u64, modulus: u64) -> Option<u64> {
    if modulus == 1 {
        return Some(0);
    }
    let m = i128::from(modulus);
    let (mut old_r, mut r) = (i128::from(value % modulus), m);
    let (mut old_s, mut s) = (1_i128, 0_i128);
    while r != 0 {
        let q = old_r / r;
        (old_r, r) = (r, old_r - q * r);
        (old_s, s) = (s, old_s - q * s);
    }
    (old_r == 1).then(|| old_s.rem_euclid(m) as u64)
}

/// `x * a mod 2^span`, or `x` when `a` has no inverse.
pub fn modular_multiply(x: u64, a: u64, span: usize) -> u64 {
    let modulus = 1u64 << span;
    let a = a % modulus;
    if modular_inverse(a, modulus).is_none() {
        return x;
    }
    mul_mod(x, a, modulus)
}

/// `x * a^-1 mod 2^span`, or `x` when `a` has no inverse.
pub fn modular_unmultiply(x: u64, a: u64, span: usize) -> u64 {
    let modulus = 1u64 << span;
    match modular_inverse(a % modulus, modulus) {
        Some(inv) => mul_mod(x, inv, modulus),
        None => x,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_of_odd_values() {
        for span in 1..=16 {
            let modulus = 1u64 << span;
            for a in (1..modulus.min(200)).step_by(2) {
                let inv = modular_inverse(a, modulus).unwrap();
                assert_eq!(mul_mod(a, inv, modulus), 1 % modulus, "a={a} span={span}");
            }
        }
    }

    #[test]
    fn test_even_values_have_no_inverse() {
        assert_eq!(modular_inverse(0, 8), None);
        assert_eq!(modular_inverse(2, 8), None);
        assert_eq!(modular_inverse(6, 16), None);
    }

    #[test]
    fn test_multiply_then_unmultiply() {
        for x in 0..32 {
            let y = modular_multiply(x, 13, 5);
            assert_eq!(modular_unmultiply(y, 13, 5), x);
        }
    }

    #[test]
    fn test_degenerate_multiplier_is_identity() {
        assert_eq!(modular_multiply(5, 4, 3), 5);
        assert_eq!(modular_unmultiply(5, 4, 3), 5);
        // Multiplier reduced mod 2^span first: 9 ≡ 1 (mod 8).
        assert_eq!(modular_multiply(5, 9, 3), 5);
    }

    #[test]
    fn test_span_one() {
        // mod 2, only 1 is invertible.
        assert_eq!(modular_multiply(1, 1, 1), 1);
        assert_eq!(modular_multiply(1, 0, 1), 1);
        assert_eq!(modular_multiply(0, 3, 1), 0);
    }
}
