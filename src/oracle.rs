//! # Primality oracle.
//!
//! [`is_prime`] decides primality by trial division. It is pure: no state, no
//! allocation, and the same input always yields the same answer, so any number
//! of workers may call it concurrently.
//!
//! The divisor bound is checked as `d <= n / d` instead of `d * d <= n`, which
//! keeps the loop free of overflow for every `i64`, including `i64::MAX`.

/// Returns `true` if `n` is prime.
///
/// - `n < 2` is never prime (this covers zero and all negative numbers).
/// - `2` and `3` are prime.
/// - Otherwise `n` is prime iff no `d` in `2..=floor(sqrt(n))` divides it.
///
/// Even divisors beyond 2 are skipped; the result is identical to testing every
/// divisor.
///
/// # Example
/// ```
/// use primescan::is_prime;
///
/// assert!(is_prime(2));
/// assert!(is_prime(7919));
/// assert!(!is_prime(1));
/// assert!(!is_prime(-7));
/// ```
#[must_use]
pub const fn is_prime(n: i64) -> bool {
    if n < 2 {
        return false;
    }
    if n < 4 {
        return true;
    }
    if n % 2 == 0 {
        return false;
    }

    let mut d: i64 = 3;
    while d <= n / d {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_below_two_is_never_prime() {
        for n in [i64::MIN, -101, -2, -1, 0, 1] {
            assert!(!is_prime(n), "{n} must not be prime");
        }
    }

    #[test]
    fn test_two_is_prime() {
        assert!(is_prime(2));
    }

    #[test]
    fn test_even_numbers_above_two_are_composite() {
        for n in (4..2_000).step_by(2) {
            assert!(!is_prime(n), "{n} is even");
        }
    }

    #[test]
    fn test_small_primes() {
        let found: Vec<i64> = (0..=50).filter(|&n| is_prime(n)).collect();
        assert_eq!(
            found,
            vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47]
        );
    }

    #[test]
    fn test_squares_of_primes_are_composite() {
        for p in [3_i64, 5, 7, 11, 13, 97, 7919] {
            assert!(!is_prime(p * p), "{} = {p}^2", p * p);
        }
    }

    #[test]
    fn test_is_pure() {
        for n in [-5_i64, 0, 2, 9, 97, 1_000_003, 2_147_483_647] {
            assert_eq!(is_prime(n), is_prime(n));
        }
    }

    #[test]
    fn test_large_values_do_not_overflow() {
        assert!(is_prime(2_147_483_647));
        assert!(is_prime(1_000_000_007));
        assert!(!is_prime(1_000_000_007 * 3));
        // i64::MAX = 7^2 * 73 * 127 * 337 * 92737 * 649657
        assert!(!is_prime(i64::MAX));
    }
}
