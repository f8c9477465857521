//! Probabilistic primality testing and safe-prime generation
//!
//! Candidates go through three gates: trial division by a small-prime
//! table, a Fermat base-2 pre-filter, and Miller-Rabin with a configurable
//! round count. At the default 64 rounds the false-positive probability is
//! at most 4^-64 = 2^-128 for any input.
//!
//! Random Miller-Rabin bases come from the caller's CSPRNG, so the tests
//! are deterministic under a seeded generator.

use crate::modarith::{mod_pow, random_below, random_in_range};
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use puzzlebox_api::{validate, Error, Result};
use rand::{CryptoRng, RngCore};

/// Default Miller-Rabin round count, for a ≤2^-128 error bound.
pub const DEFAULT_MILLER_RABIN_ROUNDS: usize = 64;

/// Attempt budget for prime generation, per requested prime.
const MAX_GENERATION_ATTEMPTS: usize = 200_000;

/// First odd primes, used for cheap trial division before Miller-Rabin.
const SMALL_PRIMES: [u32; 53] = [
    3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
    101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191, 193,
    197, 199, 211, 223, 227, 229, 233, 239, 241, 251,
];

/// Probabilistic primality test.
///
/// `rounds` Miller-Rabin iterations with uniformly random bases, after
/// trial division and a Fermat base-2 check. Small candidates (below 2^16)
/// are resolved exactly by trial division.
///
/// # Errors
/// `InvalidParameter` if `rounds` is zero.
pub fn is_prime<R: CryptoRng + RngCore>(
    candidate: &BigUint,
    rounds: usize,
    rng: &mut R,
) -> Result<bool> {
    validate::parameter(rounds > 0, "is_prime", "round count must be nonzero")?;

    let two = BigUint::from(2u32);
    if candidate < &two {
        return Ok(false);
    }
    if candidate == &two {
        return Ok(true);
    }
    if candidate.is_even() {
        return Ok(false);
    }

    // Exact answer for small candidates; also keeps the random-base range
    // below from degenerating.
    if candidate.bits() <= 16 {
        return Ok(is_small_prime(candidate));
    }

    for &p in SMALL_PRIMES.iter() {
        let p = BigUint::from(p);
        if candidate == &p {
            return Ok(true);
        }
        if (candidate % &p).is_zero() {
            return Ok(false);
        }
    }

    if !fermat_base2(candidate)? {
        return Ok(false);
    }

    miller_rabin(candidate, rounds, rng)
}

/// Check whether `candidate` is a safe prime: p and (p-1)/2 both prime.
pub fn is_safe_prime<R: CryptoRng + RngCore>(
    candidate: &BigUint,
    rounds: usize,
    rng: &mut R,
) -> Result<bool> {
    if !is_prime(candidate, rounds, rng)? {
        return Ok(false);
    }
    let q = (candidate - BigUint::one()) >> 1;
    is_prime(&q, rounds, rng)
}

/// Generate a safe prime of exactly `bits` bits.
///
/// Candidates are sampled odd with the top bit forced, filtered through
/// [`is_prime`], then checked for a prime (p-1)/2. Intended for fresh
/// group generation; named groups skip this entirely.
///
/// # Errors
/// `InvalidParameter` for `bits < 4`; `RandomGenerationError` if the
/// attempt budget runs out (a broken random source, not bad luck, at any
/// practical bit size).
pub fn generate_safe_prime<R: CryptoRng + RngCore>(rng: &mut R, bits: u64) -> Result<BigUint> {
    validate::parameter(
        bits >= 4,
        "generate_safe_prime",
        "safe primes need at least 4 bits",
    )?;

    let top = BigUint::one() << (bits - 1);
    for _ in 0..MAX_GENERATION_ATTEMPTS {
        // Uniform in [2^(bits-1), 2^bits), forced odd.
        let mut candidate = &top + random_below(rng, &top)?;
        candidate.set_bit(0, true);

        // Fewer rounds while searching, full strength on the survivor.
        if !is_prime(&candidate, 8, rng)? {
            continue;
        }
        if is_safe_prime(&candidate, DEFAULT_MILLER_RABIN_ROUNDS, rng)? {
            return Ok(candidate);
        }
    }

    Err(Error::RandomGenerationError {
        context: "generate_safe_prime",
    })
}

/// Exact trial division for candidates of at most 16 bits.
fn is_small_prime(candidate: &BigUint) -> bool {
    // Width checked by the caller, conversion cannot fail.
    let n = candidate.iter_u64_digits().next().unwrap_or(0);
    if n < 2 {
        return false;
    }
    let mut d = 2u64;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 1;
    }
    true
}

/// Fermat pre-filter: 2^(n-1) mod n == 1 for every odd prime n > 2.
fn fermat_base2(candidate: &BigUint) -> Result<bool> {
    let result = mod_pow(
        &BigUint::from(2u32),
        &(candidate - BigUint::one()),
        candidate,
    )?;
    Ok(result.is_one())
}

/// Miller-Rabin with random bases in [2, n-2].
fn miller_rabin<R: CryptoRng + RngCore>(
    candidate: &BigUint,
    rounds: usize,
    rng: &mut R,
) -> Result<bool> {
    let one = BigUint::one();
    let minus_one = candidate - &one;

    // n - 1 = 2^s * d with d odd
    let s = minus_one.trailing_zeros().unwrap_or(0);
    let d = &minus_one >> s;

    'rounds: for _ in 0..rounds {
        let base = random_in_range(rng, &BigUint::from(2u32), &minus_one)?;
        let mut y = mod_pow(&base, &d, candidate)?;

        if y == one || y == minus_one {
            continue;
        }
        for _ in 1..s {
            y = (&y * &y) % candidate;
            if y == minus_one {
                continue 'rounds;
            }
            if y == one {
                return Ok(false);
            }
        }
        return Ok(false);
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn rng() -> ChaCha20Rng {
        ChaCha20Rng::seed_from_u64(0x5eed)
    }

    #[test]
    fn classifies_small_numbers() {
        let mut rng = rng();
        let primes = [2u64, 3, 5, 23, 101, 65_521];
        let composites = [0u64, 1, 4, 9, 25, 91, 65_533];

        for p in primes {
            assert!(
                is_prime(&BigUint::from(p), 16, &mut rng).unwrap(),
                "{} misclassified as composite",
                p
            );
        }
        for c in composites {
            assert!(
                !is_prime(&BigUint::from(c), 16, &mut rng).unwrap(),
                "{} misclassified as prime",
                c
            );
        }
    }

    #[test]
    fn accepts_known_large_prime() {
        // 2^89 - 1, a Mersenne prime.
        let p = (BigUint::one() << 89u32) - BigUint::one();
        assert!(is_prime(&p, 32, &mut rng()).unwrap());
    }

    #[test]
    fn rejects_small_pseudoprimes_exactly() {
        // 2047 = 23 * 89 and 561 = 3 * 11 * 17 fool weak probabilistic
        // tests; below 2^16 the answer is exact.
        assert!(!is_prime(&BigUint::from(2047u32), 32, &mut rng()).unwrap());
        assert!(!is_prime(&BigUint::from(561u32), 32, &mut rng()).unwrap());
    }

    #[test]
    fn rejects_large_strong_pseudoprime() {
        // 3215031751 = 151 * 751 * 28351 is a strong pseudoprime to bases
        // 2, 3, 5, and 7; its factors clear the trial-division table, so
        // only the random-base Miller-Rabin rounds can reject it.
        let n = BigUint::from(3_215_031_751u64);
        assert!(!is_prime(&n, 32, &mut rng()).unwrap());
    }

    #[test]
    fn recognizes_safe_prime() {
        let mut rng = rng();
        // 23 = 2*11 + 1, both prime.
        assert!(is_safe_prime(&BigUint::from(23u32), 16, &mut rng).unwrap());
        // 13 is prime but (13-1)/2 = 6 is not.
        assert!(!is_safe_prime(&BigUint::from(13u32), 16, &mut rng).unwrap());
    }

    #[test]
    fn generates_safe_prime_of_requested_width() {
        let mut rng = rng();
        let p = generate_safe_prime(&mut rng, 32).unwrap();
        assert_eq!(p.bits(), 32);
        assert!(is_safe_prime(&p, 32, &mut rng).unwrap());
    }

    #[test]
    fn zero_rounds_rejected() {
        assert!(is_prime(&BigUint::from(23u32), 0, &mut rng()).is_err());
    }
}
