//! Modular arithmetic over arbitrary-precision integers
//!
//! The exponentiation ladder here is fixed-sequence: one squaring and one
//! multiplication execute for every bit position up to a fixed bit-length,
//! regardless of the exponent's bit values, so the operation count cannot
//! leak exponent bits. Value-level constant time is not achievable on top
//! of a heap-allocated bigint representation; callers that need stronger
//! timing guarantees additionally blind their inputs (see the DH layer).
//!
//! All functions return errors on malformed input and never panic on
//! attacker-supplied values.

use num_bigint::{BigInt, BigUint};
use num_traits::{One, Signed, Zero};
use puzzlebox_api::{validate, Error, Result};
use puzzlebox_internal::ct_eq;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

/// Attempt budget for rejection sampling.
///
/// Each attempt fails with probability below 1/2, so 256 attempts failing
/// indicates a broken random source rather than bad luck.
const MAX_SAMPLING_ATTEMPTS: usize = 256;

/// Compute `base^exponent mod modulus` with a fixed operation sequence.
///
/// Iterates square-and-multiply over a fixed bit-length (the larger of the
/// modulus and exponent widths). Both the squared and the multiplied value
/// are computed at every position; the exponent bit only selects which one
/// is kept.
///
/// # Errors
/// `InvalidParameter` if `modulus <= 1`.
pub fn mod_pow(base: &BigUint, exponent: &BigUint, modulus: &BigUint) -> Result<BigUint> {
    validate::parameter(
        *modulus > BigUint::one(),
        "mod_pow",
        "modulus must be greater than 1",
    )?;

    let base = base % modulus;
    let nbits = modulus.bits().max(exponent.bits());

    let mut acc = BigUint::one();
    for i in (0..nbits).rev() {
        let squared = (&acc * &acc) % modulus;
        let multiplied = (&squared * &base) % modulus;
        // Fixed sequence: both values exist every iteration, the bit only
        // picks the survivor.
        acc = if exponent.bit(i) { multiplied } else { squared };
    }

    Ok(acc)
}

/// Compute the modular inverse of `a` modulo `modulus` via extended Euclid.
///
/// # Errors
/// `InvalidParameter` if `modulus <= 1` or no inverse exists
/// (`gcd(a, modulus) != 1`).
pub fn mod_inverse(a: &BigUint, modulus: &BigUint) -> Result<BigUint> {
    validate::parameter(
        *modulus > BigUint::one(),
        "mod_inverse",
        "modulus must be greater than 1",
    )?;

    let m = BigInt::from(modulus.clone());
    let mut r = (m.clone(), BigInt::from(a % modulus));
    let mut t = (BigInt::zero(), BigInt::one());

    while !r.1.is_zero() {
        let quotient = &r.0 / &r.1;
        t = (t.1.clone(), &t.0 - &quotient * &t.1);
        r = (r.1.clone(), &r.0 - &quotient * &r.1);
    }

    if !r.0.is_one() {
        return Err(Error::InvalidParameter {
            context: "mod_inverse",
            message: "value has no inverse for this modulus".to_string(),
        });
    }

    let mut inv = t.0 % &m;
    if inv.is_negative() {
        inv += &m;
    }
    inv.to_biguint().ok_or(Error::Other {
        context: "mod_inverse",
        message: "inverse normalization failed".to_string(),
    })
}

/// Sample a uniform value in `[0, bound)` by rejection.
///
/// Fills the minimal byte width from the caller's CSPRNG, masks the excess
/// high bits, and rejects candidates at or above the bound, so the result
/// carries no modulo bias. Rejected candidate bytes are zeroized.
///
/// # Errors
/// `InvalidParameter` if `bound` is zero; `RandomGenerationError` if the
/// attempt budget is exhausted.
pub fn random_below<R: CryptoRng + RngCore>(rng: &mut R, bound: &BigUint) -> Result<BigUint> {
    validate::parameter(!bound.is_zero(), "random_below", "bound must be nonzero")?;

    let bits = bound.bits();
    let nbytes = ((bits + 7) / 8) as usize;
    let top_mask: u8 = match bits % 8 {
        0 => 0xff,
        partial => (1u8 << partial) - 1,
    };

    for _ in 0..MAX_SAMPLING_ATTEMPTS {
        let mut buf = Zeroizing::new(vec![0u8; nbytes]);
        rng.fill_bytes(&mut buf);
        buf[0] &= top_mask;

        let candidate = BigUint::from_bytes_be(&buf);
        if &candidate < bound {
            return Ok(candidate);
        }
    }

    Err(Error::RandomGenerationError {
        context: "random_below",
    })
}

/// Sample a uniform value in `[lo, hi)`.
pub fn random_in_range<R: CryptoRng + RngCore>(
    rng: &mut R,
    lo: &BigUint,
    hi: &BigUint,
) -> Result<BigUint> {
    validate::parameter(lo < hi, "random_in_range", "range is empty")?;
    Ok(lo + random_below(rng, &(hi - lo))?)
}

/// Compare two values in constant time at a fixed byte width.
///
/// Both values are encoded big-endian at `width` bytes before comparison,
/// so the comparison's timing depends on the (public) width only.
///
/// # Errors
/// `InvalidLength` if either value does not fit in `width` bytes.
pub fn constant_time_eq(a: &BigUint, b: &BigUint, width: usize) -> Result<bool> {
    let a_bytes = to_fixed_bytes_be(a, width)?;
    let b_bytes = to_fixed_bytes_be(b, width)?;
    Ok(ct_eq(&a_bytes, &b_bytes))
}

/// Encode a value as fixed-width big-endian bytes.
///
/// The returned buffer is zeroized on drop; callers pass secret group
/// elements through here.
///
/// # Errors
/// `InvalidLength` if the value does not fit in `width` bytes.
pub fn to_fixed_bytes_be(value: &BigUint, width: usize) -> Result<Zeroizing<Vec<u8>>> {
    let raw = Zeroizing::new(value.to_bytes_be());
    if raw.len() > width {
        return Err(Error::InvalidLength {
            context: "to_fixed_bytes_be",
            expected: width,
            actual: raw.len(),
        });
    }

    let mut out = Zeroizing::new(vec![0u8; width]);
    out[width - raw.len()..].copy_from_slice(&raw);
    Ok(out)
}
