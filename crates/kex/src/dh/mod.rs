//! Classical finite-field Diffie-Hellman
//!
//! Key generation, public-value validation, and shared-secret derivation
//! over validated [`GroupParameters`]. Message sequencing lives in the
//! session layer; this module is the arithmetic core.
//!
//! Two timing countermeasures stack here. The exponentiation ladder is
//! fixed-sequence (see `puzzlebox-algorithms`), and the derivation blinds
//! the peer's value before the secret exponent touches it: the shared
//! secret is computed as `(y·v)^x · (v^-1)^x mod p` for a fresh random v,
//! following Kocher's blinding construction.

use crate::group::GroupParameters;
use num_bigint::BigUint;
use num_traits::One;
use puzzlebox_algorithms::modarith::{self, mod_inverse, mod_pow, random_in_range};
use puzzlebox_api::{validate, Error, Result, SharedSecret};
use puzzlebox_common::SecretVec;
use rand::{CryptoRng, RngCore};

/// Retries allowed when key generation hits a degenerate value.
///
/// Degenerate draws have negligible probability in any real group, so
/// exhausting this budget means the group or the random source is broken.
const MAX_KEYGEN_RETRIES: usize = 4;

/// One party's ephemeral key pair.
///
/// The private exponent is held as fixed-width big-endian bytes in a
/// zeroize-on-drop buffer and never serialized; the public value is the
/// only field that ever leaves this struct.
pub struct DhKeyPair {
    private_exponent: SecretVec,
    public_value: BigUint,
}

impl DhKeyPair {
    /// Generate a key pair: x uniform in [2, q-1], y = g^x mod p.
    ///
    /// Falls back to the bound [2, p-2] when the group carries no subgroup
    /// order. Degenerate results (y ∈ {0, 1, p-1}) are resampled at most
    /// [`MAX_KEYGEN_RETRIES`] times.
    ///
    /// # Errors
    /// `WeakKey` when every retry produced a degenerate pair.
    pub fn generate<R: CryptoRng + RngCore>(
        params: &GroupParameters,
        rng: &mut R,
    ) -> Result<Self> {
        let p = params.modulus();
        let exponent_bound = match params.subgroup_order() {
            // [2, q-1]
            Some(q) => q.clone(),
            // [2, p-2]
            None => p - BigUint::one(),
        };
        validate::group(
            exponent_bound > BigUint::from(2u32),
            "group leaves no room for a private exponent",
        )?;

        let p_minus_one = p - BigUint::one();
        for _ in 0..=MAX_KEYGEN_RETRIES {
            let x = random_in_range(rng, &BigUint::from(2u32), &exponent_bound)?;
            let y = mod_pow(params.generator(), &x, p)?;

            if y.is_one() || y == p_minus_one {
                continue;
            }

            let width = params.element_width();
            let x_bytes = modarith::to_fixed_bytes_be(&x, width)?;
            return Ok(Self {
                private_exponent: SecretVec::new(x_bytes.to_vec()),
                public_value: y,
            });
        }

        Err(Error::WeakKey {
            context: "DhKeyPair::generate",
        })
    }

    /// Public value y = g^x mod p.
    pub fn public_value(&self) -> &BigUint {
        &self.public_value
    }

    /// Reconstruct the private exponent for an exponentiation.
    ///
    /// The returned `BigUint` is a transient working copy; the bigint
    /// representation cannot be wiped in place, which is why derivation
    /// also blinds its inputs.
    fn exponent(&self) -> BigUint {
        BigUint::from_bytes_be(self.private_exponent.as_slice())
    }
}

impl core::fmt::Debug for DhKeyPair {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DhKeyPair")
            .field("public_value", &self.public_value)
            .field("private_exponent", &"[REDACTED]")
            .finish()
    }
}

/// Validate a received public value before it meets a secret exponent.
///
/// Rejects out-of-range values (y ≤ 1 or y ≥ p-1) and, when the subgroup
/// order is known, any y whose order does not divide 2q — the values a
/// small-subgroup confinement attack has to use.
///
/// # Errors
/// `InvalidPublicValue` on any failed check.
pub fn validate_public_value(params: &GroupParameters, y: &BigUint) -> Result<()> {
    let p_minus_one = params.modulus() - BigUint::one();

    validate::public_value(y > &BigUint::one(), "public value must exceed 1")?;
    validate::public_value(y < &p_minus_one, "public value must be below p - 1")?;

    if let Some(q) = params.subgroup_order() {
        let y_to_q = mod_pow(y, q, params.modulus())?;
        validate::public_value(
            y_to_q.is_one() || y_to_q == p_minus_one,
            "public value order does not divide 2q",
        )?;
    }

    Ok(())
}

/// Derive the shared secret `peer_public^x mod p` with blinding.
///
/// Validates the peer value, then computes the exponentiation through a
/// fresh multiplicative blind. The output is the fixed-width big-endian
/// encoding of the group element, to be expanded through a KDF by the
/// caller; it is never a symmetric key by itself.
///
/// # Errors
/// `InvalidPublicValue` if the peer value fails validation.
pub fn derive_shared_secret<R: CryptoRng + RngCore>(
    params: &GroupParameters,
    keypair: &DhKeyPair,
    peer_public: &BigUint,
    rng: &mut R,
) -> Result<SharedSecret> {
    validate_public_value(params, peer_public)?;

    let p = params.modulus();
    let x = keypair.exponent();

    // Fresh blind per derivation: v in [2, p-1), unblind with (v^-1)^x.
    let blind = random_in_range(rng, &BigUint::from(2u32), &(p - BigUint::one()))?;
    let unblind = mod_pow(&mod_inverse(&blind, p)?, &x, p)?;

    let blinded_peer = (peer_public * &blind) % p;
    let blinded_secret = mod_pow(&blinded_peer, &x, p)?;
    let shared = (blinded_secret * unblind) % p;

    let bytes = modarith::to_fixed_bytes_be(&shared, params.element_width())?;
    Ok(SharedSecret::new(bytes.to_vec()))
}
