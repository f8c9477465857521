//! Validated prime-modulus group parameters
//!
//! A [`GroupParameters`] value only exists after its checks have passed:
//! the modulus is (probabilistically) prime, the generator is in range,
//! and the generator's order is not small. Both parties hold their own
//! copy; [`GroupParameters::ensure_matches`] is the byte-identical
//! comparison a session runs before any exponent leaves the machine.
//!
//! The generator-order rule deliberately accepts order q *and* order 2q
//! elements (`g^q ∈ {1, p-1}`): in a safe-prime group the canonical small
//! generators (g = 2, 5, ...) generate the full order-2q group, and the
//! only confinement-usable subgroups, {1} and {1, p-1}, are still
//! excluded by the `g² mod p ≠ 1` check.

use num_bigint::BigUint;
use num_traits::One;
use puzzlebox_algorithms::{is_prime, mod_pow, DEFAULT_MILLER_RABIN_ROUNDS};
use puzzlebox_api::{validate, Error, Result, Serialize};
use puzzlebox_internal::{WireReader, WireWriter};
use rand::{CryptoRng, RngCore};

/// RFC 3526 group 14: 2048-bit MODP safe prime, generator 2.
const MODP_2048_PRIME_HEX: &[u8] = b"\
FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74\
020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F1437\
4FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED\
EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF05\
98DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB\
9ED529077096966D670C354E4ABC9804F1746C08CA18217C32905E462E36CE3B\
E39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BCBF695581718\
3995497CEA956AE515D2261898FA051015728E5A8AACAA68FFFFFFFFFFFFFFFF";

/// Validated (modulus, generator, subgroup order) triple.
///
/// Immutable once constructed. Cloning gives each party its own copy, as
/// the protocols require; copies are compared with
/// [`GroupParameters::ensure_matches`] before use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupParameters {
    modulus: BigUint,
    generator: BigUint,
    subgroup_order: Option<BigUint>,
}

impl GroupParameters {
    /// Construct and fully validate group parameters.
    ///
    /// Runs [`DEFAULT_MILLER_RABIN_ROUNDS`] rounds of Miller-Rabin on the
    /// modulus (≤2^-128 false-positive bound) and the generator-order
    /// checks. When `subgroup_order` is absent and the modulus turns out
    /// to be a safe prime, q = (p-1)/2 is filled in automatically.
    ///
    /// # Errors
    /// `InvalidGroup` when any check fails.
    pub fn new<R: CryptoRng + RngCore>(
        modulus: BigUint,
        generator: BigUint,
        subgroup_order: Option<BigUint>,
        rng: &mut R,
    ) -> Result<Self> {
        validate::group(
            modulus > BigUint::from(3u32),
            "modulus too small to contain a working subgroup",
        )?;
        validate::group(
            is_prime(&modulus, DEFAULT_MILLER_RABIN_ROUNDS, rng)?,
            "modulus failed primality test",
        )?;

        let subgroup_order = match subgroup_order {
            Some(q) => {
                validate::group(q > BigUint::one(), "subgroup order must exceed 1")?;
                validate::group(q < modulus, "subgroup order must be below the modulus")?;
                Some(q)
            }
            None => {
                // Safe prime: q = (p-1)/2 recovers the order metadata.
                let q = (&modulus - BigUint::one()) >> 1;
                if is_prime(&q, DEFAULT_MILLER_RABIN_ROUNDS, rng)? {
                    Some(q)
                } else {
                    None
                }
            }
        };

        let params = Self {
            modulus,
            generator,
            subgroup_order,
        };
        params.check_generator()?;
        Ok(params)
    }

    /// The RFC 3526 2048-bit MODP group (group 14), generator 2.
    ///
    /// The constants are fixed and published, so construction skips the
    /// primality test and runs only the structural generator checks.
    pub fn modp_2048() -> Self {
        let modulus = BigUint::parse_bytes(MODP_2048_PRIME_HEX, 16)
            .expect("RFC 3526 group 14 constant is well-formed hex");
        let subgroup_order = (&modulus - BigUint::one()) >> 1;
        Self {
            modulus,
            generator: BigUint::from(2u32),
            subgroup_order: Some(subgroup_order),
        }
    }

    /// Prime modulus p.
    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// Generator g.
    pub fn generator(&self) -> &BigUint {
        &self.generator
    }

    /// Subgroup order q, when known.
    pub fn subgroup_order(&self) -> Option<&BigUint> {
        self.subgroup_order.as_ref()
    }

    /// Fixed encoding width of a group element, in bytes.
    pub fn element_width(&self) -> usize {
        ((self.modulus.bits() + 7) / 8) as usize
    }

    /// Whole-structure comparison against the peer's copy.
    ///
    /// # Errors
    /// `GroupMismatch` on any field difference.
    pub fn ensure_matches(&self, other: &Self) -> Result<()> {
        if self != other {
            return Err(Error::GroupMismatch {
                context: "group parameter copies differ",
            });
        }
        Ok(())
    }

    /// Generator range and order checks shared by all constructors.
    fn check_generator(&self) -> Result<()> {
        let p_minus_one = &self.modulus - BigUint::one();

        validate::group(self.generator > BigUint::one(), "generator must exceed 1")?;
        validate::group(
            self.generator < p_minus_one,
            "generator must be below p - 1",
        )?;

        // Orders 1 and 2 are the confinement-usable subgroups.
        let g_squared = mod_pow(&self.generator, &BigUint::from(2u32), &self.modulus)?;
        validate::group(!g_squared.is_one(), "generator has order at most 2")?;

        if let Some(q) = &self.subgroup_order {
            let g_to_q = mod_pow(&self.generator, q, &self.modulus)?;
            validate::group(
                g_to_q.is_one() || g_to_q == p_minus_one,
                "generator order does not divide 2q",
            )?;
        }

        Ok(())
    }

    /// Append this group to an in-progress wire message.
    pub fn encode(&self, w: &mut WireWriter) {
        w.put_bytes(&self.modulus.to_bytes_be());
        w.put_bytes(&self.generator.to_bytes_be());
        match &self.subgroup_order {
            Some(q) => {
                w.put_u8(1);
                w.put_bytes(&q.to_bytes_be());
            }
            None => w.put_u8(0),
        }
    }

    /// Decode a group from an in-progress wire message.
    ///
    /// Only cheap structural checks run here, no primality tests and no
    /// exponentiations: the fields are attacker-controlled at this point,
    /// and a hostile multi-megabyte order would otherwise buy a modular
    /// exponentiation per message. A decoded group is never used
    /// directly; it is compared byte-for-byte against the local, fully
    /// validated copy via [`GroupParameters::ensure_matches`] before any
    /// arithmetic touches it.
    pub fn decode(r: &mut WireReader<'_>) -> Result<Self> {
        let modulus = BigUint::from_bytes_be(r.bytes()?);
        let generator = BigUint::from_bytes_be(r.bytes()?);
        let subgroup_order = match r.u8()? {
            0 => None,
            1 => Some(BigUint::from_bytes_be(r.bytes()?)),
            _ => {
                return Err(Error::SerializationError {
                    context: "GroupParameters::decode",
                    message: "invalid subgroup-order flag".to_string(),
                })
            }
        };

        validate::group(modulus > BigUint::from(3u32), "decoded modulus too small")?;
        validate::group(generator > BigUint::one(), "decoded generator too small")?;
        validate::group(
            generator < modulus,
            "decoded generator not below the modulus",
        )?;
        Ok(Self {
            modulus,
            generator,
            subgroup_order,
        })
    }
}

impl Serialize for GroupParameters {
    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = WireReader::new(bytes);
        let params = Self::decode(&mut r)?;
        r.finish()?;
        Ok(params)
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut w = WireWriter::new();
        self.encode(&mut w);
        w.into_bytes()
    }
}
