//! Arithmetic and commitment primitives with constant-time discipline
//!
//! This crate is the leaf layer of the puzzlebox workspace. It provides:
//!
//! - Modular arithmetic over arbitrary-precision integers with a
//!   fixed-sequence exponentiation ladder ([`modarith`])
//! - Probabilistic primality testing and safe-prime generation ([`prime`])
//! - An array-backed Merkle tree with inclusion proofs ([`merkle`])
//! - Narrow wrappers over the external collaborators: SHA-256, HKDF-SHA256,
//!   and ChaCha20-Poly1305 ([`suite`])
//!
//! Nothing in here knows about protocol roles or message ordering; those
//! live in `puzzlebox-kex`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod merkle;
pub mod modarith;
pub mod prime;
pub mod suite;

pub use merkle::{verify_proof, MerkleProof, MerkleTree, DIGEST_SIZE};
pub use modarith::{constant_time_eq, mod_inverse, mod_pow, random_below, random_in_range};
pub use prime::{generate_safe_prime, is_prime, is_safe_prime, DEFAULT_MILLER_RABIN_ROUNDS};
