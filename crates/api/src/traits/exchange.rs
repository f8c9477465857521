//! Trait definition for the uniform key-exchange capability set
//!
//! Both protocol variants (classical Diffie-Hellman and the Merkle puzzle
//! board) expose the same three-call surface, so calling code selects a
//! variant once at session creation and never branches on it again.

use crate::types::SharedSecret;
use crate::Result;
use rand::{CryptoRng, RngCore};

/// Uniform capability set for a two-party key agreement.
///
/// # Message flow
///
/// The initiator drives `generate_initiation` → `finalize`; the responder
/// drives `respond`. A variant with a confirmation round (the puzzle board)
/// folds it into the same shape: the responder reaches its secret inside
/// `respond` and the initiator reaches its secret in `finalize`. Whichever
/// side derived its secret without a `finalize` call collects it through
/// [`KeyExchange::take_shared_secret`].
///
/// # Security Requirements
///
/// - All randomness comes from the caller-provided CSPRNG; implementations
///   hold no ambient RNG state, keeping sessions deterministic under a
///   seeded generator in tests.
/// - Every inbound message is validated before use; a validation failure
///   aborts the session and the error reports the failed check only.
/// - Session working state (private exponents, puzzle candidates, board
///   salts) is wiped at terminal states and on drop.
pub trait KeyExchange {
    /// Produce the opening message of the exchange (initiator role).
    fn generate_initiation<R: CryptoRng + RngCore>(&mut self, rng: &mut R) -> Result<Vec<u8>>;

    /// Consume the initiation and produce the reply (responder role).
    ///
    /// For variants where the responder's secret is fixed by this step, the
    /// session transitions to its derived state here and the secret becomes
    /// available via [`KeyExchange::take_shared_secret`].
    fn respond<R: CryptoRng + RngCore>(&mut self, rng: &mut R, initiation: &[u8])
        -> Result<Vec<u8>>;

    /// Consume the reply and derive the shared secret (initiator role).
    ///
    /// Takes the RNG because some derivations blind their exponentiations
    /// with fresh randomness.
    fn finalize<R: CryptoRng + RngCore>(
        &mut self,
        rng: &mut R,
        response: &[u8],
    ) -> Result<SharedSecret>;

    /// Collect a secret derived during [`KeyExchange::respond`].
    ///
    /// Consumes the session's copy: a second call is an `InvalidState`
    /// error, and nothing secret remains in the session afterwards.
    fn take_shared_secret(&mut self) -> Result<SharedSecret>;
}
