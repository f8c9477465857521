//! The puzzle primitive: weakly encrypted session-key candidates
//!
//! A puzzle is an AEAD ciphertext whose key is derived from a w-bit
//! unknown plus public context (board salt and puzzle index). The builder
//! knows the w-bit value and seals in one operation; the solver recovers
//! it by exhausting the 2^w key space, expected 2^(w-1) trial decryptions.
//! The AEAD tag is the integrity signal for each trial, and its
//! verification is constant-time inside the cipher, so a trial leaks
//! nothing about partial key matches.
//!
//! The board salt is fresh per board, which ties every weak key to one
//! session: nothing an adversary precomputes for one board transfers to
//! the next.

use puzzlebox_algorithms::suite;
use puzzlebox_api::{validate, Error, Result};
use puzzlebox_common::SecretBuffer;
use puzzlebox_internal::{WireReader, WireWriter};
use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

/// Width of a session key candidate.
pub const CANDIDATE_SIZE: usize = 32;

/// Width of a board salt.
pub const SALT_SIZE: usize = 32;

/// Sealed plaintext layout: index (4 bytes BE) then candidate.
const PLAINTEXT_SIZE: usize = 4 + CANDIDATE_SIZE;

/// Domain-separation label for weak-key derivation.
const WEAK_KEY_INFO: &[u8] = b"puzzlebox.weak-key.v1";

/// Board-level work parameters.
///
/// `puzzle_count` (N) and `weak_key_bits` (w) fix the cost gap: an honest
/// solver pays Θ(2^w) on one puzzle, an eavesdropper pays Θ(N·2^w) across
/// the board. The constructor refuses shapes that erase the gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PuzzleParameters {
    puzzle_count: u32,
    weak_key_bits: u8,
}

impl PuzzleParameters {
    /// Validate and construct board parameters.
    ///
    /// # Errors
    /// `InvalidParameter` when N < 2 (a one-puzzle board gives the
    /// adversary the honest party's cost) or w is outside 1..=32.
    pub fn new(puzzle_count: u32, weak_key_bits: u8) -> Result<Self> {
        validate::parameter(
            puzzle_count >= 2,
            "PuzzleParameters::new",
            "puzzle count below 2 erases the work asymmetry",
        )?;
        validate::parameter(
            (1..=32).contains(&weak_key_bits),
            "PuzzleParameters::new",
            "weak key width must be between 1 and 32 bits",
        )?;
        Ok(Self {
            puzzle_count,
            weak_key_bits,
        })
    }

    /// Number of puzzles on a board (N).
    pub fn puzzle_count(&self) -> u32 {
        self.puzzle_count
    }

    /// Width of the weak-key unknown in bits (w).
    pub fn weak_key_bits(&self) -> u8 {
        self.weak_key_bits
    }

    /// Size of the weak-key search space, 2^w.
    pub fn weak_key_space(&self) -> u64 {
        1u64 << self.weak_key_bits
    }

    /// Solver attempt ceiling: the full key space. Past this point the
    /// puzzle cannot be honest and the board is treated as corrupt.
    pub fn attempt_ceiling(&self) -> u64 {
        self.weak_key_space()
    }

    fn weak_value_mask(&self) -> u32 {
        if self.weak_key_bits == 32 {
            u32::MAX
        } else {
            (1u32 << self.weak_key_bits) - 1
        }
    }

    /// Append these parameters to an in-progress wire message.
    pub fn encode(&self, w: &mut WireWriter) {
        w.put_u32(self.puzzle_count);
        w.put_u8(self.weak_key_bits);
    }

    /// Decode parameters from an in-progress wire message, revalidating.
    pub fn decode(r: &mut WireReader<'_>) -> Result<Self> {
        let puzzle_count = r.u32()?;
        let weak_key_bits = r.u8()?;
        Self::new(puzzle_count, weak_key_bits)
    }
}

/// Derive the AEAD key for one (salt, index, weak value) triple.
fn puzzle_key(
    board_salt: &[u8; SALT_SIZE],
    index: u32,
    weak_value: u32,
) -> Result<Zeroizing<[u8; suite::KEY_SIZE]>> {
    let mut info = Vec::with_capacity(WEAK_KEY_INFO.len() + 4);
    info.extend_from_slice(WEAK_KEY_INFO);
    info.extend_from_slice(&index.to_be_bytes());

    let ikm = Zeroizing::new(weak_value.to_be_bytes());
    suite::kdf_key(board_salt, ikm.as_ref(), &info)
}

/// Seal one puzzle.
///
/// Samples the w-bit weak value from `rng`, derives the puzzle key, and
/// seals `index ‖ candidate` with the board salt and index as associated
/// data. Returns the ciphertext (tag appended); the weak value is dropped
/// and survives only as the solver's search target.
pub fn make_puzzle<R: CryptoRng + RngCore>(
    rng: &mut R,
    index: u32,
    board_salt: &[u8; SALT_SIZE],
    candidate: &SecretBuffer<CANDIDATE_SIZE>,
    params: &PuzzleParameters,
) -> Result<Vec<u8>> {
    validate::parameter(
        index < params.puzzle_count(),
        "make_puzzle",
        "puzzle index out of range",
    )?;

    let weak_value = rng.next_u32() & params.weak_value_mask();
    let key = puzzle_key(board_salt, index, weak_value)?;

    let mut plaintext = Zeroizing::new([0u8; PLAINTEXT_SIZE]);
    plaintext[..4].copy_from_slice(&index.to_be_bytes());
    plaintext[4..].copy_from_slice(candidate.as_slice());

    let mut aad = [0u8; SALT_SIZE + 4];
    aad[..SALT_SIZE].copy_from_slice(board_salt);
    aad[SALT_SIZE..].copy_from_slice(&index.to_be_bytes());

    suite::seal(&key, u64::from(index), plaintext.as_ref(), &aad)
}

/// Outcome of a successful solve.
///
/// Debug output redacts the candidate through its buffer type; only the
/// attempt count prints.
#[derive(Debug)]
pub struct SolvedPuzzle {
    /// The recovered session key candidate.
    pub candidate: SecretBuffer<CANDIDATE_SIZE>,
    /// Trial decryptions spent, including the successful one. This is the
    /// quantity the work-asymmetry argument bounds.
    pub attempts: u64,
}

/// Solve one puzzle by exhausting its w-bit key space.
///
/// Iterates weak values in order, attempting an authenticated decryption
/// for each. The first ciphertext that authenticates and carries the
/// expected embedded index yields the candidate. Individual tag failures
/// are the normal texture of the search; only exhausting the ceiling is
/// an error.
///
/// # Errors
/// `BoardCorrupt` when no weak value within the ceiling authenticates, or
/// when an authenticated plaintext is malformed (wrong length or embedded
/// index) — both mean the board was not honestly constructed.
pub fn solve_puzzle(
    ciphertext: &[u8],
    index: u32,
    board_salt: &[u8; SALT_SIZE],
    params: &PuzzleParameters,
) -> Result<SolvedPuzzle> {
    let mut aad = [0u8; SALT_SIZE + 4];
    aad[..SALT_SIZE].copy_from_slice(board_salt);
    aad[SALT_SIZE..].copy_from_slice(&index.to_be_bytes());

    let mut attempts = 0u64;
    for weak_value in 0..params.attempt_ceiling() {
        attempts += 1;
        let key = puzzle_key(board_salt, index, weak_value as u32)?;

        let plaintext = match suite::open(&key, u64::from(index), ciphertext, &aad) {
            Ok(pt) => pt,
            Err(Error::TagMismatch { .. }) => continue,
            Err(e) => return Err(e),
        };

        // Authenticated but structurally wrong: a dishonest board, not a
        // near-miss of the search.
        if plaintext.len() != PLAINTEXT_SIZE || plaintext[..4] != index.to_be_bytes() {
            return Err(Error::BoardCorrupt {
                context: "solve_puzzle: authenticated plaintext malformed",
            });
        }

        let mut candidate = SecretBuffer::zeroed();
        candidate.as_mut_slice().copy_from_slice(&plaintext[4..]);
        return Ok(SolvedPuzzle {
            candidate,
            attempts,
        });
    }

    Err(Error::BoardCorrupt {
        context: "solve_puzzle: attempt ceiling exhausted",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn rng() -> ChaCha20Rng {
        ChaCha20Rng::seed_from_u64(0x9a11)
    }

    fn params(n: u32, w: u8) -> PuzzleParameters {
        PuzzleParameters::new(n, w).unwrap()
    }

    #[test]
    fn parameter_validation() {
        assert!(PuzzleParameters::new(2, 1).is_ok());
        assert!(PuzzleParameters::new(1024, 20).is_ok());
        assert!(PuzzleParameters::new(1, 8).is_err());
        assert!(PuzzleParameters::new(0, 8).is_err());
        assert!(PuzzleParameters::new(16, 0).is_err());
        assert!(PuzzleParameters::new(16, 33).is_err());
    }

    #[test]
    fn puzzle_round_trip() {
        let mut r = rng();
        let p = params(16, 6);
        let salt = [0x21u8; SALT_SIZE];
        let candidate = SecretBuffer::new([0x7cu8; CANDIDATE_SIZE]);

        let ct = make_puzzle(&mut r, 3, &salt, &candidate, &p).unwrap();
        let solved = solve_puzzle(&ct, 3, &salt, &p).unwrap();

        assert_eq!(solved.candidate, candidate);
        assert!(solved.attempts >= 1);
        assert!(solved.attempts <= p.attempt_ceiling());
    }

    #[test]
    fn solved_puzzle_debug_redacts_the_candidate() {
        let mut r = rng();
        let p = params(4, 4);
        let salt = [0x21u8; SALT_SIZE];
        let candidate = SecretBuffer::new([0x7cu8; CANDIDATE_SIZE]);

        let ct = make_puzzle(&mut r, 0, &salt, &candidate, &p).unwrap();
        let solved = solve_puzzle(&ct, 0, &salt, &p).unwrap();

        let rendered = format!("{:?}", solved);
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("7c"));
    }

    #[test]
    fn solve_fails_under_wrong_index() {
        let mut r = rng();
        let p = params(16, 4);
        let salt = [0x21u8; SALT_SIZE];
        let candidate = SecretBuffer::new([0x7cu8; CANDIDATE_SIZE]);

        let ct = make_puzzle(&mut r, 3, &salt, &candidate, &p).unwrap();
        let err = solve_puzzle(&ct, 4, &salt, &p).unwrap_err();
        assert!(matches!(err, Error::BoardCorrupt { .. }));
    }

    #[test]
    fn solve_fails_under_wrong_salt() {
        let mut r = rng();
        let p = params(16, 4);
        let candidate = SecretBuffer::new([0x7cu8; CANDIDATE_SIZE]);

        let ct = make_puzzle(&mut r, 0, &[0x21u8; SALT_SIZE], &candidate, &p).unwrap();
        let err = solve_puzzle(&ct, 0, &[0x22u8; SALT_SIZE], &p).unwrap_err();
        assert!(matches!(err, Error::BoardCorrupt { .. }));
    }

    #[test]
    fn tampered_ciphertext_exhausts_the_ceiling() {
        let mut r = rng();
        let p = params(16, 4);
        let salt = [0x21u8; SALT_SIZE];
        let candidate = SecretBuffer::new([0x7cu8; CANDIDATE_SIZE]);

        let mut ct = make_puzzle(&mut r, 5, &salt, &candidate, &p).unwrap();
        ct[0] ^= 1;
        let err = solve_puzzle(&ct, 5, &salt, &p).unwrap_err();
        assert!(matches!(err, Error::BoardCorrupt { .. }));
    }

    #[test]
    fn out_of_range_index_rejected_at_build() {
        let mut r = rng();
        let p = params(4, 4);
        let candidate = SecretBuffer::new([0u8; CANDIDATE_SIZE]);
        assert!(make_puzzle(&mut r, 4, &[0u8; SALT_SIZE], &candidate, &p).is_err());
    }

    #[test]
    fn expected_attempts_track_the_weak_key_width() {
        // With w = 8 over many puzzles, the mean solve cost must sit near
        // 2^(w-1) = 128 trials, the honest party's half-space expectation.
        let mut r = rng();
        let p = params(16, 8);
        let salt = [0x5fu8; SALT_SIZE];

        let mut total = 0u64;
        let runs = 64u64;
        for i in 0..runs {
            let candidate = SecretBuffer::new([i as u8; CANDIDATE_SIZE]);
            let ct = make_puzzle(&mut r, 0, &salt, &candidate, &p).unwrap();
            total += solve_puzzle(&ct, 0, &salt, &p).unwrap().attempts;
        }

        let mean = total / runs;
        assert!(
            (32..=224).contains(&mean),
            "mean solve cost {} far from 2^(w-1)",
            mean
        );
    }

    #[test]
    fn parameters_round_trip_on_the_wire() {
        let p = params(1024, 20);
        let mut w = WireWriter::new();
        p.encode(&mut w);
        let bytes = w.into_bytes();

        let mut r = WireReader::new(&bytes);
        let decoded = PuzzleParameters::decode(&mut r).unwrap();
        r.finish().unwrap();
        assert_eq!(decoded, p);
    }

    #[test]
    fn decoded_parameters_are_revalidated() {
        let mut w = WireWriter::new();
        w.put_u32(1); // N = 1 must not decode
        w.put_u8(8);
        let bytes = w.into_bytes();
        assert!(PuzzleParameters::decode(&mut WireReader::new(&bytes)).is_err());
    }
}
