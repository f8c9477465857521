//! Puzzle board construction, commitment, and verified reception
//!
//! The sender builds N puzzles under one fresh board salt and commits to
//! their ciphertexts with a Merkle root. The root is the first thing on
//! the wire; after that, every ciphertext the receiver accepts must carry
//! an inclusion proof against it. A ciphertext that fails its proof is
//! discarded before it can reach the solver, which closes the
//! post-commitment substitution channel: once the root is out, no puzzle
//! can be altered, added, or removed without detection.
//!
//! The receiver picks one verified puzzle uniformly at random, solves it,
//! and confirms by index only — the recovered candidate never crosses the
//! wire.

use crate::puzzle::{
    make_puzzle, solve_puzzle, PuzzleParameters, SolvedPuzzle, CANDIDATE_SIZE, SALT_SIZE,
};
use puzzlebox_algorithms::merkle::{verify_proof, MerkleProof, MerkleTree, DIGEST_SIZE};
use puzzlebox_api::{validate, Error, Result, SharedSecret};
use puzzlebox_common::SecretBuffer;
use puzzlebox_internal::{WireReader, WireWriter};
use rand::{CryptoRng, Rng, RngCore};

/// Sender-side board: puzzles, their candidates, and the commitment tree.
///
/// The candidates stay here until one is confirmed; they are held in
/// zeroize-on-drop buffers and wiped when the board is dropped.
pub struct PuzzleBoard {
    params: PuzzleParameters,
    salt: SecretBuffer<SALT_SIZE>,
    candidates: Vec<SecretBuffer<CANDIDATE_SIZE>>,
    ciphertexts: Vec<Vec<u8>>,
    tree: MerkleTree,
}

impl PuzzleBoard {
    /// Generate a full board: fresh salt, N fresh candidates, N puzzles,
    /// and the Merkle tree over the ciphertexts.
    ///
    /// The tree is built to completion before the root is readable, so
    /// the commitment can never describe a half-constructed board.
    pub fn build<R: CryptoRng + RngCore>(rng: &mut R, params: &PuzzleParameters) -> Result<Self> {
        let mut salt = SecretBuffer::zeroed();
        rng.fill_bytes(salt.as_mut_slice());

        let count = params.puzzle_count() as usize;
        let mut candidates = Vec::with_capacity(count);
        let mut ciphertexts = Vec::with_capacity(count);

        for index in 0..params.puzzle_count() {
            let mut candidate = SecretBuffer::zeroed();
            rng.fill_bytes(candidate.as_mut_slice());

            let salt_bytes = salt_array(&salt);
            let ciphertext = make_puzzle(rng, index, &salt_bytes, &candidate, params)?;
            candidates.push(candidate);
            ciphertexts.push(ciphertext);
        }

        let tree = MerkleTree::build(&ciphertexts)?;
        Ok(Self {
            params: *params,
            salt,
            candidates,
            ciphertexts,
            tree,
        })
    }

    /// The committed Merkle root. Message 1 of the exchange.
    pub fn commitment(&self) -> [u8; DIGEST_SIZE] {
        self.tree.root()
    }

    /// Assemble the board transmission: salt, every ciphertext, and an
    /// inclusion proof per ciphertext. Message 2 of the exchange.
    pub fn transmission(&self) -> Result<BoardTransmission> {
        let mut puzzles = Vec::with_capacity(self.ciphertexts.len());
        for (index, ciphertext) in self.ciphertexts.iter().enumerate() {
            puzzles.push((ciphertext.clone(), self.tree.prove(index)?));
        }
        Ok(BoardTransmission {
            params: self.params,
            salt: salt_array(&self.salt),
            puzzles,
        })
    }

    /// Look up the candidate the receiver confirmed. Message 3 lands here.
    ///
    /// # Errors
    /// `InvalidParameter` if the confirmed index is out of range.
    pub fn confirm(&self, index: u32) -> Result<SharedSecret> {
        let candidate = self.candidates.get(index as usize).ok_or_else(|| {
            Error::InvalidParameter {
                context: "PuzzleBoard::confirm",
                message: "confirmed index out of range".to_string(),
            }
        })?;
        Ok(SharedSecret::new(candidate.as_slice().to_vec()))
    }
}

fn salt_array(salt: &SecretBuffer<SALT_SIZE>) -> [u8; SALT_SIZE] {
    let mut out = [0u8; SALT_SIZE];
    out.copy_from_slice(salt.as_slice());
    out
}

/// Wire form of a full board: parameters echo, salt, and proof-carrying
/// ciphertexts in board order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardTransmission {
    /// Parameter echo; the receiver checks it against its own copy.
    pub params: PuzzleParameters,
    /// The board salt all weak keys are derived under.
    pub salt: [u8; SALT_SIZE],
    /// `(ciphertext, proof)` pairs, one per puzzle, in index order.
    pub puzzles: Vec<(Vec<u8>, MerkleProof)>,
}

impl BoardTransmission {
    /// Append the transmission to an in-progress wire message.
    pub fn encode(&self, w: &mut WireWriter) {
        self.params.encode(w);
        w.put_bytes(&self.salt);
        w.put_u32(self.puzzles.len() as u32);
        for (ciphertext, proof) in &self.puzzles {
            w.put_bytes(ciphertext);
            proof.encode(w);
        }
    }

    /// Decode a transmission from an in-progress wire message.
    pub fn decode(r: &mut WireReader<'_>) -> Result<Self> {
        let params = PuzzleParameters::decode(r)?;
        let salt = r.fixed::<SALT_SIZE>()?;
        let count = r.u32()?;
        if count != params.puzzle_count() {
            return Err(Error::BoardCorrupt {
                context: "BoardTransmission::decode: puzzle count does not match parameters",
            });
        }

        // The count is attacker-controlled; every puzzle occupies at
        // least one input byte, so the remaining input bounds how much
        // can honestly follow. A hostile count then fails as truncation
        // instead of driving an allocation of its own size.
        let mut puzzles = Vec::with_capacity((count as usize).min(r.remaining()));
        for _ in 0..count {
            let ciphertext = r.bytes()?.to_vec();
            let proof = MerkleProof::decode(r)?;
            puzzles.push((ciphertext, proof));
        }
        Ok(Self {
            params,
            salt,
            puzzles,
        })
    }
}

/// Receiver-side board holding only proof-verified ciphertexts.
///
/// Constructing one is the only way puzzle ciphertexts become eligible
/// for solving, so an unverified ciphertext cannot reach the solver by
/// construction.
#[derive(Debug)]
pub struct VerifiedBoard {
    params: PuzzleParameters,
    salt: [u8; SALT_SIZE],
    /// `(board index, ciphertext)` for every puzzle that proved inclusion.
    puzzles: Vec<(u32, Vec<u8>)>,
}

impl VerifiedBoard {
    /// Verify a received transmission against the previously received
    /// commitment root.
    ///
    /// Every ciphertext is checked via its inclusion proof at its claimed
    /// board position; failures are discarded. The parameters echo must
    /// match the receiver's own copy.
    ///
    /// # Errors
    /// `GroupMismatch` when the parameter copies differ; `BoardCorrupt`
    /// when the transmission shape is wrong or no puzzle survives
    /// verification.
    pub fn receive(
        expected_root: &[u8; DIGEST_SIZE],
        transmission: &BoardTransmission,
        local_params: &PuzzleParameters,
    ) -> Result<Self> {
        if transmission.params != *local_params {
            return Err(Error::GroupMismatch {
                context: "puzzle parameter copies differ",
            });
        }
        validate::board(
            transmission.puzzles.len() == local_params.puzzle_count() as usize,
            "transmission does not carry the full board",
        )?;

        let mut puzzles = Vec::with_capacity(transmission.puzzles.len());
        for (index, (ciphertext, proof)) in transmission.puzzles.iter().enumerate() {
            // In-order transmission: a proof claiming a different slot is
            // a substitution attempt, not an alignment quirk.
            if proof.leaf_index != index as u32 {
                continue;
            }
            if verify_proof(expected_root, ciphertext, proof) {
                puzzles.push((index as u32, ciphertext.clone()));
            }
        }

        validate::board(
            !puzzles.is_empty(),
            "no puzzle ciphertext verified against the commitment",
        )?;

        Ok(Self {
            params: *local_params,
            salt: transmission.salt,
            puzzles,
        })
    }

    /// Number of puzzles that survived proof verification.
    pub fn verified_count(&self) -> usize {
        self.puzzles.len()
    }

    /// Pick one verified puzzle uniformly at random and solve it.
    ///
    /// Returns the confirmed index (the only thing sent back) and the
    /// solve outcome carrying the candidate and the trial count.
    ///
    /// # Errors
    /// `BoardCorrupt` if the chosen puzzle exhausts its solve ceiling;
    /// the board is abandoned, never silently retried.
    pub fn choose_and_solve<R: CryptoRng + RngCore>(
        &self,
        rng: &mut R,
    ) -> Result<(u32, SolvedPuzzle)> {
        let pick = rng.gen_range(0..self.puzzles.len());
        let (index, ciphertext) = &self.puzzles[pick];
        let solved = solve_puzzle(ciphertext, *index, &self.salt, &self.params)?;
        Ok((*index, solved))
    }

    /// Solve the puzzle at a specific board index. Test harnesses use
    /// this for deterministic runs; the protocol path goes through
    /// [`VerifiedBoard::choose_and_solve`].
    pub fn solve_at(&self, board_index: u32) -> Result<SolvedPuzzle> {
        let (_, ciphertext) = self
            .puzzles
            .iter()
            .find(|(i, _)| *i == board_index)
            .ok_or(Error::BoardCorrupt {
                context: "solve_at: index not among verified puzzles",
            })?;
        solve_puzzle(ciphertext, board_index, &self.salt, &self.params)
    }

}

#[cfg(test)]
mod tests;
