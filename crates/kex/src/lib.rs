//! Key-agreement protocols for the puzzlebox library
//!
//! Two interoperable ways for two parties to establish a shared secret
//! over an untrusted channel:
//!
//! - [`dh`]: classical finite-field Diffie-Hellman over validated group
//!   parameters, with subgroup-confinement defenses and blinded
//!   exponentiation.
//! - [`board`] + [`puzzle`]: a Merkle puzzle board. The sender commits to
//!   N weakly encrypted puzzles with a Merkle root before revealing them;
//!   the receiver verifies every puzzle against the commitment, solves one
//!   chosen uniformly at random, and confirms it by index only. The honest
//!   receiver spends Θ(2^w) trial decryptions; an eavesdropper who must
//!   locate the right puzzle spends Θ(N·2^w).
//!
//! [`session`] puts both behind the uniform [`KeyExchange`] capability
//! set, selected once at session creation.
//!
//! [`KeyExchange`]: puzzlebox_api::KeyExchange

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod board;
pub mod dh;
pub mod group;
pub mod puzzle;
pub mod session;

pub use board::{BoardTransmission, PuzzleBoard, VerifiedBoard};
pub use dh::DhKeyPair;
pub use group::GroupParameters;
pub use puzzle::{PuzzleParameters, SolvedPuzzle};
pub use session::{DhExchange, ExchangeSession, Message, Protocol, PuzzleBoardExchange, Role};
