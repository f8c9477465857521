//! # puzzlebox
//!
//! Key-agreement primitives: classical finite-field Diffie-Hellman and a
//! Merkle puzzle board, behind one protocol-agnostic session surface.
//!
//! ## Usage
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! puzzlebox = "0.1"
//! ```
//!
//! Run an exchange by picking a protocol and driving both sides:
//!
//! ```no_run
//! use puzzlebox::prelude::*;
//! use rand::rngs::OsRng;
//!
//! # fn main() -> Result<()> {
//! let params = PuzzleParameters::new(64, 16)?;
//! let mut alice = ExchangeSession::new(Protocol::PuzzleBoard(params), Role::Initiator);
//! let mut bob = ExchangeSession::new(Protocol::PuzzleBoard(params), Role::Responder);
//!
//! let initiation = alice.generate_initiation(&mut OsRng)?;
//! let confirmation = bob.respond(&mut OsRng, &initiation)?;
//! let alice_secret = alice.finalize(&mut OsRng, &confirmation)?;
//! let bob_secret = bob.take_shared_secret()?;
//! assert_eq!(alice_secret, bob_secret);
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Structure
//!
//! This is a facade crate that re-exports functionality from several
//! sub-crates:
//!
//! - [`api`]: error types, validation helpers, and the session traits
//! - [`common`]: zeroizing secret containers
//! - [`internal`]: constant-time primitives and the wire codec
//! - [`algorithms`]: modular arithmetic, primality, Merkle trees, and the
//!   fixed symmetric suite
//! - [`kex`]: the Diffie-Hellman and puzzle-board protocols themselves

#![forbid(unsafe_code)]

pub use puzzlebox_algorithms as algorithms;
pub use puzzlebox_api as api;
pub use puzzlebox_common as common;
pub use puzzlebox_internal as internal;
pub use puzzlebox_kex as kex;

/// Common imports for puzzlebox users
pub mod prelude {
    // Error handling
    pub use crate::api::{Error, Result};

    // Session traits
    pub use crate::api::{KeyExchange, Serialize, SerializeSecret};

    // The exchange surface
    pub use crate::kex::{
        DhExchange, ExchangeSession, GroupParameters, Message, Protocol, PuzzleBoardExchange,
        PuzzleParameters, Role,
    };

    // Secret containers
    pub use crate::api::SharedSecret;
    pub use crate::common::{SecretBuffer, SecretVec};
}
