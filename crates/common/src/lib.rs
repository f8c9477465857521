//! Shared secret-memory types for the puzzlebox workspace
//!
//! Every buffer in this workspace that ever holds a private exponent, a
//! session key candidate, a board salt, or derived key material lives in
//! one of the containers defined here, so zeroization on every exit path
//! is a property of the type rather than of call-site discipline.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod security;

pub use security::{SecretBuffer, SecretVec};
