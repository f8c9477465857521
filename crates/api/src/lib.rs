//! Public API traits and types for the puzzlebox key-agreement library
//!
//! This crate defines the contract every protocol implementation in the
//! workspace honors: the error taxonomy, the byte-serialization split
//! between public and secret material, the opaque [`SharedSecret`], and the
//! [`KeyExchange`] capability set both protocol variants expose.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{validate, Error, Result};
pub use traits::{KeyExchange, Serialize, SerializeSecret};
pub use types::SharedSecret;
