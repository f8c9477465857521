//! Internal utilities shared across the puzzlebox workspace
//!
//! This crate carries the two low-level concerns every other crate leans on:
//! constant-time operations over byte material and the length-prefixed wire
//! codec used for every transmitted protocol field. Nothing in here is
//! protocol-aware.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod constant_time;
pub mod wire;

pub use constant_time::ct_eq;
pub use wire::{WireReader, WireWriter, MAX_FIELD_LEN};
