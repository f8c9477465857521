//! Security-related memory types

mod secret;

pub use secret::{SecretBuffer, SecretVec};
