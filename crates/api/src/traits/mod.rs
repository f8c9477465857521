//! Public traits for the puzzlebox library

pub mod exchange;
pub mod serialize;

pub use exchange::KeyExchange;
pub use serialize::{Serialize, SerializeSecret};
