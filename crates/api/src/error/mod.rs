//! Error handling for key-agreement operations

pub mod types;
pub mod validate;

pub use types::{Error, Result};

impl From<puzzlebox_internal::wire::WireError> for Error {
    fn from(e: puzzlebox_internal::wire::WireError) -> Self {
        Self::SerializationError {
            context: "wire decoding",
            message: e.to_string(),
        }
    }
}

impl std::error::Error for Error {}
