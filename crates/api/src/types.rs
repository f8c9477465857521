//! Core public types

use crate::traits::SerializeSecret;
use crate::Result;
use puzzlebox_internal::ct_eq;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Opaque shared secret produced by a completed exchange.
///
/// The contents are raw agreement output: fixed-width big-endian group
/// element bytes for Diffie-Hellman, a 32-byte session key candidate for
/// the puzzle board. Either way the bytes must be expanded through a KDF
/// before use as a symmetric key.
///
/// Equality is constant-time, `Debug` is redacted, and the buffer is
/// zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret {
    bytes: Vec<u8>,
}

impl SharedSecret {
    /// Wrap agreement output as a shared secret.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Borrow the secret bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Length of the secret in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl PartialEq for SharedSecret {
    fn eq(&self, other: &Self) -> bool {
        ct_eq(&self.bytes, &other.bytes)
    }
}

impl Eq for SharedSecret {}

impl core::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "SharedSecret({} bytes, [REDACTED])", self.bytes.len())
    }
}

impl SerializeSecret for SharedSecret {
    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            bytes: bytes.to_vec(),
        })
    }

    fn to_bytes_zeroizing(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.bytes.clone())
    }
}
