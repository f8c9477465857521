//! Traits for byte serialization of key-agreement types.

use crate::Result;
use zeroize::Zeroizing;

/// A trait for public types that can be serialized to and from bytes.
///
/// Implementors must validate on the way in: `from_bytes` is the boundary
/// where attacker-controlled bytes become typed values.
pub trait Serialize: Sized {
    /// Creates an object from a byte slice, validating it.
    fn from_bytes(bytes: &[u8]) -> Result<Self>;
    /// Converts the object to its wire encoding.
    fn to_bytes(&self) -> Vec<u8>;
}

/// A trait for secret types that can be securely serialized.
///
/// Secret material only ever leaves through [`Zeroizing`], so every
/// serialized copy is wiped when dropped.
pub trait SerializeSecret: Sized {
    /// Creates an object from a byte slice. Input should be zeroized after use.
    fn from_bytes(bytes: &[u8]) -> Result<Self>;
    /// Converts the object to a byte vector that is zeroized on drop.
    fn to_bytes_zeroizing(&self) -> Zeroizing<Vec<u8>>;
}
