//! Collaborator primitives: hash, KDF, and authenticated encryption
//!
//! The protocols consume their cryptographic collaborators through the
//! narrow functions in this module and nowhere else: SHA-256 for Merkle
//! hashing, HKDF-SHA256 for key derivation, ChaCha20-Poly1305 for puzzle
//! sealing. Swapping a collaborator means touching this file only.
//!
//! The AEAD's tag check is constant-time inside the cipher implementation;
//! a failure surfaces as `TagMismatch` with no detail about where the
//! comparison diverged.

use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use hkdf::Hkdf;
use puzzlebox_api::{Error, Result};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

/// Symmetric key width used by the AEAD collaborator.
pub const KEY_SIZE: usize = 32;

/// AEAD nonce width (ChaCha20-Poly1305).
pub const NONCE_SIZE: usize = 12;

/// AEAD authentication tag width.
pub const TAG_SIZE: usize = 16;

/// Hash a byte string with the collision-resistant hash collaborator.
pub fn hash(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Derive `output_len` bytes of key material with HKDF-SHA256.
///
/// # Errors
/// `InvalidParameter` if `output_len` exceeds the HKDF expansion limit
/// (255 * 32 bytes).
pub fn kdf(salt: &[u8], ikm: &[u8], info: &[u8], output_len: usize) -> Result<Zeroizing<Vec<u8>>> {
    let hk = Hkdf::<Sha256>::new(Some(salt), ikm);
    let mut okm = Zeroizing::new(vec![0u8; output_len]);
    hk.expand(info, &mut okm).map_err(|_| Error::InvalidParameter {
        context: "suite::kdf",
        message: "requested output length exceeds HKDF limit".to_string(),
    })?;
    Ok(okm)
}

/// Derive one AEAD key with HKDF-SHA256.
pub fn kdf_key(salt: &[u8], ikm: &[u8], info: &[u8]) -> Result<Zeroizing<[u8; KEY_SIZE]>> {
    let okm = kdf(salt, ikm, info, KEY_SIZE)?;
    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    key.copy_from_slice(&okm);
    Ok(key)
}

/// Build a 12-byte AEAD nonce from a counter.
///
/// Layout: four zero bytes, then the counter big-endian. Keys in this
/// workspace are single-use or indexed per puzzle, so a counter nonce can
/// never repeat under one key.
pub fn nonce_from_counter(counter: u64) -> [u8; NONCE_SIZE] {
    let mut nonce = [0u8; NONCE_SIZE];
    nonce[4..].copy_from_slice(&counter.to_be_bytes());
    nonce
}

/// Encrypt and authenticate `plaintext` under `key`.
///
/// The returned ciphertext carries the 16-byte tag appended.
pub fn seal(key: &[u8; KEY_SIZE], counter: u64, plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key));
    let nonce = nonce_from_counter(counter);
    cipher
        .encrypt(
            Nonce::from_slice(&nonce),
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|_| Error::Other {
            context: "suite::seal",
            message: "AEAD encryption failed".to_string(),
        })
}

/// Decrypt and verify `ciphertext` under `key`.
///
/// # Errors
/// `TagMismatch` when authentication fails; the plaintext is returned in a
/// zeroize-on-drop buffer otherwise.
pub fn open(
    key: &[u8; KEY_SIZE],
    counter: u64,
    ciphertext: &[u8],
    aad: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key));
    let nonce = nonce_from_counter(counter);
    cipher
        .decrypt(
            Nonce::from_slice(&nonce),
            Payload {
                msg: ciphertext,
                aad,
            },
        )
        .map(Zeroizing::new)
        .map_err(|_| Error::TagMismatch {
            context: "suite::open",
        })
}
