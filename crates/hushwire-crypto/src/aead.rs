//! Authenticated encryption using AES-256-GCM
//!
//! AES-256-GCM provides:
//! - 256-bit key security
//! - 96-bit nonces, generated fresh from the OS CSPRNG on every call
//! - Authenticated encryption: tampering is detected at decrypt time
//!
//! # Security
//!
//! Nonce reuse under the same key breaks GCM completely, so this module
//! never accepts a caller-supplied nonce for encryption. [`seal`] draws a
//! fresh random nonce internally and returns it alongside the ciphertext.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, AeadCore, KeyInit, OsRng},
};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::CryptoError;

/// AEAD key size in bytes (AES-256)
pub const KEY_SIZE: usize = 32;

/// AEAD nonce size in bytes (GCM standard 96-bit nonce)
pub const NONCE_SIZE: usize = 12;

/// GCM authentication tag size in bytes
pub const TAG_SIZE: usize = 16;

/// A 256-bit symmetric AEAD key.
///
/// One per contact for the non-ratchet protocol (produced by an external
/// key-exchange step), or one per day inside a ratchet state. Immutable for
/// its lifetime; key material is zeroized on drop.
///
/// `Debug` is intentionally not derived so key bytes can never leak through
/// logging or error formatting.
#[derive(Clone, Serialize, Deserialize)]
pub struct SessionKey([u8; KEY_SIZE]);

/// The manual impl keeps the key bytes out of the output; only a redacted
/// placeholder is ever formatted.
impl core::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SessionKey([REDACTED])")
    }
}

impl SessionKey {
    /// Wrap raw key material as a session key.
    pub fn new(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Wrap a byte slice as a session key.
    ///
    /// # Errors
    ///
    /// - `InvalidKeyLength` if the slice is not exactly 32 bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let bytes: [u8; KEY_SIZE] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidKeyLength { expected: KEY_SIZE, actual: bytes.len() })?;
        Ok(Self(bytes))
    }

    /// Raw key material.
    ///
    /// Exposed for re-import into other cipher modes (legacy path) and for
    /// the ratchet derivation chain. Callers must not copy this out of
    /// tightly scoped code and must never log it.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl Drop for SessionKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Encrypt a payload under a session key.
///
/// Returns the freshly generated 12-byte nonce and the ciphertext
/// (plaintext length plus a 16-byte authentication tag).
///
/// # Security
///
/// The nonce comes from the OS CSPRNG on every call. Two encryptions of the
/// same plaintext under the same key therefore produce different output.
pub fn seal(key: &SessionKey, plaintext: &[u8]) -> ([u8; NONCE_SIZE], Vec<u8>) {
    let cipher = Aes256Gcm::new(key.as_bytes().into());
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let Ok(ciphertext) = cipher.encrypt(&nonce, plaintext) else {
        unreachable!("AES-GCM encryption cannot fail with valid inputs");
    };

    (nonce.into(), ciphertext)
}

/// Decrypt a payload under a session key.
///
/// # Errors
///
/// - `InvalidNonceLength` if the nonce is not 12 bytes
/// - `AuthenticationFailure` if the tag does not verify or the ciphertext
///   is truncated or corrupted
pub fn open(key: &SessionKey, nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if nonce.len() != NONCE_SIZE {
        return Err(CryptoError::InvalidNonceLength {
            expected: NONCE_SIZE,
            actual: nonce.len(),
        });
    }

    let cipher = Aes256Gcm::new(key.as_bytes().into());
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| CryptoError::AuthenticationFailure)
}
