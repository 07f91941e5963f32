//! Error types for cryptographic operations

use thiserror::Error;

/// Errors from the cryptographic primitives.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// AEAD tag verification failed, or the ciphertext was truncated or
    /// corrupted. The message cannot be recovered.
    #[error("authentication failed: tag mismatch or corrupted ciphertext")]
    AuthenticationFailure,

    /// Invalid key material length
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected key length in bytes
        expected: usize,
        /// Actual key length in bytes
        actual: usize,
    },

    /// Invalid nonce length for the AEAD cipher
    #[error("invalid nonce length: expected {expected}, got {actual}")]
    InvalidNonceLength {
        /// Expected nonce length in bytes
        expected: usize,
        /// Actual nonce length in bytes
        actual: usize,
    },

    /// Invalid IV length for the legacy block cipher
    #[error("invalid legacy iv length: expected {expected}, got {actual}")]
    InvalidIvLength {
        /// Expected IV length in bytes
        expected: usize,
        /// Actual IV length in bytes
        actual: usize,
    },

    /// Legacy chunk could not be unpadded after decryption.
    ///
    /// The legacy mode is unauthenticated, so most corruption decrypts to
    /// garbage silently. A padding failure is the only corruption the legacy
    /// path can detect at all.
    #[error("legacy chunk has invalid padding")]
    InvalidPadding,
}
