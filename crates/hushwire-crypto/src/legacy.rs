//! Legacy chunked cipher mode (AES-256-CBC), decrypt only
//!
//! The oldest protocol generation split plaintext into fixed-size chunks and
//! encrypted each chunk independently under AES-256-CBC with a per-chunk IV.
//! This module decrypts a single such chunk; the protocol layer reassembles
//! the chunk sequence.
//!
//! # Security
//!
//! CBC provides no authentication: corrupted ciphertext decrypts to garbage
//! rather than failing explicitly (PKCS7 unpadding catches only a fraction
//! of corruptions). Callers must not trust the integrity of anything decoded
//! through this path. It exists solely to keep historically stored messages
//! readable, which is why no encryption function is exported.

use aes::Aes256;
use cbc::cipher::{BlockDecryptMut, KeyIvInit, block_padding::Pkcs7};

use crate::{aead::SessionKey, error::CryptoError};

/// Legacy IV size in bytes (one AES block)
pub const IV_SIZE: usize = 16;

/// AES block size in bytes
const BLOCK_SIZE: usize = 16;

type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Decrypt a single legacy chunk.
///
/// The session key is the same 256-bit key used by the AEAD path,
/// reimported here for the CBC mode.
///
/// # Errors
///
/// - `InvalidIvLength` if the IV is not 16 bytes
/// - `InvalidPadding` if the ciphertext length is not a whole number of
///   blocks or the PKCS7 padding is inconsistent after decryption
pub fn decrypt_chunk(
    key: &SessionKey,
    iv: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let iv: [u8; IV_SIZE] = iv
        .try_into()
        .map_err(|_| CryptoError::InvalidIvLength { expected: IV_SIZE, actual: iv.len() })?;

    if ciphertext.is_empty() || !ciphertext.len().is_multiple_of(BLOCK_SIZE) {
        return Err(CryptoError::InvalidPadding);
    }

    let decryptor = Aes256CbcDec::new(key.as_bytes().into(), (&iv).into());
    decryptor
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CryptoError::InvalidPadding)
}

#[cfg(test)]
mod tests {
    use cbc::cipher::{BlockEncryptMut, block_padding::Pkcs7 as EncPkcs7};

    use super::*;

    type Aes256CbcEnc = cbc::Encryptor<Aes256>;

    fn test_key() -> SessionKey {
        let mut bytes = [0u8; 32];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = i as u8;
        }
        SessionKey::new(bytes)
    }

    // Test-only encryptor; production code never emits this mode.
    fn encrypt_chunk(key: &SessionKey, iv: &[u8; IV_SIZE], plaintext: &[u8]) -> Vec<u8> {
        let encryptor = Aes256CbcEnc::new(key.as_bytes().into(), iv.into());
        encryptor.encrypt_padded_vec_mut::<EncPkcs7>(plaintext)
    }

    #[test]
    fn decrypts_a_chunk() {
        let key = test_key();
        let iv = [0xABu8; IV_SIZE];
        let plaintext = b"a historically stored chunk";

        let ciphertext = encrypt_chunk(&key, &iv, plaintext);
        let decrypted = decrypt_chunk(&key, &iv, &ciphertext).unwrap();

        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn decrypts_block_aligned_plaintext() {
        let key = test_key();
        let iv = [0x01u8; IV_SIZE];
        let plaintext = [0x55u8; 32]; // exactly two blocks before padding

        let ciphertext = encrypt_chunk(&key, &iv, &plaintext);
        // PKCS7 adds a full padding block for aligned input
        assert_eq!(ciphertext.len(), 48);

        let decrypted = decrypt_chunk(&key, &iv, &ciphertext).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn rejects_bad_iv_length() {
        let key = test_key();
        let result = decrypt_chunk(&key, &[0u8; 12], &[0u8; 16]);
        assert!(matches!(
            result,
            Err(CryptoError::InvalidIvLength { expected: 16, actual: 12 })
        ));
    }

    #[test]
    fn rejects_partial_block() {
        let key = test_key();
        let iv = [0u8; IV_SIZE];
        let result = decrypt_chunk(&key, &iv, &[0u8; 17]);
        assert!(matches!(result, Err(CryptoError::InvalidPadding)));
    }

    #[test]
    fn rejects_empty_ciphertext() {
        let key = test_key();
        let iv = [0u8; IV_SIZE];
        let result = decrypt_chunk(&key, &iv, &[]);
        assert!(matches!(result, Err(CryptoError::InvalidPadding)));
    }

    #[test]
    fn corruption_is_not_reliably_detected() {
        // No authentication in this mode: flipping ciphertext bits usually
        // still "succeeds" and yields garbage. Only assert that decryption
        // does not recover the original plaintext.
        let key = test_key();
        let iv = [0x07u8; IV_SIZE];
        let plaintext = vec![0x61u8; 64];

        let mut ciphertext = encrypt_chunk(&key, &iv, &plaintext);
        ciphertext[0] ^= 0xFF;

        if let Ok(garbage) = decrypt_chunk(&key, &iv, &ciphertext) {
            assert_ne!(garbage, plaintext);
        }
    }

    #[test]
    fn wrong_key_yields_garbage_or_padding_error() {
        let key = test_key();
        let iv = [0x09u8; IV_SIZE];
        let plaintext = b"chunk under the right key";

        let ciphertext = encrypt_chunk(&key, &iv, plaintext);

        let wrong_key = SessionKey::new([0xEE; 32]);
        if let Ok(garbage) = decrypt_chunk(&wrong_key, &iv, &ciphertext) {
            assert_ne!(garbage, plaintext.to_vec());
        }
    }
}
