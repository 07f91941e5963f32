//! Versioned message protocol for static session keys
//!
//! Encryption always emits the newest non-ratchet format (tagged version 1,
//! AES-GCM). Decryption accepts everything ever written to disk: tagged and
//! untagged GCM messages, and the unauthenticated legacy chunk trains of
//! version 0. Ratchet messages (version 2) carry evolving per-day keys and
//! cannot be decrypted with a static session key; they must be routed to
//! [`crate::ratchet::decrypt_ratchet_message`] by the caller.

use hushwire_crypto::SessionKey;

use crate::{
    error::{ProtocolError, Result},
    version::{ProtocolVersion, classify},
    wire,
};

/// Encrypt a plaintext under a static session key.
///
/// Always produces the tagged version-1 format:
/// `b64("1"):b64(nonce):b64(ciphertext)`.
///
/// # Errors
///
/// - `KeyNotInitialized` if no key is present (key exchange incomplete)
pub fn encrypt_message(key: Option<&SessionKey>, plaintext: &str) -> Result<String> {
    let key = key.ok_or(ProtocolError::KeyNotInitialized)?;

    let (nonce, ciphertext) = hushwire_crypto::seal(key, plaintext.as_bytes());

    Ok(format!(
        "{}:{}:{}",
        wire::encode_version_tag(ProtocolVersion::Gcm.number()),
        wire::encode_segment(&nonce),
        wire::encode_segment(&ciphertext),
    ))
}

/// Decrypt a wire message under a static session key, dispatching on the
/// sniffed protocol version.
///
/// # Errors
///
/// - `KeyNotInitialized` if no key is present
/// - `MalformedMessage` / `UnknownProtocolVersion` from classification
/// - `UnsupportedVersion` for ratchet-tagged messages, which need a
///   `RatchetState` rather than a session key
/// - `AuthenticationFailure` (as `Crypto`) if the GCM tag does not verify
pub fn decrypt_message(key: Option<&SessionKey>, message: &str) -> Result<String> {
    let key = key.ok_or(ProtocolError::KeyNotInitialized)?;

    let classified = classify(message)?;
    tracing::debug!(version = classified.version.number(), "classified inbound message");

    match classified.version {
        ProtocolVersion::Gcm => decrypt_gcm(key, classified.body),
        ProtocolVersion::LegacyChunked => decrypt_legacy_chunked(key, classified.body),
        ProtocolVersion::DayRatchet => Err(ProtocolError::UnsupportedVersion {
            version: ProtocolVersion::DayRatchet.number(),
        }),
    }
}

/// Decrypt a version-1 body (`nonce:ciphertext`).
fn decrypt_gcm(key: &SessionKey, body: &str) -> Result<String> {
    let (nonce_segment, ct_segment) = body
        .split_once(wire::SEPARATOR)
        .ok_or(ProtocolError::MalformedMessage { reason: "missing ciphertext segment" })?;

    let nonce = wire::decode_segment(nonce_segment)?;
    let ciphertext = wire::decode_segment(ct_segment)?;

    let plaintext = hushwire_crypto::open(key, &nonce, &ciphertext)?;
    wire::utf8_plaintext(plaintext)
}

/// Decrypt a version-0 chunk train (`iv:ct[:iv:ct...]`).
///
/// Each chunk is decrypted independently under the session key reimported
/// for the CBC mode, and the decrypted chunks are concatenated in order.
/// This path has no integrity protection; it is never used for encryption.
fn decrypt_legacy_chunked(key: &SessionKey, body: &str) -> Result<String> {
    let segments: Vec<&str> = body.split(wire::SEPARATOR).collect();
    if segments.len() < 2 || segments.len() % 2 != 0 {
        return Err(ProtocolError::MalformedMessage {
            reason: "legacy message needs an even number of segments",
        });
    }

    let mut plaintext = Vec::new();
    for pair in segments.chunks_exact(2) {
        let iv = wire::decode_segment(pair[0])?;
        let chunk_ciphertext = wire::decode_segment(pair[1])?;
        plaintext.extend(hushwire_crypto::decrypt_chunk(key, &iv, &chunk_ciphertext)?);
    }

    wire::utf8_plaintext(plaintext)
}
