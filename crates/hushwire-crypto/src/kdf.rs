//! One-way key chain for the day ratchet
//!
//! Day keys form a hash chain: `key(n+1) = SHA-256(key(n) ‖ SALT)`. The
//! chain has no inverse, so once a day's key has been dropped it can never
//! be reconstructed. This is the forward-secrecy property of the protocol.
//!
//! # Security
//!
//! - One-way: deriving day n+1 requires the raw bytes of day n, never the
//!   other way around
//! - Sequential: advancing k days costs k hash invocations by design; there
//!   is no shortcut to a future key without passing through every day in
//!   between
//! - Deterministic: both peers derive identical chains from the same shared
//!   secret

use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use crate::aead::{KEY_SIZE, SessionKey};

/// Domain-separation salt appended to every chain step
const RATCHET_SALT: &[u8] = b"hushwire.day-ratchet.v2";

/// Core chain step: `SHA-256(ikm ‖ SALT)`.
///
/// Pure bytes-to-bytes so the hashing core has no dependency on a specific
/// key type; key import/export happens at the boundary.
fn ratchet_digest(ikm: &[u8]) -> [u8; KEY_SIZE] {
    let mut hasher = Sha256::new();
    hasher.update(ikm);
    hasher.update(RATCHET_SALT);
    hasher.finalize().into()
}

/// Derive the day-zero key from the externally established shared secret.
pub fn derive_day_zero_key(shared_secret: &[u8]) -> SessionKey {
    let mut digest = ratchet_digest(shared_secret);
    let key = SessionKey::new(digest);
    digest.zeroize();
    key
}

/// Derive the next day's key from the current day's key.
///
/// The raw key material is exported, hashed, and the intermediate buffer
/// zeroized before returning.
pub fn next_day_key(current: &SessionKey) -> SessionKey {
    let mut digest = ratchet_digest(current.as_bytes());
    let key = SessionKey::new(digest);
    digest.zeroize();
    key
}
