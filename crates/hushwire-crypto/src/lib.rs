//! Hushwire Cryptographic Primitives
//!
//! Cryptographic building blocks for the Hushwire message protocol. This
//! crate knows nothing about wire formats or protocol versions; it provides
//! the ciphers and the one-way key chain the protocol layer composes.
//!
//! # Key Lifecycle
//!
//! A per-contact shared secret (from an external key exchange) either acts
//! directly as AEAD key material, or seeds a day-granularity hash chain
//! whose links are the per-day encryption keys:
//!
//! ```text
//! Shared Secret
//!        │
//!        ▼ SHA-256(· ‖ salt)
//! Day Key 0 ──► Day Key 1 ──► Day Key 2 ──► ...
//!        │
//!        ▼
//! AES-256-GCM → Ciphertext
//! ```
//!
//! Advancing the chain is one-way: a peer that has dropped day n's key can
//! never reconstruct it, which is what makes expired messages permanently
//! undecryptable (forward secrecy on a daily cadence).
//!
//! # Security
//!
//! - AEAD path (AES-256-GCM): tamper-evident, random 96-bit nonce per call
//! - Legacy path (AES-256-CBC): unauthenticated, decrypt-only, kept solely
//!   for messages stored before the protocol gained authentication
//! - All key material is zeroized on drop and never exposed via `Debug`

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod aead;
pub mod error;
pub mod kdf;
pub mod legacy;

pub use aead::{KEY_SIZE, NONCE_SIZE, SessionKey, open, seal};
pub use error::CryptoError;
pub use kdf::{derive_day_zero_key, next_day_key};
pub use legacy::{IV_SIZE, decrypt_chunk};
