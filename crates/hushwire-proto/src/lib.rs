//! Hushwire Message Protocol
//!
//! Self-describing, multi-version symmetric encryption for a peer-to-peer
//! messenger, plus a day-granularity forward-secrecy ratchet. Three wire
//! generations coexist on disk and all remain readable:
//!
//! ```text
//! v0  iv:ct[:iv:ct...]          legacy chunked AES-CBC, decrypt only
//! v1  [tag:]iv:ct               AES-GCM under a static session key
//! v2  tag:epoch:day:iv:ct       AES-GCM under a day-ratchet key
//! ```
//!
//! Encryption always emits the newest format for its key type: version 1
//! for static session keys, version 2 for ratchet states. Decryption sniffs
//! the version (structurally, for the tagless oldest generation) and
//! dispatches.
//!
//! # Boundaries
//!
//! Transport, storage, key exchange, and UI are external collaborators.
//! This crate consumes a `SessionKey` or shared secret they establish,
//! hands back plaintext and wire strings, and returns fresh
//! [`RatchetState`] values the persistence layer must store. Ratchet access
//! must be serialized per contact by the caller; see [`ratchet`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod protocol;
pub mod ratchet;
pub mod version;
pub mod wire;

pub use error::{ProtocolError, Result};
pub use hushwire_crypto::SessionKey;
pub use protocol::{decrypt_message, encrypt_message};
pub use ratchet::{
    RETENTION_DAYS, RatchetState, decrypt_ratchet_message, encrypt_ratchet_message,
    encrypt_ratchet_message_at, init_ratchet_state, init_ratchet_state_at,
};
pub use version::{Classified, ProtocolVersion, classify};
