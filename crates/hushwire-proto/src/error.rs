//! Error types for the versioned message protocol
//!
//! Every variant is fatal to the single encrypt/decrypt call that raised it
//! and is surfaced to the caller unmodified; none represents a transient
//! condition, so nothing here is retried internally. The caller layer (UI,
//! message pipeline) decides how to present failures, typically by marking
//! a message as undecryptable rather than crashing.

use hushwire_crypto::CryptoError;
use thiserror::Error;

/// Errors from protocol encode/decode and ratchet operations.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// No key was supplied; the contact's key exchange has not completed
    #[error("no session key: key exchange has not completed for this contact")]
    KeyNotInitialized,

    /// The wire string does not match any known message shape
    #[error("malformed message: {reason}")]
    MalformedMessage {
        /// What made the message unparseable
        reason: &'static str,
    },

    /// The version tag decoded to an integer this build does not know
    #[error("unknown protocol version {version}")]
    UnknownProtocolVersion {
        /// The unrecognized version integer
        version: u32,
    },

    /// The version is recognized but cannot be handled with the given key
    /// type (e.g. a ratchet-tagged message offered to a plain session key)
    #[error("unsupported version {version} for this key type")]
    UnsupportedVersion {
        /// The recognized but unhandleable version
        version: u32,
    },

    /// The message belongs to a different ratchet session.
    ///
    /// Advancing cannot fix this; the embedded epoch identifies a stale or
    /// foreign session.
    #[error("ratchet epoch mismatch: state has {expected}, message has {actual}")]
    EpochMismatch {
        /// The epoch of the local ratchet state (ms, UTC midnight)
        expected: u64,
        /// The epoch embedded in the message
        actual: u64,
    },

    /// The day key for this message has been pruned.
    ///
    /// Forward secrecy working as designed: the message is permanently
    /// undecryptable.
    #[error("key expired: day {day_offset} is outside the retention window ending at {current}")]
    KeyExpired {
        /// The day offset the message was encrypted under
        day_offset: u32,
        /// The state's current day offset
        current: u32,
    },

    /// A backward ratchet advance was requested.
    ///
    /// The chain only moves forward; asking for an earlier day is a caller
    /// bug, not a protocol condition.
    #[error("backward ratchet advance: at day {current}, requested day {requested}")]
    BackwardRatchet {
        /// Current day offset
        current: u32,
        /// Requested (earlier) day offset
        requested: u32,
    },

    /// Failure inside a cryptographic primitive
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

impl ProtocolError {
    /// Returns true if the message that produced this error can never be
    /// decrypted, by anyone, ever again.
    ///
    /// `KeyExpired` and authentication failures are terminal for the
    /// message itself; the remaining variants point at caller bugs, foreign
    /// sessions, or garbage input where retrying with corrected state could
    /// still succeed.
    pub fn is_undecryptable(&self) -> bool {
        matches!(
            self,
            Self::KeyExpired { .. } | Self::Crypto(CryptoError::AuthenticationFailure)
        )
    }
}

/// Convenience alias for protocol results.
pub type Result<T> = std::result::Result<T, ProtocolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_expired_is_undecryptable() {
        let err = ProtocolError::KeyExpired { day_offset: 0, current: 9 };
        assert!(err.is_undecryptable());
    }

    #[test]
    fn authentication_failure_is_undecryptable() {
        let err = ProtocolError::Crypto(CryptoError::AuthenticationFailure);
        assert!(err.is_undecryptable());
    }

    #[test]
    fn epoch_mismatch_is_not_undecryptable() {
        // The right state (with the matching epoch) could still decrypt it
        let err = ProtocolError::EpochMismatch { expected: 1, actual: 2 };
        assert!(!err.is_undecryptable());
    }

    #[test]
    fn error_display() {
        let err = ProtocolError::BackwardRatchet { current: 10, requested: 3 };
        assert_eq!(err.to_string(), "backward ratchet advance: at day 10, requested day 3");
    }
}
