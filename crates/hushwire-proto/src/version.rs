//! Version sniffing for heterogeneous wire formats
//!
//! Three protocol generations coexist on disk:
//!
//! | Version | Shape | Tagged |
//! |---|---|---|
//! | 0, legacy chunked | `iv:ct[:iv:ct...]` | no |
//! | 1, GCM | `[tag:]iv:ct` | modern messages only |
//! | 2, day ratchet | `tag:epoch:day:iv:ct` | yes |
//!
//! The oldest generation shipped before any version tag existed, so its
//! messages (and untagged single-chunk v1 messages) must be classified
//! structurally: by separator count and by the byte length of the first
//! segment (12 bytes ⇒ GCM nonce, 16 bytes ⇒ legacy IV). The classifier is
//! an explicit decision table keyed on the separator count, bounded at four
//! so arbitrarily long legacy chunk trains don't extend the scan. Anything
//! ambiguous is rejected as malformed rather than guessed at.

use crate::{
    error::{ProtocolError, Result},
    wire,
};

/// The protocol generations this build understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolVersion {
    /// Version 0: chunked AES-CBC, unauthenticated, decrypt-only
    LegacyChunked,
    /// Version 1: AES-GCM, single payload, tagged or untagged on the wire
    Gcm,
    /// Version 2: AES-GCM under a day-ratchet key, always tagged
    DayRatchet,
}

impl ProtocolVersion {
    /// The integer carried in the wire tag.
    pub fn number(self) -> u32 {
        match self {
            Self::LegacyChunked => 0,
            Self::Gcm => 1,
            Self::DayRatchet => 2,
        }
    }

    /// Map a tag integer back to a version.
    ///
    /// Version 0 is deliberately absent: the legacy generation never wrote
    /// tags, so a tagged 0 cannot be genuine.
    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            1 => Some(Self::Gcm),
            2 => Some(Self::DayRatchet),
            _ => None,
        }
    }
}

/// Upper bound on the separator scan. Two pairs plus one, enough to tell
/// every shape apart without walking an entire chunk train.
const SEPARATOR_SCAN_CAP: usize = 4;

/// A classified wire message: its version and the body the corresponding
/// decryptor should consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classified<'a> {
    /// Detected protocol version
    pub version: ProtocolVersion,
    /// Message body: the tag is stripped for tagged GCM messages, everything
    /// else passes through whole (the ratchet decryptor re-parses all five
    /// fields itself, and legacy bodies are the full chunk train)
    pub body: &'a str,
}

/// Determine which protocol generation produced a wire string.
///
/// # Errors
///
/// - `MalformedMessage` if the string matches no known shape, or an
///   untagged first segment is neither a 12-byte nonce nor a 16-byte IV
/// - `UnknownProtocolVersion` if a tag decodes to an unrecognized integer
pub fn classify(message: &str) -> Result<Classified<'_>> {
    let separators = message.bytes().filter(|b| *b == b':').take(SEPARATOR_SCAN_CAP).count();

    match separators {
        0 => Err(ProtocolError::MalformedMessage { reason: "no field separators" }),
        1 => classify_untagged(message),
        2 => classify_tagged(message),
        3 => Ok(Classified { version: ProtocolVersion::LegacyChunked, body: message }),
        _ => classify_wide(message),
    }
}

/// Two segments, no tag: the oldest single-chunk formats. The first segment
/// is a nonce or IV; its length is the only version signal that exists.
fn classify_untagged(message: &str) -> Result<Classified<'_>> {
    let (head, _) = split_head(message)?;
    let decoded = wire::decode_segment(head)?;

    let version = match decoded.len() {
        hushwire_crypto::NONCE_SIZE => ProtocolVersion::Gcm,
        hushwire_crypto::IV_SIZE => ProtocolVersion::LegacyChunked,
        _ => {
            return Err(ProtocolError::MalformedMessage {
                reason: "untagged first segment is neither a nonce nor a legacy iv",
            });
        },
    };

    Ok(Classified { version, body: message })
}

/// Three segments: the tagged `tag:iv:ciphertext` shape. Legacy chunk
/// trains always have an even segment count, so this shape is unambiguous.
fn classify_tagged(message: &str) -> Result<Classified<'_>> {
    let (head, rest) = split_head(message)?;

    let Some(tag) = wire::parse_version_tag(head) else {
        return Err(ProtocolError::MalformedMessage { reason: "version tag is not decimal" });
    };

    let version = ProtocolVersion::from_tag(tag)
        .ok_or(ProtocolError::UnknownProtocolVersion { version: tag })?;

    let body = match version {
        // The ratchet decryptor re-parses the whole message (and will
        // reject this three-segment shape as malformed)
        ProtocolVersion::DayRatchet => message,
        _ => rest,
    };

    Ok(Classified { version, body })
}

/// Four or more separators: either a five-field ratchet message or a legacy
/// train of three-plus chunks. A ratchet tag decodes to decimal digits; a
/// 16-byte legacy IV cannot (it would need to be a run of at most ten ASCII
/// digits), so the tag check disambiguates.
fn classify_wide(message: &str) -> Result<Classified<'_>> {
    let (head, _) = split_head(message)?;

    match wire::parse_version_tag(head) {
        Some(tag) => {
            let version = ProtocolVersion::from_tag(tag)
                .ok_or(ProtocolError::UnknownProtocolVersion { version: tag })?;
            if version != ProtocolVersion::DayRatchet {
                // A tagged GCM message has exactly three segments
                return Err(ProtocolError::MalformedMessage {
                    reason: "tagged message has an unexpected segment count",
                });
            }
            Ok(Classified { version, body: message })
        },
        None => Ok(Classified { version: ProtocolVersion::LegacyChunked, body: message }),
    }
}

fn split_head(message: &str) -> Result<(&str, &str)> {
    message
        .split_once(wire::SEPARATOR)
        .ok_or(ProtocolError::MalformedMessage { reason: "no field separators" })
}
