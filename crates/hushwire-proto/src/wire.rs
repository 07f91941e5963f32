//! Wire segment encoding
//!
//! Every protocol generation encodes messages as base64 segments joined by
//! `:`. Binary fields (nonces, IVs, ciphertext) are base64; the version tag
//! is the base64 of its decimal text form; the ratchet's epoch and day
//! offset ride as plain decimal text.

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::error::{ProtocolError, Result};

/// Wire field separator
pub const SEPARATOR: char = ':';

/// Encode a binary field as a base64 segment.
pub fn encode_segment(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode a base64 segment back to bytes.
///
/// # Errors
///
/// - `MalformedMessage` if the segment is not valid base64
pub fn decode_segment(segment: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(segment)
        .map_err(|_| ProtocolError::MalformedMessage { reason: "segment is not valid base64" })
}

/// Encode a protocol version as a tag segment: base64 of the decimal text.
pub fn encode_version_tag(version: u32) -> String {
    STANDARD.encode(version.to_string())
}

/// Try to read a segment as a version tag.
///
/// Returns `None` unless the segment base64-decodes to a non-empty run of
/// ASCII decimal digits that parses as a `u32`. The sniffer relies on this
/// being effectively impossible for a random 16-byte legacy IV.
pub fn parse_version_tag(segment: &str) -> Option<u32> {
    let decoded = STANDARD.decode(segment).ok()?;
    if decoded.is_empty() || !decoded.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(&decoded).ok()?.parse().ok()
}

/// Convert decrypted bytes into the plaintext string callers expect.
///
/// # Errors
///
/// - `MalformedMessage` if the bytes are not valid UTF-8 (possible only on
///   the unauthenticated legacy path)
pub(crate) fn utf8_plaintext(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes)
        .map_err(|_| ProtocolError::MalformedMessage { reason: "plaintext is not valid UTF-8" })
}
