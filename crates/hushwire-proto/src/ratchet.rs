//! Day-granularity forward-secrecy ratchet (protocol version 2)
//!
//! Each contact owns a [`RatchetState`] seeded from the shared secret of the
//! initial key exchange. The state holds a window of recent day keys linked
//! by a one-way hash chain; advancing a day derives the next key and prunes
//! keys that fall out of the retention window, after which messages from
//! those days are permanently undecryptable.
//!
//! ```text
//! Day(n) ──advance(target ≥ n)──► Day(target)
//!   │
//!   └── no transition exists for target < n (fails loudly)
//! ```
//!
//! # State handling
//!
//! `RatchetState` is an immutable value: every operation that moves the
//! ratchet returns a fresh state, and the caller must persist it before
//! acting on the new keys. Persist-then-act means a crash mid-advance
//! retries on the old, unpruned state instead of silently losing a day's
//! key while ciphertext for it still exists. Concurrent decrypts against
//! the same contact must be serialized by the caller (one lock or task
//! queue per contact); racing advances would fork the sequential chain.

use std::collections::BTreeMap;

use hushwire_crypto::SessionKey;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ProtocolError, Result},
    version::ProtocolVersion,
    wire,
};

/// How many days of past keys a state retains besides the current one.
///
/// A message older than this window can no longer be decrypted, by design.
pub const RETENTION_DAYS: u32 = 7;

/// Milliseconds in a day
const MS_PER_DAY: u64 = 86_400_000;

/// Upper bound on a single advance. Deriving a day key costs one hash per
/// day, so an absurd target offset from a hostile message would otherwise
/// buy a near-unbounded hashing loop. A century of days is far beyond any
/// legitimate session.
const MAX_ADVANCE_DAYS: u32 = 36_500;

/// Per-contact ratchet state.
///
/// Serializable as plain data so the persistence layer can store it
/// untouched and reload it before each call.
#[derive(Clone, Serialize, Deserialize)]
pub struct RatchetState {
    /// Session epoch: milliseconds since the Unix epoch, truncated to UTC
    /// midnight at creation time. Never changes; identifies the session.
    epoch_ms: u64,
    /// Whole days since `epoch_ms`. Monotonically non-decreasing.
    current_day_offset: u32,
    /// Day keys still inside the retention window, keyed by day offset.
    /// Always contains `current_day_offset`; never more than
    /// `RETENTION_DAYS + 1` entries.
    recent_keys: BTreeMap<u32, SessionKey>,
}

/// Key material stays out of `Debug` output: [`SessionKey`] has no `Debug`
/// impl by design, so only the non-secret fields and the retained day
/// offsets are shown.
impl std::fmt::Debug for RatchetState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RatchetState")
            .field("epoch_ms", &self.epoch_ms)
            .field("current_day_offset", &self.current_day_offset)
            .field("retained_days", &self.recent_keys.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Create a ratchet state from the shared secret of a completed key
/// exchange, anchored at today's UTC midnight.
pub fn init_ratchet_state(shared_secret: &[u8]) -> RatchetState {
    init_ratchet_state_at(shared_secret, unix_now_ms())
}

/// Create a ratchet state anchored at the UTC midnight containing `now_ms`.
pub fn init_ratchet_state_at(shared_secret: &[u8], now_ms: u64) -> RatchetState {
    let epoch_ms = now_ms - now_ms % MS_PER_DAY;
    let day_zero_key = hushwire_crypto::derive_day_zero_key(shared_secret);

    let mut recent_keys = BTreeMap::new();
    recent_keys.insert(0, day_zero_key);

    RatchetState { epoch_ms, current_day_offset: 0, recent_keys }
}

impl RatchetState {
    /// Session epoch in milliseconds (UTC-midnight-aligned).
    pub fn epoch_ms(&self) -> u64 {
        self.epoch_ms
    }

    /// Current day offset since the epoch.
    pub fn current_day_offset(&self) -> u32 {
        self.current_day_offset
    }

    /// The AEAD key for the current day.
    pub fn current_day_key(&self) -> &SessionKey {
        let Some(key) = self.recent_keys.get(&self.current_day_offset) else {
            unreachable!("invariant: recent_keys always contains the current day offset");
        };
        key
    }

    /// Day offsets still inside the retention window, in ascending order.
    pub fn retained_days(&self) -> Vec<u32> {
        self.recent_keys.keys().copied().collect()
    }

    /// Whole days elapsed between the epoch and `now_ms`.
    ///
    /// Saturates to day 0 for instants before the epoch (clock skew).
    pub fn day_offset_at(&self, now_ms: u64) -> u32 {
        (now_ms.saturating_sub(self.epoch_ms) / MS_PER_DAY) as u32
    }

    /// Advance the ratchet to `target`, deriving every day key in between
    /// sequentially and pruning keys that fall out of the retention window.
    ///
    /// Advancing to the current day is a no-op returning an equal state.
    /// The sequential derivation is intentional: each day's key depends on
    /// the previous day's, which is what makes the chain one-way.
    ///
    /// # Errors
    ///
    /// - `BackwardRatchet` if `target` is earlier than the current day —
    ///   the chain never moves backward, so this is a caller bug
    /// - `MalformedMessage` if `target` is implausibly far ahead
    pub fn advance_to_day(&self, target: u32) -> Result<Self> {
        if target == self.current_day_offset {
            return Ok(self.clone());
        }
        if target < self.current_day_offset {
            return Err(ProtocolError::BackwardRatchet {
                current: self.current_day_offset,
                requested: target,
            });
        }
        if target - self.current_day_offset > MAX_ADVANCE_DAYS {
            return Err(ProtocolError::MalformedMessage {
                reason: "day offset implausibly far ahead",
            });
        }

        let mut recent_keys = self.recent_keys.clone();
        let mut key = self.current_day_key().clone();
        for day in (self.current_day_offset + 1)..=target {
            key = hushwire_crypto::next_day_key(&key);
            recent_keys.insert(day, key.clone());
        }

        let oldest_kept = target.saturating_sub(RETENTION_DAYS);
        recent_keys.retain(|day, _| *day >= oldest_kept);

        tracing::debug!(
            from = self.current_day_offset,
            to = target,
            oldest_kept,
            "advanced day ratchet"
        );

        Ok(Self { epoch_ms: self.epoch_ms, current_day_offset: target, recent_keys })
    }

    /// The key for a given day offset, if it is still available.
    ///
    /// Returns `None` both for pruned days (forward secrecy: gone for good)
    /// and for future days (not yet derived; advance first).
    pub fn key_for_day(&self, day: u32) -> Option<&SessionKey> {
        if day > self.current_day_offset {
            return None;
        }
        self.recent_keys.get(&day)
    }
}

/// Encrypt a plaintext under today's day key.
///
/// Computes today's offset from the state's epoch and advances the state to
/// it first, so a sender that has been offline self-heals. Returns the
/// possibly advanced state, which the caller must persist, and the wire
/// string `b64("2"):epoch:day:b64(nonce):b64(ciphertext)`.
pub fn encrypt_ratchet_message(
    state: &RatchetState,
    plaintext: &str,
) -> Result<(RatchetState, String)> {
    encrypt_ratchet_message_at(state, plaintext, unix_now_ms())
}

/// Encrypt a plaintext under the day key for the instant `now_ms`.
///
/// If the computed day is behind the state (the clock moved backwards) the
/// current day is used instead; encryption under the newest key is always
/// safe, while a backward advance never is.
pub fn encrypt_ratchet_message_at(
    state: &RatchetState,
    plaintext: &str,
    now_ms: u64,
) -> Result<(RatchetState, String)> {
    let target = state.day_offset_at(now_ms).max(state.current_day_offset);
    let state = state.advance_to_day(target)?;

    let (nonce, ciphertext) = hushwire_crypto::seal(state.current_day_key(), plaintext.as_bytes());

    let message = format!(
        "{}:{}:{}:{}:{}",
        wire::encode_version_tag(ProtocolVersion::DayRatchet.number()),
        state.epoch_ms,
        state.current_day_offset,
        wire::encode_segment(&nonce),
        wire::encode_segment(&ciphertext),
    );

    Ok((state, message))
}

/// Decrypt a ratchet message, advancing the state forward if the message
/// comes from a later day than the local state has reached.
///
/// Returns the possibly advanced state, which the caller must persist.
///
/// # Errors
///
/// - `MalformedMessage` if the message does not have exactly five fields or
///   a field fails to parse
/// - `UnknownProtocolVersion` if the tag is decimal but not the ratchet
///   version
/// - `EpochMismatch` if the message belongs to a different ratchet session;
///   advancing cannot recover this
/// - `KeyExpired` if the message's day key has been pruned — the message is
///   permanently undecryptable, by design
/// - `AuthenticationFailure` (as `Crypto`) if the AEAD tag does not verify
pub fn decrypt_ratchet_message(
    state: &RatchetState,
    message: &str,
) -> Result<(RatchetState, String)> {
    let fields: Vec<&str> = message.split(wire::SEPARATOR).collect();
    let &[tag, epoch, day, nonce, ciphertext] = fields.as_slice() else {
        return Err(ProtocolError::MalformedMessage {
            reason: "ratchet message must have exactly five fields",
        });
    };

    let Some(tag) = wire::parse_version_tag(tag) else {
        return Err(ProtocolError::MalformedMessage { reason: "version tag is not decimal" });
    };
    if tag != ProtocolVersion::DayRatchet.number() {
        return Err(ProtocolError::UnknownProtocolVersion { version: tag });
    }

    let epoch: u64 = epoch
        .parse()
        .map_err(|_| ProtocolError::MalformedMessage { reason: "epoch is not decimal" })?;
    if epoch != state.epoch_ms {
        return Err(ProtocolError::EpochMismatch { expected: state.epoch_ms, actual: epoch });
    }

    let day: u32 = day
        .parse()
        .map_err(|_| ProtocolError::MalformedMessage { reason: "day offset is not decimal" })?;

    // A message from a more-advanced day is valid and expected; catch up.
    let state = if day > state.current_day_offset {
        state.advance_to_day(day)?
    } else {
        state.clone()
    };

    let nonce = wire::decode_segment(nonce)?;
    let ciphertext = wire::decode_segment(ciphertext)?;

    let plaintext = {
        let key = state.key_for_day(day).ok_or(ProtocolError::KeyExpired {
            day_offset: day,
            current: state.current_day_offset,
        })?;
        hushwire_crypto::open(key, &nonce, &ciphertext)?
    };

    Ok((state, wire::utf8_plaintext(plaintext)?))
}

/// Milliseconds since the Unix epoch. Saturates to 0 if the system clock
/// predates 1970, which keeps the degenerate case well-defined.
fn unix_now_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| d.as_millis() as u64)
}
