//! Backward compatibility with historically stored wire formats
//!
//! The two oldest generations never wrote version tags, so these fixtures
//! are built the way the original clients built them: chunked AES-CBC
//! trains for version 0 and bare `nonce:ciphertext` pairs for early
//! version 1. All of them must keep decrypting forever.

use aes::Aes256;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use cbc::cipher::{BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use hushwire_proto::{ProtocolError, SessionKey, decrypt_message};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;

fn test_key_bytes() -> [u8; 32] {
    let mut bytes = [0u8; 32];
    for (i, byte) in bytes.iter_mut().enumerate() {
        *byte = (i * 3) as u8;
    }
    bytes
}

/// Build a legacy chunk train exactly like the original client: plaintext
/// split into fixed-size chunks, each CBC-encrypted under its own IV.
fn legacy_wire(key: &[u8; 32], chunks: &[(&[u8; 16], &[u8])]) -> String {
    chunks
        .iter()
        .map(|(iv, plaintext)| {
            let encryptor = Aes256CbcEnc::new(key.into(), (*iv).into());
            let ciphertext = encryptor.encrypt_padded_vec_mut::<Pkcs7>(plaintext);
            format!("{}:{}", STANDARD.encode(iv), STANDARD.encode(&ciphertext))
        })
        .collect::<Vec<_>>()
        .join(":")
}

#[test]
fn single_chunk_legacy_message_decrypts() {
    let key_bytes = test_key_bytes();
    let key = SessionKey::new(key_bytes);

    let wire = legacy_wire(&key_bytes, &[(&[0x11; 16], b"an old stored message")]);
    let plaintext = decrypt_message(Some(&key), &wire).unwrap();

    assert_eq!(plaintext, "an old stored message");
}

#[test]
fn multi_chunk_legacy_message_concatenates_in_order() {
    let key_bytes = test_key_bytes();
    let key = SessionKey::new(key_bytes);

    let wire = legacy_wire(
        &key_bytes,
        &[
            (&[0x01; 16], b"first chunk, "),
            (&[0x02; 16], b"second chunk, "),
            (&[0x03; 16], b"third chunk"),
        ],
    );
    let plaintext = decrypt_message(Some(&key), &wire).unwrap();

    assert_eq!(plaintext, "first chunk, second chunk, third chunk");
}

#[test]
fn legacy_corruption_is_silent() {
    // No authentication on this path: a flipped ciphertext byte usually
    // still decrypts, just to garbage. Documented protocol limitation.
    let key_bytes = test_key_bytes();
    let key = SessionKey::new(key_bytes);

    let wire = legacy_wire(&key_bytes, &[(&[0x04; 16], b"pristine chunk contents!")]);

    // Corrupt a ciphertext byte and rebuild the wire string
    let (iv_segment, ct_segment) = wire.split_once(':').unwrap();
    let mut ciphertext = STANDARD.decode(ct_segment).unwrap();
    ciphertext[0] ^= 0xFF;
    let corrupted = format!("{iv_segment}:{}", STANDARD.encode(&ciphertext));

    if let Ok(garbage) = decrypt_message(Some(&key), &corrupted) {
        assert_ne!(garbage, "pristine chunk contents!");
    }
}

#[test]
fn untagged_gcm_message_decrypts() {
    // Early v1 clients wrote nonce:ciphertext with no tag; the 12-byte
    // nonce is the only version signal
    let key = SessionKey::new(test_key_bytes());

    let tagged = hushwire_proto::encrypt_message(Some(&key), "early gcm message").unwrap();
    let untagged = tagged.split_once(':').unwrap().1.to_string();

    let plaintext = decrypt_message(Some(&key), &untagged).unwrap();
    assert_eq!(plaintext, "early gcm message");
}

#[test]
fn legacy_message_with_wrong_key_does_not_recover_plaintext() {
    let key_bytes = test_key_bytes();
    let wire = legacy_wire(&key_bytes, &[(&[0x05; 16], b"keyed to someone else")]);

    let wrong_key = SessionKey::new([0xCD; 32]);
    if let Ok(garbage) = decrypt_message(Some(&wrong_key), &wire) {
        assert_ne!(garbage, "keyed to someone else");
    }
}

#[test]
fn truncated_legacy_train_is_malformed() {
    let key_bytes = test_key_bytes();
    let key = SessionKey::new(key_bytes);

    let wire = legacy_wire(&key_bytes, &[(&[0x06; 16], b"aa"), (&[0x07; 16], b"bb")]);
    // Drop the last segment, leaving an odd train
    let truncated = wire.rsplit_once(':').unwrap().0;

    let result = decrypt_message(Some(&key), truncated);
    assert!(matches!(result, Err(ProtocolError::MalformedMessage { .. })));
}
