//! Adversarial tests for the AES-256-CBC envelope layer.
//!
//! CBC has no authentication tag, so wrong-key and tampering checks here use
//! inputs where failure is deterministic (padding byte corruption, malformed
//! encodings) or overwhelmingly likely (UTF-8 validation of long plaintext).

use base64::{engine::general_purpose::STANDARD, Engine};
use cypher_crypto::{
    decrypt, decrypt_string, derive_file_key, encrypt, encrypt_string, generate_random_key,
    CipherEnvelope, CryptoError, KdfParams, MasterKey, BLOCK_SIZE,
};

const LONG_TEXT: &str = "{\"filename\":\"quarterly-report.pdf\",\"mimetype\":\"application/pdf\"}";

// ── Round Trips ──

#[test]
fn encrypt_decrypt_single_byte() {
    let key = generate_random_key();
    let encrypted = encrypt(&key, &[0x42]).unwrap();
    assert_eq!(decrypt(&key, &encrypted).unwrap(), vec![0x42]);
}

#[test]
fn encrypt_decrypt_block_aligned_plaintext() {
    let key = generate_random_key();
    let plaintext = [0x11u8; BLOCK_SIZE * 4];

    let encrypted = encrypt(&key, &plaintext).unwrap();
    // Aligned input still gets a full block of padding.
    let raw = STANDARD.decode(&encrypted.ciphertext).unwrap();
    assert_eq!(raw.len(), BLOCK_SIZE * 5);
    assert_eq!(decrypt(&key, &encrypted).unwrap(), plaintext);
}

#[test]
fn encrypt_decrypt_large_plaintext() {
    let key = generate_random_key();
    let large = vec![0xAB; 1024 * 1024];
    let encrypted = encrypt(&key, &large).unwrap();
    assert_eq!(decrypt(&key, &encrypted).unwrap(), large);
}

#[test]
fn string_round_trip_with_derived_key() {
    let key = derive_file_key(
        &MasterKey::new("test-master-key"),
        "0b8f6a0e-3c43-4b8e-9a57-3f8f7b7e2a11",
        &KdfParams::default(),
    );
    let encrypted = encrypt_string(&key, "Hello, World!").unwrap();
    assert_eq!(decrypt_string(&key, &encrypted).unwrap(), "Hello, World!");
}

#[test]
fn encrypt_produces_unique_envelopes() {
    let key = generate_random_key();
    let plaintext = b"same plaintext encrypted twice";

    let enc_a = encrypt(&key, plaintext).unwrap();
    let enc_b = encrypt(&key, plaintext).unwrap();

    assert_ne!(enc_a.iv, enc_b.iv, "IVs should differ");
    assert_ne!(enc_a.ciphertext, enc_b.ciphertext, "ciphertexts should differ");

    assert_eq!(decrypt(&key, &enc_a).unwrap(), plaintext);
    assert_eq!(decrypt(&key, &enc_b).unwrap(), plaintext);
}

// ── Wrong Key ──

#[test]
fn wrong_key_never_recovers_plaintext() {
    let key = generate_random_key();
    let encrypted = encrypt(&key, LONG_TEXT.as_bytes()).unwrap();

    for _ in 0..32 {
        let wrong = generate_random_key();
        let recovered = decrypt(&wrong, &encrypted);
        assert!(
            recovered.map(|pt| pt != LONG_TEXT.as_bytes()).unwrap_or(true),
            "a wrong key must not reproduce the plaintext"
        );
    }
}

#[test]
fn decrypt_string_with_wrong_key_returns_decryption_error() {
    let key_a = generate_random_key();
    let key_b = generate_random_key();

    let encrypted = encrypt_string(&key_a, LONG_TEXT).unwrap();
    let err = decrypt_string(&key_b, &encrypted).unwrap_err();
    assert!(matches!(err, CryptoError::Decryption(_)));
}

#[test]
fn error_message_does_not_leak_plaintext() {
    let key_a = generate_random_key();
    let key_b = generate_random_key();

    let encrypted = encrypt_string(&key_a, LONG_TEXT).unwrap();
    let err = decrypt_string(&key_b, &encrypted).unwrap_err();
    let message = err.to_string();

    assert!(!message.contains("quarterly-report"));
    assert!(!message.contains(&key_a.to_hex()));
    assert!(!message.contains(&key_b.to_hex()));
}

// ── Tampering & Malformed Envelopes ──

#[test]
fn corrupted_padding_byte_detected() {
    let key = generate_random_key();
    // 29 bytes → two blocks, final three bytes are padding 0x03.
    let encrypted = encrypt(&key, &[0x5Au8; 29]).unwrap();

    let mut raw = STANDARD.decode(&encrypted.ciphertext).unwrap();
    // The last byte of block one is XORed into the final padding byte.
    raw[BLOCK_SIZE - 1] ^= 0xFF;
    let tampered = CipherEnvelope {
        ciphertext: STANDARD.encode(&raw),
        iv: encrypted.iv.clone(),
    };

    let err = decrypt(&key, &tampered).unwrap_err();
    assert!(matches!(err, CryptoError::Decryption(_)));
}

#[test]
fn truncated_ciphertext_fails() {
    let key = generate_random_key();
    let encrypted = encrypt(&key, b"data that will be truncated").unwrap();

    let raw = STANDARD.decode(&encrypted.ciphertext).unwrap();
    let truncated = CipherEnvelope {
        ciphertext: STANDARD.encode(&raw[..5]),
        iv: encrypted.iv,
    };

    assert!(matches!(
        decrypt(&key, &truncated).unwrap_err(),
        CryptoError::Decryption(_)
    ));
}

#[test]
fn empty_ciphertext_fails() {
    let key = generate_random_key();
    let mut encrypted = encrypt(&key, b"will be emptied").unwrap();
    encrypted.ciphertext.clear();

    assert!(matches!(
        decrypt(&key, &encrypted).unwrap_err(),
        CryptoError::Decryption(_)
    ));
}

#[test]
fn invalid_base64_ciphertext_fails() {
    let key = generate_random_key();
    let mut encrypted = encrypt(&key, b"payload").unwrap();
    encrypted.ciphertext = "not-valid-base64!!!".to_string();

    assert!(matches!(
        decrypt(&key, &encrypted).unwrap_err(),
        CryptoError::Decryption(_)
    ));
}

#[test]
fn non_hex_iv_fails() {
    let key = generate_random_key();
    let mut encrypted = encrypt(&key, b"payload").unwrap();
    encrypted.iv = "zz".repeat(16);

    assert!(matches!(
        decrypt(&key, &encrypted).unwrap_err(),
        CryptoError::Decryption(_)
    ));
}

#[test]
fn short_iv_fails() {
    let key = generate_random_key();
    let mut encrypted = encrypt(&key, b"payload").unwrap();
    encrypted.iv.truncate(16);

    let err = decrypt(&key, &encrypted).unwrap_err();
    match err {
        CryptoError::Decryption(msg) => assert!(msg.contains("IV"), "got: {msg}"),
        other => panic!("expected CryptoError::Decryption, got: {other:?}"),
    }
}

#[test]
fn changed_iv_only_garbles_first_block() {
    let key = generate_random_key();
    let plaintext = b"first block here|second block!!!";
    let mut encrypted = encrypt(&key, plaintext).unwrap();
    encrypted.iv = "00".repeat(16);

    let recovered = decrypt(&key, &encrypted).unwrap();
    assert_ne!(&recovered[..BLOCK_SIZE], &plaintext[..BLOCK_SIZE]);
    assert_eq!(&recovered[BLOCK_SIZE..], &plaintext[BLOCK_SIZE..]);
}

// ── Serialization ──

#[test]
fn envelope_json_roundtrip() {
    let key = generate_random_key();
    let encrypted = encrypt(&key, b"serialize me").unwrap();

    let json = serde_json::to_vec(&encrypted).unwrap();
    let deserialized: CipherEnvelope = serde_json::from_slice(&json).unwrap();

    assert_eq!(deserialized, encrypted);
    assert_eq!(decrypt(&key, &deserialized).unwrap(), b"serialize me");
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn encrypt_decrypt_always_roundtrips(data in proptest::collection::vec(any::<u8>(), 0..2048)) {
            let key = generate_random_key();
            let envelope = encrypt(&key, &data).unwrap();
            prop_assert_eq!(decrypt(&key, &envelope).unwrap(), data);
        }

        #[test]
        fn string_roundtrips(text in ".{0,256}") {
            let key = generate_random_key();
            let envelope = encrypt_string(&key, &text).unwrap();
            prop_assert_eq!(decrypt_string(&key, &envelope).unwrap(), text);
        }
    }
}
