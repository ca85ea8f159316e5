//! Adversarial tests for AES-256-GCM encryption/decryption.
//!
//! Tests wrong-key decryption, tampering anywhere in the buffer (nonce
//! prefix included), truncation and boundary conditions.

use bastion_crypto::{
    CryptoError, NONCE_SIZE, TAG_SIZE, decrypt, decrypt_string, encrypt, encrypt_string,
    generate_random_key,
};

// ── Round trip ──

#[test]
fn roundtrip_recovers_plaintext() {
    let key = generate_random_key().unwrap();
    let plaintext = b"hello-bastion-world";

    let ciphertext = encrypt(&key, plaintext).unwrap();
    assert_ne!(&ciphertext[NONCE_SIZE..], plaintext.as_slice());

    assert_eq!(decrypt(&key, &ciphertext).unwrap(), plaintext);
}

#[test]
fn string_roundtrip() {
    let key = generate_random_key().unwrap();
    let ciphertext = encrypt_string(&key, "postgres://user:pw@db/app").unwrap();
    assert_eq!(
        decrypt_string(&key, &ciphertext).unwrap(),
        "postgres://user:pw@db/app"
    );
}

#[test]
fn each_encryption_uses_a_fresh_nonce() {
    let key = generate_random_key().unwrap();
    let a = encrypt(&key, b"same").unwrap();
    let b = encrypt(&key, b"same").unwrap();

    assert_ne!(a[..NONCE_SIZE], b[..NONCE_SIZE]);
    assert_ne!(a, b);
    assert_eq!(decrypt(&key, &a).unwrap(), decrypt(&key, &b).unwrap());
}

// ── Wrong key ──

#[test]
fn wrong_key_is_authentication_failure() {
    let key_a = generate_random_key().unwrap();
    let key_b = generate_random_key().unwrap();

    let ciphertext = encrypt(&key_a, b"sensitive").unwrap();
    assert_eq!(
        decrypt(&key_b, &ciphertext).unwrap_err(),
        CryptoError::AuthenticationFailed
    );
}

// ── Tampering ──

#[test]
fn every_byte_position_tampering_detected() {
    let key = generate_random_key().unwrap();
    let ciphertext = encrypt(&key, b"test data for position tampering").unwrap();

    for i in 0..ciphertext.len() {
        let mut tampered = ciphertext.clone();
        tampered[i] ^= 0x01;
        assert_eq!(
            decrypt(&key, &tampered).unwrap_err(),
            CryptoError::AuthenticationFailed,
            "tampering at byte {i} should be detected"
        );
    }
}

#[test]
fn appended_bytes_detected() {
    let key = generate_random_key().unwrap();
    let mut ciphertext = encrypt(&key, b"original").unwrap();
    ciphertext.push(0xFF);
    assert!(decrypt(&key, &ciphertext).is_err());
}

#[test]
fn swapped_nonce_detected() {
    let key = generate_random_key().unwrap();
    let a = encrypt(&key, b"first").unwrap();
    let b = encrypt(&key, b"second").unwrap();

    let mut spliced = b[..NONCE_SIZE].to_vec();
    spliced.extend_from_slice(&a[NONCE_SIZE..]);
    assert_eq!(
        decrypt(&key, &spliced).unwrap_err(),
        CryptoError::AuthenticationFailed
    );
}

// ── Truncation ──

#[test]
fn truncated_ciphertext_fails() {
    let key = generate_random_key().unwrap();
    let ciphertext = encrypt(&key, b"data that will be truncated").unwrap();

    for len in [0, 5, NONCE_SIZE - 1, NONCE_SIZE, NONCE_SIZE + TAG_SIZE - 1] {
        assert_eq!(
            decrypt(&key, &ciphertext[..len]).unwrap_err(),
            CryptoError::AuthenticationFailed,
            "length {len} should fail"
        );
    }
}

// ── Boundary conditions ──

#[test]
fn empty_plaintext_roundtrips() {
    let key = generate_random_key().unwrap();
    let ciphertext = encrypt(&key, b"").unwrap();
    assert_eq!(ciphertext.len(), NONCE_SIZE + TAG_SIZE);
    assert!(decrypt(&key, &ciphertext).unwrap().is_empty());
}

#[test]
fn large_plaintext_roundtrips() {
    let key = generate_random_key().unwrap();
    let large = vec![0xAB; 1024 * 1024];
    let ciphertext = encrypt(&key, &large).unwrap();
    assert_eq!(decrypt(&key, &ciphertext).unwrap(), large);
}

// Property-based tests
mod proptests {
    use super::*;
    use bastion_crypto::SymmetricKey;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn encrypt_decrypt_always_roundtrips(
            key in any::<[u8; 32]>(),
            plaintext in proptest::collection::vec(any::<u8>(), 0..512),
        ) {
            let key = SymmetricKey::from_bytes(key);
            let ciphertext = encrypt(&key, &plaintext).unwrap();
            prop_assert_eq!(decrypt(&key, &ciphertext).unwrap(), plaintext);
        }

        #[test]
        fn single_byte_flip_never_yields_plaintext(
            plaintext in proptest::collection::vec(any::<u8>(), 0..64),
            position in any::<prop::sample::Index>(),
            mask in 1u8..=255,
        ) {
            let key = generate_random_key().unwrap();
            let mut ciphertext = encrypt(&key, &plaintext).unwrap();
            let i = position.index(ciphertext.len());
            ciphertext[i] ^= mask;
            prop_assert_eq!(decrypt(&key, &ciphertext), Err(CryptoError::AuthenticationFailed));
        }
    }
}
