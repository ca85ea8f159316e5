//! AES-256-GCM authenticated encryption.
//!
//! Wire format: `nonce (12) || ciphertext || tag (16)`. The nonce is fresh
//! for every call and travels in front of the ciphertext, so the output is
//! self-contained and byte-compatible with existing stored blobs.

use crate::error::{CryptoError, CryptoResult};
use crate::key::{SymmetricKey, fill_random};
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};

/// AES-GCM nonce size in bytes.
pub const NONCE_SIZE: usize = 12;

/// AES-GCM authentication tag size in bytes.
pub const TAG_SIZE: usize = 16;

fn cipher_for(key: &SymmetricKey) -> Aes256Gcm {
    Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()))
}

/// Encrypts `plaintext` under `key` with a fresh random nonce.
pub fn encrypt(key: &SymmetricKey, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
    let mut nonce_bytes = [0u8; NONCE_SIZE];
    fill_random(&mut nonce_bytes)?;

    // Sealing only fails for plaintexts beyond the GCM length limit.
    let sealed = cipher_for(key)
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|_| CryptoError::Encoding("plaintext too large for AES-GCM".to_string()))?;

    let mut out = Vec::with_capacity(NONCE_SIZE + sealed.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&sealed);
    Ok(out)
}

/// Decrypts a buffer produced by [`encrypt`].
///
/// A buffer shorter than the nonce, a tag mismatch, or any tampering with
/// the nonce, ciphertext or tag yields [`CryptoError::AuthenticationFailed`].
pub fn decrypt(key: &SymmetricKey, data: &[u8]) -> CryptoResult<Vec<u8>> {
    if data.len() < NONCE_SIZE {
        return Err(CryptoError::AuthenticationFailed);
    }
    let (nonce, sealed) = data.split_at(NONCE_SIZE);

    cipher_for(key)
        .decrypt(Nonce::from_slice(nonce), sealed)
        .map_err(|_| CryptoError::AuthenticationFailed)
}

/// Encrypts a UTF-8 string.
pub fn encrypt_string(key: &SymmetricKey, plaintext: &str) -> CryptoResult<Vec<u8>> {
    encrypt(key, plaintext.as_bytes())
}

/// Decrypts to a UTF-8 string.
pub fn decrypt_string(key: &SymmetricKey, data: &[u8]) -> CryptoResult<String> {
    let bytes = decrypt(key, data)?;
    String::from_utf8(bytes).map_err(|e| CryptoError::Encoding(format!("plaintext: {e}")))
}
