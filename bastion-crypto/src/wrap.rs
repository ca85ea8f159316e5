//! Key wrapping: AEAD specialised to 32-byte key payloads.
//!
//! Kept separate from [`crate::cipher`] so "encrypt arbitrary data" and
//! "wrap a key" stay distinct operations with their own types.

use crate::cipher::{NONCE_SIZE, TAG_SIZE, decrypt, encrypt};
use crate::encoding::{from_hex, to_hex};
use crate::error::{CryptoError, CryptoResult};
use crate::key::{KEY_SIZE, SymmetricKey};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// Length of a wrapped 32-byte key: nonce, key ciphertext and tag.
pub const WRAPPED_KEY_SIZE: usize = NONCE_SIZE + KEY_SIZE + TAG_SIZE;

/// A key sealed under another key. Opaque; serialized as lowercase hex.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WrappedKey(Vec<u8>);

impl WrappedKey {
    /// Wraps raw bytes fetched from storage. No validation happens here;
    /// a malformed blob simply fails to unwrap.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        to_hex(&self.0)
    }

    pub fn from_hex(value: &str) -> CryptoResult<Self> {
        from_hex("wrapped key", value).map(Self)
    }
}

impl std::fmt::Debug for WrappedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WrappedKey({} bytes)", self.0.len())
    }
}

impl TryFrom<String> for WrappedKey {
    type Error = CryptoError;

    fn try_from(value: String) -> CryptoResult<Self> {
        Self::from_hex(&value)
    }
}

impl From<WrappedKey> for String {
    fn from(key: WrappedKey) -> Self {
        key.to_hex()
    }
}

/// Seals `target` under `wrapper`.
pub fn wrap_key(wrapper: &SymmetricKey, target: &SymmetricKey) -> CryptoResult<WrappedKey> {
    encrypt(wrapper, target.as_bytes()).map(WrappedKey)
}

/// Opens a wrapped key.
///
/// Fails with [`CryptoError::AuthenticationFailed`] when `wrapper` is not the
/// key the blob was sealed under, and with [`CryptoError::InvalidKeyLength`]
/// if the authenticated payload is not a 32-byte key.
pub fn unwrap_key(wrapper: &SymmetricKey, wrapped: &WrappedKey) -> CryptoResult<SymmetricKey> {
    let mut plaintext = decrypt(wrapper, &wrapped.0)?;
    let key = SymmetricKey::from_slice(&plaintext);
    plaintext.zeroize();
    key
}
