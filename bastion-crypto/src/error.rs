//! Error types for the cryptographic primitives.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors raised by the KDF, the AEAD cipher and the key wrapper.
///
/// Callers handling password-derived material coarsen these before
/// surfacing anything to a principal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("system randomness unavailable: {0}")]
    RandomnessUnavailable(String),

    #[error("authentication failed (wrong key or tampered data)")]
    AuthenticationFailed,

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("encoding error: {0}")]
    Encoding(String),
}
