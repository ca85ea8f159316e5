//! Vault error types.

use bastion_crypto::CryptoError;
use thiserror::Error;
use uuid::Uuid;

/// Result type for vault operations.
pub type VaultResult<T> = Result<T, VaultError>;

/// Errors surfaced by the key hierarchy and everything built on it.
///
/// Anything derived from a password reads as [`VaultError::InvalidPassword`],
/// whatever the underlying cause.
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("system randomness unavailable: {0}")]
    RandomnessUnavailable(String),

    #[error("invalid password")]
    InvalidPassword,

    #[error("vault already initialized")]
    AlreadyInitialized,

    #[error("vault not initialized")]
    NotInitialized,

    #[error("project not found: {0}")]
    ProjectNotFound(Uuid),

    #[error("access denied")]
    AccessDenied,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("crypto error: {0}")]
    Crypto(CryptoError),
}

/// Collapses a primitive failure on a password-derived path.
///
/// Randomness and KDF parameter failures pass through; every other failure
/// (tag mismatch, short buffer, wrong payload length, bad hex) becomes
/// [`VaultError::InvalidPassword`] so callers cannot tell which input was
/// wrong.
pub(crate) fn coarsen(err: CryptoError) -> VaultError {
    match err {
        CryptoError::RandomnessUnavailable(msg) => VaultError::RandomnessUnavailable(msg),
        CryptoError::KeyDerivation(msg) => VaultError::Config(msg),
        CryptoError::AuthenticationFailed
        | CryptoError::InvalidKeyLength { .. }
        | CryptoError::Encoding(_) => VaultError::InvalidPassword,
    }
}

/// Maps a failure on a path that only consumes randomness.
pub(crate) fn randomness(err: CryptoError) -> VaultError {
    match err {
        CryptoError::RandomnessUnavailable(msg) => VaultError::RandomnessUnavailable(msg),
        other => VaultError::Crypto(other),
    }
}
