//! Cryptographic primitives for the Bastion secrets vault.
//!
//! - Argon2id for deriving key-encrypting keys (KEKs) from passwords
//! - AES-256-GCM for authenticated encryption, nonce prepended
//! - Key wrapping (AEAD over 32-byte keys) for the envelope hierarchy
//!
//! Everything here is a pure transformation over byte buffers. The only
//! shared resource is the OS CSPRNG, which is safe to use from many
//! threads at once.

mod cipher;
pub mod encoding;
mod error;
mod key;
mod wrap;

pub use cipher::{NONCE_SIZE, TAG_SIZE, decrypt, decrypt_string, encrypt, encrypt_string};
pub use error::{CryptoError, CryptoResult};
pub use key::{KEY_SIZE, KdfParams, SALT_SIZE, Salt, SymmetricKey, derive_key, generate_random_key};
pub use wrap::{WRAPPED_KEY_SIZE, WrappedKey, unwrap_key, wrap_key};
