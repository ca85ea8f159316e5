//! Login hash derivation and verification.
//!
//! A collaborator's login hash is the hex of their KEK. The backend stores
//! it at provisioning and, at login, compares the hash a client derived
//! from the typed password against the stored one.

use bastion_crypto::{KdfParams, Salt, SymmetricKey, derive_key, encoding};
use subtle::ConstantTimeEq;

/// Lowercase hex of `kek`, as stored in `password_hash`.
pub fn password_hash(kek: &SymmetricKey) -> String {
    kek.to_hex()
}

/// Re-derives the KEK for `password` and compares its hash against
/// `stored_hash_hex` in constant time.
///
/// Malformed stored values (bad hex, wrong length) simply fail to verify.
pub fn verify_password(
    params: &KdfParams,
    password: &str,
    salt_hex: &str,
    stored_hash_hex: &str,
) -> bool {
    let Ok(salt) = Salt::from_hex(salt_hex) else {
        return false;
    };
    let Ok(stored) = encoding::from_hex("password_hash", stored_hash_hex) else {
        return false;
    };
    let Ok(kek) = derive_key(password.as_bytes(), &salt, params) else {
        return false;
    };
    kek.as_bytes().as_slice().ct_eq(stored.as_slice()).into()
}
