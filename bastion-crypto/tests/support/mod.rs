//! Shared helpers for bastion-crypto integration tests.

use bastion_crypto::{KdfParams, Salt};

/// Argon2id parameters cheap enough to run hundreds of derivations.
pub fn cheap_params() -> KdfParams {
    KdfParams::new(1, 8, 1)
}

/// A fixed salt for deterministic derivations.
pub fn fixed_salt(byte: u8) -> Salt {
    Salt::from_bytes([byte; 16])
}
