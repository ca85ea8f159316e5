//! Lowercase hex encoding for everything that crosses the storage boundary.

use crate::error::{CryptoError, CryptoResult};

/// Encodes bytes as lowercase hex.
pub fn to_hex(bytes: impl AsRef<[u8]>) -> String {
    hex::encode(bytes)
}

/// Decodes a hex string. Upper-case digits are accepted.
pub fn from_hex(field: &str, value: &str) -> CryptoResult<Vec<u8>> {
    hex::decode(value.trim()).map_err(|e| CryptoError::Encoding(format!("{field}: {e}")))
}

/// Decodes a hex string into a fixed-size array.
pub fn from_hex_array<const N: usize>(field: &str, value: &str) -> CryptoResult<[u8; N]> {
    let bytes = from_hex(field, value)?;
    <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| {
        CryptoError::Encoding(format!(
            "{field}: expected {N} bytes, got {}",
            bytes.len()
        ))
    })
}
