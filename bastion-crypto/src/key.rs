//! Key material and Argon2id key derivation.

use crate::encoding::{from_hex_array, to_hex};
use crate::error::{CryptoError, CryptoResult};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::TryRngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of every symmetric key in the hierarchy (AES-256).
pub const KEY_SIZE: usize = 32;

/// Size of a KDF salt.
pub const SALT_SIZE: usize = 16;

/// Fills `buf` from the OS CSPRNG.
pub(crate) fn fill_random(buf: &mut [u8]) -> CryptoResult<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| CryptoError::RandomnessUnavailable(e.to_string()))
}

/// A 16-byte Argon2id salt. Not secret, but never reused across passwords.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Salt([u8; SALT_SIZE]);

impl Salt {
    /// Generates a fresh random salt.
    pub fn random() -> CryptoResult<Self> {
        let mut bytes = [0u8; SALT_SIZE];
        fill_random(&mut bytes)?;
        Ok(Self(bytes))
    }

    pub fn from_bytes(bytes: [u8; SALT_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SALT_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        to_hex(self.0)
    }

    pub fn from_hex(value: &str) -> CryptoResult<Self> {
        from_hex_array("salt", value).map(Self)
    }
}

impl std::fmt::Debug for Salt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Salt({})", self.to_hex())
    }
}

impl TryFrom<String> for Salt {
    type Error = CryptoError;

    fn try_from(value: String) -> CryptoResult<Self> {
        Self::from_hex(&value)
    }
}

impl From<Salt> for String {
    fn from(salt: Salt) -> Self {
        salt.to_hex()
    }
}

/// A 256-bit symmetric key. Zeroized on drop.
///
/// Used for derived KEKs, the vault master key and project data keys alike;
/// the vault crate wraps it in role-specific newtypes. Equality is
/// constant-time.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; KEY_SIZE]);

impl SymmetricKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Builds a key from a slice, checking its length.
    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        let arr = <[u8; KEY_SIZE]>::try_from(bytes).map_err(|_| CryptoError::InvalidKeyLength {
            expected: KEY_SIZE,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// Lowercase hex of the raw key bytes.
    ///
    /// Only meaningful for KEKs handed to the backend as an opaque
    /// authentication hash. Master and data keys must never be encoded.
    pub fn to_hex(&self) -> String {
        to_hex(self.0)
    }
}

impl ConstantTimeEq for SymmetricKey {
    fn ct_eq(&self, other: &Self) -> subtle::Choice {
        self.0.as_slice().ct_eq(other.0.as_slice())
    }
}

impl PartialEq for SymmetricKey {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for SymmetricKey {}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SymmetricKey([REDACTED])")
    }
}

/// Generates a fresh random 256-bit key.
pub fn generate_random_key() -> CryptoResult<SymmetricKey> {
    let mut bytes = [0u8; KEY_SIZE];
    fill_random(&mut bytes)?;
    let key = SymmetricKey(bytes);
    bytes.zeroize();
    Ok(key)
}

/// Argon2id cost parameters.
///
/// The defaults are the fleet constants every deployment derives with:
/// one pass over 64 MiB with four lanes. Changing them changes every KEK.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KdfParams {
    /// Number of passes (Argon2 `t_cost`).
    pub time_cost: u32,
    /// Memory in KiB (Argon2 `m_cost`).
    pub memory_kib: u32,
    /// Degree of parallelism (Argon2 `p_cost`).
    pub parallelism: u32,
}

impl KdfParams {
    pub const DEFAULT_TIME_COST: u32 = 1;
    pub const DEFAULT_MEMORY_KIB: u32 = 64 * 1024;
    pub const DEFAULT_PARALLELISM: u32 = 4;

    pub fn new(time_cost: u32, memory_kib: u32, parallelism: u32) -> Self {
        Self {
            time_cost,
            memory_kib,
            parallelism,
        }
    }

    /// Checks that Argon2 accepts these parameters.
    pub fn validate(&self) -> CryptoResult<()> {
        self.argon2_params().map(|_| ())
    }

    fn argon2_params(&self) -> CryptoResult<Params> {
        Params::new(
            self.memory_kib,
            self.time_cost,
            self.parallelism,
            Some(KEY_SIZE),
        )
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            time_cost: Self::DEFAULT_TIME_COST,
            memory_kib: Self::DEFAULT_MEMORY_KIB,
            parallelism: Self::DEFAULT_PARALLELISM,
        }
    }
}

/// Derives a 32-byte key from a password and salt with Argon2id (v0x13).
///
/// Deterministic for a given password, salt and parameter set. The only
/// error path is parameter rejection, which cannot happen with validated
/// parameters.
pub fn derive_key(password: &[u8], salt: &Salt, params: &KdfParams) -> CryptoResult<SymmetricKey> {
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params.argon2_params()?);

    let mut out = [0u8; KEY_SIZE];
    argon2
        .hash_password_into(password, salt.as_bytes(), &mut out)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;

    let key = SymmetricKey(out);
    out.zeroize();
    Ok(key)
}
