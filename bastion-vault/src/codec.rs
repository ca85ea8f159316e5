//! Secret values under a project data key, and their version history.
//!
//! Each write appends a new version; the current value of a key is its
//! highest version. Reads over many secrets never fail as a whole: entries
//! that do not decrypt are reported next to the ones that did.

use crate::error::{VaultError, VaultResult, randomness};
use crate::hierarchy::DataKey;
use crate::records::SecretRecord;
use bastion_crypto::encoding::{from_hex, to_hex};
use bastion_crypto::{CryptoError, decrypt, encrypt};
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

/// Why a single stored value could not be read.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum SecretFailureReason {
    #[error("ciphertext is not valid hex")]
    MalformedCiphertext,

    #[error("authentication failed (wrong key or corrupted data)")]
    AuthenticationFailed,

    #[error("plaintext is not valid UTF-8")]
    InvalidUtf8,
}

/// A secret that was skipped during a batch read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecretFailure {
    pub key: String,
    pub version: i32,
    pub reason: SecretFailureReason,
}

/// The decrypted current values of a project, plus whatever failed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SecretEnvironment {
    values: BTreeMap<String, String>,
    failures: Vec<SecretFailure>,
}

impl SecretEnvironment {
    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    pub fn failures(&self) -> &[SecretFailure] {
        &self.failures
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True when every secret decrypted.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Folds the decrypted values over `base` (typically the parent process
    /// environment). Secrets win over inherited variables of the same name.
    pub fn apply_to<I>(&self, base: I) -> Vec<(String, String)>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut merged: Vec<(String, String)> = base
            .into_iter()
            .filter(|(name, _)| !self.values.contains_key(name))
            .collect();
        merged.extend(self.values.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }
}

/// One historical version of a secret, decrypted or not.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecretVersion {
    pub version: i32,
    pub value: Result<String, SecretFailureReason>,
}

/// The version a new write to `key` gets: one past the highest stored.
///
/// Stored versions come from the backend; a history already at `i32::MAX`
/// is a [`VaultError::Storage`] error.
pub fn next_version(history: &[SecretRecord], key: &str) -> VaultResult<i32> {
    let Some(highest) = history
        .iter()
        .filter(|r| r.key == key)
        .map(|r| r.version)
        .max()
    else {
        return Ok(1);
    };
    highest.checked_add(1).ok_or_else(|| {
        VaultError::Storage(format!("secret {key} has no version after {highest}"))
    })
}

/// Keeps only the highest version of each key, ordered by key name.
pub fn current_versions(records: &[SecretRecord]) -> Vec<&SecretRecord> {
    let mut latest: HashMap<&str, &SecretRecord> = HashMap::new();
    for record in records {
        match latest.get(record.key.as_str()) {
            Some(existing) if existing.version > record.version => {}
            _ => {
                latest.insert(record.key.as_str(), record);
            }
        }
    }
    let mut current: Vec<&SecretRecord> = latest.into_values().collect();
    current.sort_by(|a, b| a.key.cmp(&b.key));
    current
}

/// Encrypts and decrypts secret values under one project's data key.
pub struct SecretCodec<'k> {
    data_key: &'k DataKey,
}

impl<'k> SecretCodec<'k> {
    pub fn new(data_key: &'k DataKey) -> Self {
        Self { data_key }
    }

    /// Encrypts a value, returning the hex ciphertext the backend stores.
    pub fn encrypt_value(&self, plaintext: &str) -> VaultResult<String> {
        encrypt(self.data_key.key(), plaintext.as_bytes())
            .map(to_hex)
            .map_err(randomness)
    }

    /// Decrypts one stored hex ciphertext.
    pub fn decrypt_value(&self, ciphertext_hex: &str) -> Result<String, SecretFailureReason> {
        let ciphertext = from_hex("secret value", ciphertext_hex)
            .map_err(|_| SecretFailureReason::MalformedCiphertext)?;
        let plaintext = decrypt(self.data_key.key(), &ciphertext).map_err(|e| match e {
            CryptoError::AuthenticationFailed => SecretFailureReason::AuthenticationFailed,
            _ => SecretFailureReason::MalformedCiphertext,
        })?;
        String::from_utf8(plaintext).map_err(|_| SecretFailureReason::InvalidUtf8)
    }

    /// Builds the record for the next version of `key`.
    pub fn seal(
        &self,
        project_id: Uuid,
        key: &str,
        value: &str,
        history: &[SecretRecord],
    ) -> VaultResult<SecretRecord> {
        let version = next_version(history, key)?;
        Ok(SecretRecord {
            id: Uuid::now_v7(),
            project_id,
            key: key.to_string(),
            value: self.encrypt_value(value)?,
            version,
            created_at: Utc::now(),
        })
    }

    /// Decrypts the current version of every key in `records`.
    ///
    /// Entries that fail are logged and reported; they never abort the
    /// batch. A corrupt current version is reported rather than replaced by
    /// an older one.
    pub fn decrypt_batch(&self, records: &[SecretRecord]) -> SecretEnvironment {
        let mut env = SecretEnvironment::default();
        for record in current_versions(records) {
            match self.decrypt_value(&record.value) {
                Ok(value) => {
                    env.values.insert(record.key.clone(), value);
                }
                Err(reason) => {
                    warn!(
                        key = %record.key,
                        version = record.version,
                        %reason,
                        "skipping secret that failed to decrypt"
                    );
                    env.failures.push(SecretFailure {
                        key: record.key.clone(),
                        version: record.version,
                        reason,
                    });
                }
            }
        }
        env
    }

    /// Decrypts every stored version of `key`, newest first.
    pub fn decrypt_history(&self, records: &[SecretRecord], key: &str) -> Vec<SecretVersion> {
        let mut versions: Vec<SecretVersion> = records
            .iter()
            .filter(|r| r.key == key)
            .map(|r| SecretVersion {
                version: r.version,
                value: self.decrypt_value(&r.value),
            })
            .collect();
        versions.sort_by(|a, b| b.version.cmp(&a.version));
        versions
    }
}
