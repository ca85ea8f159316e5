//! Vault configuration.

use crate::error::{VaultError, VaultResult};
use bastion_crypto::KdfParams;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Configuration for the key hierarchy.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Argon2id parameters used for every password-derived key.
    ///
    /// Must match what the vault was initialized with; KEKs derived under
    /// other parameters will not open existing wrapped keys.
    pub kdf: KdfParams,
}

impl VaultConfig {
    /// Parses a JSON config. Missing fields take the fleet defaults.
    pub fn from_json(json: &str) -> VaultResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| VaultError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects parameters Argon2 would refuse and warns when they differ
    /// from the fleet defaults.
    pub fn validate(&self) -> VaultResult<()> {
        self.kdf
            .validate()
            .map_err(|e| VaultError::Config(e.to_string()))?;

        let fleet = KdfParams::default();
        if self.kdf != fleet {
            warn!(
                time_cost = self.kdf.time_cost,
                memory_kib = self.kdf.memory_kib,
                parallelism = self.kdf.parallelism,
                "kdf parameters differ from fleet defaults; derived keys will not interoperate"
            );
        }
        Ok(())
    }
}
