//! The three-tier key tree.
//!
//! ```text
//! admin password ──Argon2id──▶ admin KEK ──wraps──▶ master key (one per vault)
//!                                                     │
//!                                                     └─wraps──▶ data key (one per project)
//!                                                                  │
//!                                                                  └─encrypts──▶ secret values
//! ```
//!
//! The master key and data keys are random and never stored unwrapped. The
//! admin KEK is never stored at all. Changing the admin password re-wraps
//! the master key only; nothing below it moves.

use crate::config::VaultConfig;
use crate::error::{VaultError, VaultResult, coarsen, randomness};
use crate::records::VaultKeyMaterial;
use bastion_crypto::{
    KEY_SIZE, KdfParams, Salt, SymmetricKey, WrappedKey, derive_key, generate_random_key,
    unwrap_key, wrap_key,
};
use tracing::{debug, info};

/// The vault master key. Only exists in memory after an unlock.
pub struct MasterKey(SymmetricKey);

impl MasterKey {
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        self.0.as_bytes()
    }

    pub(crate) fn from_key(key: SymmetricKey) -> Self {
        Self(key)
    }

    pub(crate) fn key(&self) -> &SymmetricKey {
        &self.0
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterKey([REDACTED])")
    }
}

/// A project data key. Encrypts that project's secret values directly.
#[derive(Clone, PartialEq, Eq)]
pub struct DataKey(SymmetricKey);

impl DataKey {
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        self.0.as_bytes()
    }

    pub(crate) fn from_key(key: SymmetricKey) -> Self {
        Self(key)
    }

    pub(crate) fn key(&self) -> &SymmetricKey {
        &self.0
    }
}

impl std::fmt::Debug for DataKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DataKey([REDACTED])")
    }
}

/// A freshly created project key: the in-memory DK and its MK-wrapped form.
#[derive(Debug)]
pub struct ProjectKey {
    pub data_key: DataKey,
    pub wrapped_data_key: WrappedKey,
}

/// Whether a vault has a master key yet. One-way: there is no path back to
/// `Uninitialized`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VaultState {
    Uninitialized,
    Initialized(VaultKeyMaterial),
}

impl VaultState {
    pub fn from_material(material: Option<VaultKeyMaterial>) -> Self {
        match material {
            Some(m) => VaultState::Initialized(m),
            None => VaultState::Uninitialized,
        }
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self, VaultState::Initialized(_))
    }
}

/// Creates, unlocks and extends the key tree. Holds no key material.
#[derive(Clone, Debug, Default)]
pub struct KeyHierarchy {
    kdf: KdfParams,
}

impl KeyHierarchy {
    pub fn new(config: &VaultConfig) -> VaultResult<Self> {
        config.validate()?;
        Ok(Self { kdf: config.kdf })
    }

    pub fn kdf_params(&self) -> &KdfParams {
        &self.kdf
    }

    /// Derives a principal's KEK.
    pub(crate) fn derive_kek(&self, password: &str, salt: &Salt) -> VaultResult<SymmetricKey> {
        derive_key(password.as_bytes(), salt, &self.kdf).map_err(coarsen)
    }

    /// First-time setup for a vault in `state`.
    ///
    /// Returns [`VaultError::AlreadyInitialized`] instead of minting a second
    /// master key.
    pub fn initialize(&self, state: &VaultState, admin_password: &str) -> VaultResult<VaultKeyMaterial> {
        if state.is_initialized() {
            return Err(VaultError::AlreadyInitialized);
        }
        self.initialize_vault(admin_password)
    }

    /// Generates a salt and a master key and wraps the master key under the
    /// admin KEK.
    ///
    /// Call exactly once per vault; [`KeyHierarchy::initialize`] enforces that
    /// when the caller knows the current state.
    pub fn initialize_vault(&self, admin_password: &str) -> VaultResult<VaultKeyMaterial> {
        let salt = Salt::random().map_err(randomness)?;
        let admin_kek = self.derive_kek(admin_password, &salt)?;
        let master_key = generate_random_key().map_err(randomness)?;
        let wrapped_master_key = wrap_key(&admin_kek, &master_key).map_err(randomness)?;

        info!("initialized vault master key");
        Ok(VaultKeyMaterial {
            wrapped_master_key,
            master_key_salt: salt,
        })
    }

    /// Recovers the master key with the admin password.
    ///
    /// A wrong password, a corrupt wrapped key and a mismatched salt are all
    /// reported as [`VaultError::InvalidPassword`].
    pub fn unlock_master_key(
        &self,
        admin_password: &str,
        material: &VaultKeyMaterial,
    ) -> VaultResult<MasterKey> {
        let admin_kek = self.derive_kek(admin_password, &material.master_key_salt)?;
        let master_key = unwrap_key(&admin_kek, &material.wrapped_master_key).map_err(coarsen)?;
        debug!("unlocked vault master key");
        Ok(MasterKey(master_key))
    }

    /// Generates a project data key and wraps it under the master key.
    pub fn create_project_key(&self, master_key: &MasterKey) -> VaultResult<ProjectKey> {
        let data_key = generate_random_key().map_err(randomness)?;
        let wrapped_data_key = wrap_key(master_key.key(), &data_key).map_err(randomness)?;
        Ok(ProjectKey {
            data_key: DataKey(data_key),
            wrapped_data_key,
        })
    }

    /// Opens a project's MK-wrapped data key.
    pub fn unwrap_project_key(
        &self,
        master_key: &MasterKey,
        wrapped_data_key: &WrappedKey,
    ) -> VaultResult<DataKey> {
        unwrap_key(master_key.key(), wrapped_data_key)
            .map(DataKey)
            .map_err(coarsen)
    }

    /// Re-wraps the existing master key under a new admin password with a
    /// fresh salt. Project keys and grants are unaffected.
    pub fn change_admin_password(
        &self,
        old_password: &str,
        new_password: &str,
        material: &VaultKeyMaterial,
    ) -> VaultResult<VaultKeyMaterial> {
        let master_key = self.unlock_master_key(old_password, material)?;

        let salt = Salt::random().map_err(randomness)?;
        let new_kek = self.derive_kek(new_password, &salt)?;
        let wrapped_master_key = wrap_key(&new_kek, master_key.key()).map_err(randomness)?;

        info!("re-wrapped vault master key under new admin password");
        Ok(VaultKeyMaterial {
            wrapped_master_key,
            master_key_salt: salt,
        })
    }
}
