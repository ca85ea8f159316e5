//! The storage collaborator seam.
//!
//! The core never persists anything itself. Whatever holds the vault's
//! records (a database behind an HTTP API, a local file, a test map)
//! implements [`KeyStore`]; the session layer reads and writes through it.

use crate::error::{VaultError, VaultResult};
use crate::records::{AccessGrant, ProjectKeyRecord, SecretRecord, VaultKeyMaterial};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// Opaque record storage for one vault.
pub trait KeyStore: Send + Sync {
    /// The vault's wrapped master key and salt, if initialized.
    fn vault_keys(&self) -> VaultResult<Option<VaultKeyMaterial>>;

    /// Stores the vault key material. Must fail with
    /// [`VaultError::AlreadyInitialized`] rather than overwrite.
    fn initialize_vault(&self, material: VaultKeyMaterial) -> VaultResult<()>;

    /// Replaces the vault key material of an initialized vault (admin
    /// password change).
    fn replace_vault_keys(&self, material: VaultKeyMaterial) -> VaultResult<()>;

    fn project_key(&self, project_id: Uuid) -> VaultResult<Option<ProjectKeyRecord>>;

    /// Stores a new project's wrapped data key. Project keys are immutable;
    /// storing a second key for the same project is an error.
    fn insert_project_key(&self, record: ProjectKeyRecord) -> VaultResult<()>;

    fn grant(&self, user_id: Uuid, project_id: Uuid) -> VaultResult<Option<AccessGrant>>;

    /// Inserts or replaces the grant for `(user_id, project_id)`.
    fn upsert_grant(&self, grant: AccessGrant) -> VaultResult<()>;

    /// Every stored version of every secret in the project.
    fn secrets(&self, project_id: Uuid) -> VaultResult<Vec<SecretRecord>>;

    /// Appends a secret version. Existing versions are never modified.
    fn append_secret(&self, record: SecretRecord) -> VaultResult<()>;
}

#[derive(Default)]
struct MemoryState {
    vault: Option<VaultKeyMaterial>,
    projects: HashMap<Uuid, ProjectKeyRecord>,
    grants: HashMap<(Uuid, Uuid), AccessGrant>,
    secrets: HashMap<Uuid, Vec<SecretRecord>>,
}

/// In-memory [`KeyStore`] for tests and embedders.
#[derive(Default)]
pub struct MemoryKeyStore {
    state: RwLock<MemoryState>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, f: impl FnOnce(&MemoryState) -> T) -> VaultResult<T> {
        let state = self
            .state
            .read()
            .map_err(|e| VaultError::Storage(e.to_string()))?;
        Ok(f(&state))
    }

    fn write<T>(&self, f: impl FnOnce(&mut MemoryState) -> VaultResult<T>) -> VaultResult<T> {
        let mut state = self
            .state
            .write()
            .map_err(|e| VaultError::Storage(e.to_string()))?;
        f(&mut state)
    }
}

impl KeyStore for MemoryKeyStore {
    fn vault_keys(&self) -> VaultResult<Option<VaultKeyMaterial>> {
        self.read(|s| s.vault.clone())
    }

    fn initialize_vault(&self, material: VaultKeyMaterial) -> VaultResult<()> {
        self.write(|s| {
            if s.vault.is_some() {
                return Err(VaultError::AlreadyInitialized);
            }
            s.vault = Some(material);
            Ok(())
        })
    }

    fn replace_vault_keys(&self, material: VaultKeyMaterial) -> VaultResult<()> {
        self.write(|s| match s.vault.as_mut() {
            Some(existing) => {
                *existing = material;
                Ok(())
            }
            None => Err(VaultError::NotInitialized),
        })
    }

    fn project_key(&self, project_id: Uuid) -> VaultResult<Option<ProjectKeyRecord>> {
        self.read(|s| s.projects.get(&project_id).cloned())
    }

    fn insert_project_key(&self, record: ProjectKeyRecord) -> VaultResult<()> {
        self.write(|s| {
            if s.projects.contains_key(&record.project_id) {
                return Err(VaultError::Storage(format!(
                    "project {} already has a data key",
                    record.project_id
                )));
            }
            s.projects.insert(record.project_id, record);
            Ok(())
        })
    }

    fn grant(&self, user_id: Uuid, project_id: Uuid) -> VaultResult<Option<AccessGrant>> {
        self.read(|s| s.grants.get(&(user_id, project_id)).cloned())
    }

    fn upsert_grant(&self, grant: AccessGrant) -> VaultResult<()> {
        self.write(|s| {
            s.grants.insert((grant.user_id, grant.project_id), grant);
            Ok(())
        })
    }

    fn secrets(&self, project_id: Uuid) -> VaultResult<Vec<SecretRecord>> {
        self.read(|s| s.secrets.get(&project_id).cloned().unwrap_or_default())
    }

    fn append_secret(&self, record: SecretRecord) -> VaultResult<()> {
        self.write(|s| {
            let history = s.secrets.entry(record.project_id).or_default();
            if history
                .iter()
                .any(|r| r.key == record.key && r.version == record.version)
            {
                return Err(VaultError::Storage(format!(
                    "secret {} version {} already exists",
                    record.key, record.version
                )));
            }
            history.push(record);
            Ok(())
        })
    }
}
