//! Vault session: the store, key hierarchy, resolver and codec wired
//! together into the operations a client performs.
//!
//! Every call that needs a key takes the password again; nothing
//! decrypted outlives the call that produced it.

use crate::codec::{SecretCodec, SecretEnvironment, SecretVersion};
use crate::config::VaultConfig;
use crate::error::{VaultError, VaultResult};
use crate::hierarchy::{KeyHierarchy, VaultState};
use crate::provisioning::NewCollaborator;
use crate::records::{
    ADMIN_USER_ID, AccessGrant, CollaboratorCredentials, ProjectKeyRecord, SecretRecord,
    VaultKeyMaterial,
};
use crate::resolver::{KeyResolver, ResolutionMaterial, Resolved};
use crate::store::KeyStore;
use bastion_crypto::Salt;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Who is asking, and the salt their KEK is derived with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub kdf_salt: Salt,
}

impl Principal {
    /// The vault administrator.
    pub fn admin(vault: &VaultKeyMaterial) -> Self {
        Self {
            user_id: ADMIN_USER_ID,
            kdf_salt: vault.master_key_salt,
        }
    }

    pub fn collaborator(user_id: Uuid, kdf_salt: Salt) -> Self {
        Self { user_id, kdf_salt }
    }

    pub fn from_credentials(user_id: Uuid, credentials: &CollaboratorCredentials) -> Self {
        Self::collaborator(user_id, credentials.salt)
    }

    pub fn is_admin(&self) -> bool {
        self.user_id == ADMIN_USER_ID
    }
}

/// Client-side operations over one vault.
pub struct VaultSession<S: KeyStore> {
    store: Arc<S>,
    hierarchy: KeyHierarchy,
    resolver: KeyResolver,
}

impl<S: KeyStore> VaultSession<S> {
    /// Creates a session after validating `config`.
    pub fn new(store: Arc<S>, config: &VaultConfig) -> VaultResult<Self> {
        let hierarchy = KeyHierarchy::new(config)?;
        Ok(Self {
            store,
            resolver: KeyResolver::new(hierarchy.clone()),
            hierarchy,
        })
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn hierarchy(&self) -> &KeyHierarchy {
        &self.hierarchy
    }

    pub fn state(&self) -> VaultResult<VaultState> {
        Ok(VaultState::from_material(self.store.vault_keys()?))
    }

    fn vault(&self) -> VaultResult<VaultKeyMaterial> {
        self.store.vault_keys()?.ok_or(VaultError::NotInitialized)
    }

    fn project(&self, project_id: Uuid) -> VaultResult<ProjectKeyRecord> {
        self.store
            .project_key(project_id)?
            .ok_or(VaultError::ProjectNotFound(project_id))
    }

    /// The admin principal of this vault.
    pub fn admin(&self) -> VaultResult<Principal> {
        Ok(Principal::admin(&self.vault()?))
    }

    /// Generates and stores the vault's master key.
    pub fn initialize(&self, admin_password: &str) -> VaultResult<VaultKeyMaterial> {
        let material = self.hierarchy.initialize(&self.state()?, admin_password)?;
        self.store.initialize_vault(material.clone())?;
        Ok(material)
    }

    /// Re-wraps the master key under a new admin password.
    pub fn change_admin_password(&self, old_password: &str, new_password: &str) -> VaultResult<()> {
        let vault = self.vault()?;
        let material = self
            .hierarchy
            .change_admin_password(old_password, new_password, &vault)?;
        self.store.replace_vault_keys(material)
    }

    /// Creates a data key for `project_id` and stores it wrapped under the
    /// master key.
    pub fn create_project(
        &self,
        admin_password: &str,
        project_id: Uuid,
    ) -> VaultResult<ProjectKeyRecord> {
        let vault = self.vault()?;
        let master_key = self.hierarchy.unlock_master_key(admin_password, &vault)?;
        let project_key = self.hierarchy.create_project_key(&master_key)?;

        let record = ProjectKeyRecord {
            project_id,
            wrapped_data_key: project_key.wrapped_data_key,
        };
        self.store.insert_project_key(record.clone())?;
        info!(%project_id, "created project data key");
        Ok(record)
    }

    /// Provisions a new collaborator on `project_id` under `user_id` and
    /// stores their grant.
    ///
    /// Returns the credentials the backend needs to create the account.
    pub fn add_collaborator(
        &self,
        admin_password: &str,
        project_id: Uuid,
        user_id: Uuid,
        collaborator: &NewCollaborator,
    ) -> VaultResult<CollaboratorCredentials> {
        if user_id == ADMIN_USER_ID {
            return Err(VaultError::AccessDenied);
        }
        let vault = self.vault()?;
        let project = self.project(project_id)?;
        let credentials =
            self.hierarchy
                .provision_collaborator(admin_password, &vault, &project, collaborator)?;
        self.store.upsert_grant(credentials.grant(user_id))?;
        Ok(credentials)
    }

    /// Grants an existing collaborator access to `project_id`, replacing any
    /// earlier grant they held on it.
    pub fn grant_access(
        &self,
        admin_password: &str,
        project_id: Uuid,
        collaborator: &Principal,
        collaborator_password: &str,
    ) -> VaultResult<AccessGrant> {
        if collaborator.is_admin() {
            return Err(VaultError::AccessDenied);
        }
        let vault = self.vault()?;
        let project = self.project(project_id)?;
        let grant = self.hierarchy.grant_project_access(
            admin_password,
            &vault,
            &project,
            collaborator.user_id,
            collaborator_password,
            &collaborator.kdf_salt,
        )?;
        self.store.upsert_grant(grant.clone())?;
        Ok(grant)
    }

    /// Recovers the data key of `project_id` for `principal`.
    pub fn resolve_data_key(
        &self,
        principal: &Principal,
        password: &str,
        project_id: Uuid,
    ) -> VaultResult<Resolved> {
        let vault = self.vault()?;
        let project = self.project(project_id)?;
        let grant = self.store.grant(principal.user_id, project_id)?;
        let material =
            ResolutionMaterial::for_principal(&vault, principal.kdf_salt, grant.as_ref(), &project);

        let resolved = self.resolver.resolve(password, &material)?;
        debug!(
            user_id = %principal.user_id,
            %project_id,
            path = ?resolved.path,
            "resolved project data key"
        );
        Ok(resolved)
    }

    /// Decrypts the current version of every secret in `project_id`.
    ///
    /// Entries that fail to decrypt are reported in the environment's
    /// failures and never abort the load.
    pub fn load_environment(
        &self,
        principal: &Principal,
        password: &str,
        project_id: Uuid,
    ) -> VaultResult<SecretEnvironment> {
        let resolved = self.resolve_data_key(principal, password, project_id)?;
        let records = self.store.secrets(project_id)?;
        Ok(SecretCodec::new(&resolved.data_key).decrypt_batch(&records))
    }

    /// Encrypts `value` as the next version of `key` and appends it.
    pub fn set_secret(
        &self,
        principal: &Principal,
        password: &str,
        project_id: Uuid,
        key: &str,
        value: &str,
    ) -> VaultResult<SecretRecord> {
        let resolved = self.resolve_data_key(principal, password, project_id)?;
        let history = self.store.secrets(project_id)?;
        let record = SecretCodec::new(&resolved.data_key).seal(project_id, key, value, &history)?;
        self.store.append_secret(record.clone())?;
        info!(%project_id, key, version = record.version, "stored secret version");
        Ok(record)
    }

    /// Every stored version of `key`, newest first.
    pub fn secret_history(
        &self,
        principal: &Principal,
        password: &str,
        project_id: Uuid,
        key: &str,
    ) -> VaultResult<Vec<SecretVersion>> {
        let resolved = self.resolve_data_key(principal, password, project_id)?;
        let records = self.store.secrets(project_id)?;
        Ok(SecretCodec::new(&resolved.data_key).decrypt_history(&records, key))
    }
}
