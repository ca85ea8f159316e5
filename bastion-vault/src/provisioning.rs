//! Collaborator provisioning: re-wrapping a project data key for a new
//! principal.
//!
//! Runs on the admin's side. The data key is recovered in memory through the
//! master key, wrapped under the collaborator's KEK, and only the wrapped
//! copy leaves this module.

use crate::credentials::password_hash;
use crate::error::{VaultResult, randomness};
use crate::hierarchy::{DataKey, KeyHierarchy};
use crate::records::{AccessGrant, CollaboratorCredentials, ProjectKeyRecord, VaultKeyMaterial};
use bastion_crypto::{Salt, wrap_key};
use tracing::info;
use uuid::Uuid;

/// A collaborator about to be created.
#[derive(Clone)]
pub struct NewCollaborator {
    pub username: String,
    pub email: Option<String>,
    pub password: String,
}

impl std::fmt::Debug for NewCollaborator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewCollaborator")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl KeyHierarchy {
    /// Unlocks the master key and opens `project`'s data key with it.
    fn admin_data_key(
        &self,
        admin_password: &str,
        vault: &VaultKeyMaterial,
        project: &ProjectKeyRecord,
    ) -> VaultResult<DataKey> {
        let master_key = self.unlock_master_key(admin_password, vault)?;
        self.unwrap_project_key(&master_key, &project.wrapped_data_key)
    }

    /// Creates credentials and a grant for a new collaborator on `project`.
    ///
    /// A wrong admin password aborts with `InvalidPassword` before any
    /// collaborator material is generated.
    pub fn provision_collaborator(
        &self,
        admin_password: &str,
        vault: &VaultKeyMaterial,
        project: &ProjectKeyRecord,
        collaborator: &NewCollaborator,
    ) -> VaultResult<CollaboratorCredentials> {
        let data_key = self.admin_data_key(admin_password, vault, project)?;

        let salt = Salt::random().map_err(randomness)?;
        let collaborator_kek = self.derive_kek(&collaborator.password, &salt)?;
        let wrapped_data_key = wrap_key(&collaborator_kek, data_key.key()).map_err(randomness)?;

        info!(
            username = %collaborator.username,
            project_id = %project.project_id,
            "provisioned collaborator grant"
        );
        Ok(CollaboratorCredentials {
            username: collaborator.username.clone(),
            email: collaborator.email.clone(),
            password_hash: password_hash(&collaborator_kek),
            salt,
            project_id: project.project_id,
            wrapped_data_key,
        })
    }

    /// Grants an existing collaborator access to another project.
    ///
    /// Reuses the collaborator's salt so the KEK, and with it their login
    /// hash, stays the same. Storing the result replaces any earlier grant
    /// for the same (user, project).
    pub fn grant_project_access(
        &self,
        admin_password: &str,
        vault: &VaultKeyMaterial,
        project: &ProjectKeyRecord,
        user_id: Uuid,
        collaborator_password: &str,
        collaborator_salt: &Salt,
    ) -> VaultResult<AccessGrant> {
        let data_key = self.admin_data_key(admin_password, vault, project)?;
        let collaborator_kek = self.derive_kek(collaborator_password, collaborator_salt)?;
        let wrapped_data_key = wrap_key(&collaborator_kek, data_key.key()).map_err(randomness)?;

        info!(
            user_id = %user_id,
            project_id = %project.project_id,
            "granted project access"
        );
        Ok(AccessGrant {
            user_id,
            project_id: project.project_id,
            wrapped_data_key,
        })
    }
}
