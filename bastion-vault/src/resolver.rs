//! Data key resolution for the run/set paths.
//!
//! One password field serves two kinds of principal. A collaborator's KEK
//! opens their grant directly; the admin's KEK opens the master key, which
//! opens the project key. [`KeyResolver::resolve`] derives the KEK once and
//! tries the direct grant first, then the master key path, using AEAD
//! authentication as the discriminator. [`KeyResolver::resolve_as`] skips
//! the probing when the caller already knows the principal's role.

use crate::error::{VaultError, VaultResult};
use crate::hierarchy::{DataKey, KeyHierarchy, MasterKey};
use crate::records::{AccessGrant, ProjectKeyRecord, VaultKeyMaterial};
use bastion_crypto::{Salt, SymmetricKey, WrappedKey, unwrap_key};
use tracing::debug;

/// Which unwrap path recovered the data key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolutionPath {
    /// The principal's KEK opened their own grant.
    DirectGrant,
    /// The principal's KEK opened the master key, which opened the project key.
    MasterKey,
}

/// A principal's role, when the authentication layer supplies it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrincipalKind {
    Admin,
    Collaborator,
}

/// The wrapped material one resolution needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolutionMaterial {
    /// Salt the principal's KEK is derived with: the vault's master key salt
    /// for the admin, the provisioning salt for a collaborator.
    pub principal_salt: Salt,
    pub wrapped_master_key: WrappedKey,
    /// The key the backend returned for this principal: their grant if
    /// they have one, otherwise the project's own wrapped key.
    pub direct_key: WrappedKey,
    /// The project's MK-wrapped data key.
    pub project_key: WrappedKey,
}

impl ResolutionMaterial {
    /// Material for the admin, who has no grant of their own.
    pub fn for_admin(vault: &VaultKeyMaterial, project: &ProjectKeyRecord) -> Self {
        Self {
            principal_salt: vault.master_key_salt,
            wrapped_master_key: vault.wrapped_master_key.clone(),
            direct_key: project.wrapped_data_key.clone(),
            project_key: project.wrapped_data_key.clone(),
        }
    }

    /// Material for a principal that may hold `grant`.
    pub fn for_principal(
        vault: &VaultKeyMaterial,
        principal_salt: Salt,
        grant: Option<&AccessGrant>,
        project: &ProjectKeyRecord,
    ) -> Self {
        let direct_key = grant
            .map(|g| g.wrapped_data_key.clone())
            .unwrap_or_else(|| project.wrapped_data_key.clone());
        Self {
            principal_salt,
            wrapped_master_key: vault.wrapped_master_key.clone(),
            direct_key,
            project_key: project.wrapped_data_key.clone(),
        }
    }
}

/// A recovered data key and the path that produced it.
#[derive(Debug)]
pub struct Resolved {
    pub data_key: DataKey,
    pub path: ResolutionPath,
}

/// Recovers project data keys from a principal's password.
#[derive(Clone, Debug, Default)]
pub struct KeyResolver {
    hierarchy: KeyHierarchy,
}

impl KeyResolver {
    pub fn new(hierarchy: KeyHierarchy) -> Self {
        Self { hierarchy }
    }

    /// Resolves the data key by probing: direct grant first, then the
    /// master key path. The order is fixed.
    ///
    /// Fails with [`VaultError::InvalidPassword`] when neither path opens,
    /// without saying which one was tried last.
    pub fn resolve(&self, password: &str, material: &ResolutionMaterial) -> VaultResult<Resolved> {
        let kek = self.hierarchy.derive_kek(password, &material.principal_salt)?;

        if let Some(data_key) = Self::attempt_direct(&kek, material) {
            debug!("resolved data key via direct grant");
            return Ok(Resolved {
                data_key,
                path: ResolutionPath::DirectGrant,
            });
        }

        if let Some(data_key) = self.attempt_master(&kek, material) {
            debug!("resolved data key via master key");
            return Ok(Resolved {
                data_key,
                path: ResolutionPath::MasterKey,
            });
        }

        Err(VaultError::InvalidPassword)
    }

    /// Resolves the data key along the single path for `kind`.
    pub fn resolve_as(
        &self,
        kind: PrincipalKind,
        password: &str,
        material: &ResolutionMaterial,
    ) -> VaultResult<Resolved> {
        let kek = self.hierarchy.derive_kek(password, &material.principal_salt)?;

        let (data_key, path) = match kind {
            PrincipalKind::Collaborator => (
                Self::attempt_direct(&kek, material),
                ResolutionPath::DirectGrant,
            ),
            PrincipalKind::Admin => (self.attempt_master(&kek, material), ResolutionPath::MasterKey),
        };

        data_key
            .map(|data_key| Resolved { data_key, path })
            .ok_or(VaultError::InvalidPassword)
    }

    fn attempt_direct(kek: &SymmetricKey, material: &ResolutionMaterial) -> Option<DataKey> {
        unwrap_key(kek, &material.direct_key)
            .ok()
            .map(DataKey::from_key)
    }

    fn attempt_master(&self, kek: &SymmetricKey, material: &ResolutionMaterial) -> Option<DataKey> {
        let master_key = unwrap_key(kek, &material.wrapped_master_key)
            .map(MasterKey::from_key)
            .ok()?;
        self.hierarchy
            .unwrap_project_key(&master_key, &material.project_key)
            .ok()
    }
}
