//! Records exchanged with the storage collaborator.
//!
//! The backend only ever sees these: salts, wrapped keys, and ciphertexts,
//! all as lowercase hex. Field names match the persisted columns.

use bastion_crypto::{Salt, WrappedKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reserved user id of the vault administrator.
pub const ADMIN_USER_ID: Uuid = Uuid::nil();

/// The vault's master key, wrapped under the admin KEK, and the salt that
/// KEK is derived with. One per vault.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultKeyMaterial {
    pub wrapped_master_key: WrappedKey,
    pub master_key_salt: Salt,
}

/// A project's data key wrapped under the vault master key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectKeyRecord {
    pub project_id: Uuid,
    pub wrapped_data_key: WrappedKey,
}

/// A collaborator's own copy of a project data key, wrapped under their KEK.
///
/// At most one per (user, project); re-granting replaces the wrapped key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGrant {
    pub user_id: Uuid,
    pub project_id: Uuid,
    pub wrapped_data_key: WrappedKey,
}

/// One version of one secret.
///
/// `value` is the hex ciphertext kept as a plain string so that one corrupt
/// row surfaces as a per-entry failure instead of failing the whole batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretRecord {
    pub id: Uuid,
    pub project_id: Uuid,
    pub key: String,
    pub value: String,
    pub version: i32,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

/// Everything the backend needs to create a collaborator and their grant.
///
/// `password_hash` is the hex KEK; the backend compares it at login and
/// never derives it itself.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollaboratorCredentials {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub password_hash: String,
    pub salt: Salt,
    pub project_id: Uuid,
    pub wrapped_data_key: WrappedKey,
}

impl std::fmt::Debug for CollaboratorCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollaboratorCredentials")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("salt", &self.salt)
            .field("project_id", &self.project_id)
            .field("wrapped_data_key", &self.wrapped_data_key)
            .finish()
    }
}

impl CollaboratorCredentials {
    /// The grant record this provisioning produces.
    pub fn grant(&self, user_id: Uuid) -> AccessGrant {
        AccessGrant {
            user_id,
            project_id: self.project_id,
            wrapped_data_key: self.wrapped_data_key.clone(),
        }
    }
}
