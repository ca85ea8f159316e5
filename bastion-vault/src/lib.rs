//! Envelope key hierarchy and secret handling for the Bastion vault.
//!
//! The backend is blind: it stores salts, wrapped keys and ciphertexts, and
//! every key is derived or unwrapped here, on the client.
//!
//! ```text
//! admin password ─Argon2id─▶ admin KEK ─wraps─▶ master key ─wraps─▶ data key ─encrypts─▶ secrets
//! collaborator password ─Argon2id─▶ collaborator KEK ─wraps─▶ data key (grant)
//! ```
//!
//! [`VaultSession`] is the usual entry point; the lower layers
//! ([`KeyHierarchy`], [`KeyResolver`], [`SecretCodec`]) are exposed for
//! callers that manage storage themselves.

mod codec;
mod config;
pub mod credentials;
mod error;
mod hierarchy;
mod provisioning;
mod records;
mod resolver;
mod session;
mod store;

pub use codec::{
    SecretCodec, SecretEnvironment, SecretFailure, SecretFailureReason, SecretVersion,
    current_versions, next_version,
};
pub use config::VaultConfig;
pub use error::{VaultError, VaultResult};
pub use hierarchy::{DataKey, KeyHierarchy, MasterKey, ProjectKey, VaultState};
pub use provisioning::NewCollaborator;
pub use records::{
    ADMIN_USER_ID, AccessGrant, CollaboratorCredentials, ProjectKeyRecord, SecretRecord,
    VaultKeyMaterial,
};
pub use resolver::{KeyResolver, PrincipalKind, ResolutionMaterial, ResolutionPath, Resolved};
pub use session::{Principal, VaultSession};
pub use store::{KeyStore, MemoryKeyStore};

pub use bastion_crypto::{KdfParams, Salt, WrappedKey};
