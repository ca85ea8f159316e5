//! Shared helpers for bastion-vault integration tests.
#![allow(dead_code)]

use bastion_vault::{
    KdfParams, KeyHierarchy, MemoryKeyStore, NewCollaborator, VaultConfig, VaultSession,
};
use std::sync::Arc;

pub const ADMIN_PASSWORD: &str = "correct horse battery staple";

/// Argon2id parameters cheap enough for tests that derive many keys.
pub fn cheap_config() -> VaultConfig {
    VaultConfig {
        kdf: KdfParams::new(1, 8, 1),
    }
}

pub fn cheap_hierarchy() -> KeyHierarchy {
    KeyHierarchy::new(&cheap_config()).unwrap()
}

/// A session over an empty in-memory store.
pub fn memory_session() -> VaultSession<MemoryKeyStore> {
    VaultSession::new(Arc::new(MemoryKeyStore::new()), &cheap_config()).unwrap()
}

pub fn collaborator(username: &str, password: &str) -> NewCollaborator {
    NewCollaborator {
        username: username.to_string(),
        email: Some(format!("{username}@example.com")),
        password: password.to_string(),
    }
}

/// Routes `tracing` output through the test harness. Safe to call from
/// every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
