mod support;

use bastion_crypto::{WRAPPED_KEY_SIZE, WrappedKey};
use bastion_vault::{Salt, VaultError, VaultKeyMaterial, VaultState};
use pretty_assertions::assert_eq;
use support::{ADMIN_PASSWORD, cheap_hierarchy};

#[test]
fn initialize_produces_hex_storable_material() {
    let hierarchy = cheap_hierarchy();
    let material = hierarchy.initialize_vault(ADMIN_PASSWORD).unwrap();

    assert_eq!(material.wrapped_master_key.as_bytes().len(), WRAPPED_KEY_SIZE);
    let json = serde_json::to_value(&material).unwrap();
    let wrapped = json["wrapped_master_key"].as_str().unwrap();
    let salt = json["master_key_salt"].as_str().unwrap();
    assert_eq!(wrapped.len(), WRAPPED_KEY_SIZE * 2);
    assert_eq!(salt.len(), 32);
    assert!(wrapped.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[test]
fn data_key_opens_after_unlocking_with_same_password() {
    let hierarchy = cheap_hierarchy();
    let material = hierarchy.initialize_vault(ADMIN_PASSWORD).unwrap();

    let mk = hierarchy.unlock_master_key(ADMIN_PASSWORD, &material).unwrap();
    let project = hierarchy.create_project_key(&mk).unwrap();

    let mk_again = hierarchy.unlock_master_key(ADMIN_PASSWORD, &material).unwrap();
    let dk = hierarchy
        .unwrap_project_key(&mk_again, &project.wrapped_data_key)
        .unwrap();
    assert_eq!(dk, project.data_key);
    assert_eq!(mk.as_bytes(), mk_again.as_bytes());
}

#[test]
fn wrong_password_is_invalid_password() {
    let hierarchy = cheap_hierarchy();
    let material = hierarchy.initialize_vault(ADMIN_PASSWORD).unwrap();

    let err = hierarchy.unlock_master_key("wrong", &material).unwrap_err();
    assert!(matches!(err, VaultError::InvalidPassword));
}

#[test]
fn corrupted_material_is_indistinguishable_from_wrong_password() {
    let hierarchy = cheap_hierarchy();
    let material = hierarchy.initialize_vault(ADMIN_PASSWORD).unwrap();

    let mut flipped = material.wrapped_master_key.as_bytes().to_vec();
    flipped[20] ^= 0x01;
    let tampered = VaultKeyMaterial {
        wrapped_master_key: WrappedKey::from_bytes(flipped),
        master_key_salt: material.master_key_salt,
    };
    let truncated = VaultKeyMaterial {
        wrapped_master_key: WrappedKey::from_bytes(vec![0u8; 4]),
        master_key_salt: material.master_key_salt,
    };
    let wrong_salt = VaultKeyMaterial {
        wrapped_master_key: material.wrapped_master_key.clone(),
        master_key_salt: Salt::from_bytes([9u8; 16]),
    };

    for bad in [&tampered, &truncated, &wrong_salt] {
        let err = hierarchy.unlock_master_key(ADMIN_PASSWORD, bad).unwrap_err();
        assert!(matches!(err, VaultError::InvalidPassword), "got {err:?}");
    }
}

#[test]
fn each_initialization_uses_fresh_salt_and_master_key() {
    let hierarchy = cheap_hierarchy();
    let a = hierarchy.initialize_vault(ADMIN_PASSWORD).unwrap();
    let b = hierarchy.initialize_vault(ADMIN_PASSWORD).unwrap();

    assert_ne!(a.master_key_salt, b.master_key_salt);
    let mk_a = hierarchy.unlock_master_key(ADMIN_PASSWORD, &a).unwrap();
    let mk_b = hierarchy.unlock_master_key(ADMIN_PASSWORD, &b).unwrap();
    assert_ne!(mk_a.as_bytes(), mk_b.as_bytes());
}

#[test]
fn initialize_refuses_initialized_state() {
    let hierarchy = cheap_hierarchy();
    let material = hierarchy.initialize_vault(ADMIN_PASSWORD).unwrap();

    let err = hierarchy
        .initialize(&VaultState::Initialized(material), ADMIN_PASSWORD)
        .unwrap_err();
    assert!(matches!(err, VaultError::AlreadyInitialized));
    assert!(
        hierarchy
            .initialize(&VaultState::Uninitialized, ADMIN_PASSWORD)
            .is_ok()
    );
}

#[test]
fn project_keys_are_independent() {
    let hierarchy = cheap_hierarchy();
    let material = hierarchy.initialize_vault(ADMIN_PASSWORD).unwrap();
    let mk = hierarchy.unlock_master_key(ADMIN_PASSWORD, &material).unwrap();

    let p1 = hierarchy.create_project_key(&mk).unwrap();
    let p2 = hierarchy.create_project_key(&mk).unwrap();
    assert_ne!(p1.data_key, p2.data_key);
    assert_ne!(p1.wrapped_data_key, p2.wrapped_data_key);
}

#[test]
fn changing_admin_password_keeps_project_keys_readable() {
    let hierarchy = cheap_hierarchy();
    let material = hierarchy.initialize_vault(ADMIN_PASSWORD).unwrap();
    let mk = hierarchy.unlock_master_key(ADMIN_PASSWORD, &material).unwrap();
    let project = hierarchy.create_project_key(&mk).unwrap();

    let rotated = hierarchy
        .change_admin_password(ADMIN_PASSWORD, "new admin password", &material)
        .unwrap();
    assert_ne!(rotated.master_key_salt, material.master_key_salt);

    assert!(matches!(
        hierarchy.unlock_master_key(ADMIN_PASSWORD, &rotated),
        Err(VaultError::InvalidPassword)
    ));
    let mk_new = hierarchy
        .unlock_master_key("new admin password", &rotated)
        .unwrap();
    let dk = hierarchy
        .unwrap_project_key(&mk_new, &project.wrapped_data_key)
        .unwrap();
    assert_eq!(dk, project.data_key);
}

#[test]
fn change_admin_password_rejects_wrong_old_password() {
    let hierarchy = cheap_hierarchy();
    let material = hierarchy.initialize_vault(ADMIN_PASSWORD).unwrap();

    let err = hierarchy
        .change_admin_password("nope", "new", &material)
        .unwrap_err();
    assert!(matches!(err, VaultError::InvalidPassword));
}

#[test]
fn secrets_encrypted_under_data_key_need_that_key() {
    let hierarchy = cheap_hierarchy();
    let material = hierarchy.initialize_vault(ADMIN_PASSWORD).unwrap();
    let mk = hierarchy.unlock_master_key(ADMIN_PASSWORD, &material).unwrap();
    let p1 = hierarchy.create_project_key(&mk).unwrap();
    let p2 = hierarchy.create_project_key(&mk).unwrap();

    let codec = bastion_vault::SecretCodec::new(&p1.data_key);
    let ct = codec.encrypt_value("s3cr3t").unwrap();
    assert_eq!(codec.decrypt_value(&ct).unwrap(), "s3cr3t");
    assert!(bastion_vault::SecretCodec::new(&p2.data_key).decrypt_value(&ct).is_err());
}
