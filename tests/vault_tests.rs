//! Integration tests for the walletseal vault module: sealing, the wire
//! form, and the on-disk store.

use std::fs;

use tempfile::TempDir;
use walletseal::crypto::{KdfParams, OsProvider, MIN_ITERATIONS};
use walletseal::errors::{CryptoError, WalletSealError};
use walletseal::vault::store::{create_vault, delete_vault, list_wallets, vault_path};
use walletseal::vault::{read_vault, write_vault, EncryptedVault};

const MNEMONIC: &[u8] = b"test test test test test test test test test test test junk";

fn params() -> KdfParams {
    KdfParams::pbkdf2(MIN_ITERATIONS)
}

fn sealed(password: &[u8]) -> EncryptedVault {
    EncryptedVault::seal(&OsProvider, password, MNEMONIC, &params()).expect("seal")
}

// ---------------------------------------------------------------------------
// Seal / open
// ---------------------------------------------------------------------------

#[test]
fn seal_then_open() {
    let vault = sealed(b"correctpw");
    assert_eq!(vault.open(b"correctpw").unwrap().as_bytes(), MNEMONIC);
}

#[test]
fn wrong_password_is_authentication_failure() {
    let vault = sealed(b"correctpw");
    assert_eq!(
        vault.open(b"wrongpw").unwrap_err(),
        CryptoError::AuthenticationFailed
    );
}

#[test]
fn corrupted_ciphertext_byte_is_detected() {
    let mut vault = sealed(b"correctpw");
    vault.ciphertext[0] ^= 0x01;
    assert_eq!(
        vault.open(b"correctpw").unwrap_err(),
        CryptoError::AuthenticationFailed
    );
}

#[test]
fn each_seal_uses_fresh_salt_and_iv() {
    let a = sealed(b"correctpw");
    let b = sealed(b"correctpw");
    assert_ne!(a.salt, b.salt);
    assert_ne!(a.iv, b.iv);
    assert_ne!(a.ciphertext, b.ciphertext);
}

#[test]
fn reseal_rotates_password_salt_and_iv() {
    let old = sealed(b"correctpw");
    let new = old
        .reseal(&OsProvider, b"correctpw", b"new-password", &params())
        .unwrap();

    assert_eq!(new.open(b"new-password").unwrap().as_bytes(), MNEMONIC);
    assert_eq!(
        new.open(b"correctpw").unwrap_err(),
        CryptoError::AuthenticationFailed
    );
    assert_ne!(old.salt, new.salt);
    assert_ne!(old.iv, new.iv);

    // The original is untouched.
    assert!(old.open(b"correctpw").is_ok());
}

#[test]
fn reseal_with_wrong_old_password_fails() {
    let old = sealed(b"correctpw");
    assert_eq!(
        old.reseal(&OsProvider, b"wrongpw", b"new-password", &params())
            .unwrap_err(),
        CryptoError::AuthenticationFailed
    );
}

// ---------------------------------------------------------------------------
// Wire form
// ---------------------------------------------------------------------------

#[test]
fn wire_form_round_trips_and_still_opens() {
    let vault = sealed(b"correctpw");
    let wire = vault.serialize().unwrap();
    let decoded = EncryptedVault::deserialize(&wire).unwrap();
    assert_eq!(decoded, vault);
    assert!(decoded.open(b"correctpw").is_ok());
}

#[test]
fn wire_form_is_text_without_plaintext() {
    let wire = sealed(b"correctpw").serialize().unwrap();
    assert!(wire.is_ascii());
    assert!(!wire.contains("junk"));
}

#[test]
fn malformed_wire_forms_are_rejected() {
    let wire = sealed(b"correctpw").serialize().unwrap();
    let mut value: serde_json::Value = serde_json::from_str(&wire).unwrap();

    let mut missing = value.clone();
    missing.as_object_mut().unwrap().remove("iv");

    let mut extra = value.clone();
    extra["extra"] = serde_json::json!("field");

    value["salt"] = serde_json::json!("not base64!");

    for bad in [
        String::new(),
        "garbage".to_string(),
        missing.to_string(),
        extra.to_string(),
        value.to_string(),
    ] {
        assert!(
            EncryptedVault::deserialize(&bad).is_err(),
            "accepted malformed vault: {bad}"
        );
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[test]
fn write_then_read_from_disk() {
    let dir = TempDir::new().unwrap();
    let path = vault_path(&dir.path().join(".walletseal"), "main");

    let vault = sealed(b"correctpw");
    write_vault(&path, &vault).unwrap();

    assert_eq!(read_vault(&path).unwrap(), vault);
}

#[test]
fn corrupt_file_is_format_error() {
    let dir = TempDir::new().unwrap();
    let path = vault_path(dir.path(), "main");
    fs::write(&path, "{ not json").unwrap();

    assert!(matches!(
        read_vault(&path),
        Err(WalletSealError::Format(_))
    ));
}

#[test]
fn create_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    let path = vault_path(dir.path(), "main");

    create_vault(&path, &sealed(b"correctpw")).unwrap();
    assert!(matches!(
        create_vault(&path, &sealed(b"correctpw")),
        Err(WalletSealError::VaultAlreadyExists(_))
    ));
}

#[test]
fn delete_and_list() {
    let dir = TempDir::new().unwrap();
    for name in ["main", "cold"] {
        write_vault(&vault_path(dir.path(), name), &sealed(b"correctpw")).unwrap();
    }

    let names: Vec<String> = list_wallets(dir.path())
        .unwrap()
        .into_iter()
        .map(|w| w.name)
        .collect();
    assert_eq!(names, vec!["cold", "main"]);

    delete_vault(&vault_path(dir.path(), "cold")).unwrap();
    assert_eq!(list_wallets(dir.path()).unwrap().len(), 1);
    assert!(matches!(
        read_vault(&vault_path(dir.path(), "cold")),
        Err(WalletSealError::VaultNotFound(_))
    ));
}
