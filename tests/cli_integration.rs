//! Integration tests for the walletseal CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`. Passwords
//! and imported secrets come from environment variables so nothing waits on
//! an interactive prompt.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

const MNEMONIC: &str = "test test test test test test test test test test test junk";
const MNEMONIC_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
const PASSWORD: &str = "correct horse";

/// Helper: get a Command pointing at the walletseal binary.
fn walletseal() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("walletseal").expect("binary should exist")
}

/// A project directory with a fast KDF setting, so tests stay quick.
fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    tmp.child(".walletseal.toml")
        .write_str("kdf_iterations = 10000\n")
        .unwrap();
    tmp
}

/// A walletseal command running inside `dir` with a clean secret env.
fn in_project(dir: &TempDir) -> Command {
    let mut cmd = walletseal();
    cmd.current_dir(dir.path())
        .env_remove("WALLETSEAL_PASSWORD")
        .env_remove("WALLETSEAL_NEW_PASSWORD")
        .env_remove("WALLETSEAL_SECRET")
        .env_remove("RUST_LOG");
    cmd
}

/// Import the test mnemonic as wallet `main`.
fn import_mnemonic(dir: &TempDir) {
    in_project(dir)
        .args(["init", "--import"])
        .env("WALLETSEAL_PASSWORD", PASSWORD)
        .env("WALLETSEAL_SECRET", MNEMONIC)
        .assert()
        .success();
}

#[test]
fn help_flag_shows_usage() {
    walletseal()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Password-sealed wallet vaults"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("address"))
        .stdout(predicate::str::contains("sign"))
        .stdout(predicate::str::contains("rotate-key"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("delete"));
}

#[test]
fn version_flag_shows_version() {
    walletseal()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("walletseal"));
}

#[test]
fn no_args_shows_help() {
    walletseal()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn import_creates_vault_and_prints_addresses() {
    let tmp = project();

    in_project(&tmp)
        .args(["init", "--import"])
        .env("WALLETSEAL_PASSWORD", PASSWORD)
        .env("WALLETSEAL_SECRET", MNEMONIC)
        .assert()
        .success()
        .stdout(predicate::str::contains(MNEMONIC_ADDRESS))
        .stdout(predicate::str::contains("solana address"))
        .stdout(predicate::str::contains("junk").not());

    let vault = tmp.child(".walletseal/main.vault");
    vault.assert(predicate::path::exists());
    vault.assert(predicate::str::contains("junk").not());
}

#[test]
fn generated_wallet_shows_mnemonic_once() {
    let tmp = project();

    in_project(&tmp)
        .args(["init", "--words", "24"])
        .env("WALLETSEAL_PASSWORD", PASSWORD)
        .assert()
        .success()
        .stderr(predicate::str::contains("recovery phrase"))
        .stdout(predicate::str::contains("ethereum address"));

    tmp.child(".walletseal/main.vault")
        .assert(predicate::path::exists());
}

#[test]
fn init_refuses_existing_wallet() {
    let tmp = project();
    import_mnemonic(&tmp);

    in_project(&tmp)
        .args(["init", "--import"])
        .env("WALLETSEAL_PASSWORD", PASSWORD)
        .env("WALLETSEAL_SECRET", MNEMONIC)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn init_rejects_short_password() {
    let tmp = project();

    in_project(&tmp)
        .args(["init", "--import"])
        .env("WALLETSEAL_PASSWORD", "short")
        .env("WALLETSEAL_SECRET", MNEMONIC)
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 8 characters"));
}

#[test]
fn init_rejects_garbage_secret() {
    let tmp = project();

    in_project(&tmp)
        .args(["init", "--import"])
        .env("WALLETSEAL_PASSWORD", PASSWORD)
        .env("WALLETSEAL_SECRET", "definitely not a key")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid key material"));

    tmp.child(".walletseal/main.vault")
        .assert(predicate::path::missing());
}

#[test]
fn invalid_wallet_name_rejected() {
    let tmp = project();

    in_project(&tmp)
        .args(["list", "--wallet", "../escape"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid wallet name"));
}

#[test]
fn address_unlocks_with_password() {
    let tmp = project();
    import_mnemonic(&tmp);

    in_project(&tmp)
        .args(["address", "--chain", "ethereum"])
        .env("WALLETSEAL_PASSWORD", PASSWORD)
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("{MNEMONIC_ADDRESS}\n")));
}

#[test]
fn wrong_password_is_reported() {
    let tmp = project();
    import_mnemonic(&tmp);

    in_project(&tmp)
        .args(["address", "--chain", "solana"])
        .env("WALLETSEAL_PASSWORD", "not the password")
        .assert()
        .failure()
        .stderr(predicate::str::contains("wrong password or corrupt vault"));
}

#[test]
fn address_on_missing_vault_fails() {
    let tmp = project();

    in_project(&tmp)
        .args(["address", "--chain", "ethereum"])
        .env("WALLETSEAL_PASSWORD", PASSWORD)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Vault not found"));
}

#[test]
fn sign_from_file_prints_signed_json() {
    let tmp = project();
    import_mnemonic(&tmp);

    let request = tmp.child("tx.json");
    request
        .write_str(
            r#"{
                "chain": "ethereum",
                "chain_id": 1,
                "nonce": 3,
                "to": "0x70997970C51812dc3A010C7d01b50e0d17dc79C8",
                "value": "0x2386f26fc10000",
                "gas_limit": 21000,
                "gas_price": "20000000000"
            }"#,
        )
        .unwrap();

    let output = in_project(&tmp)
        .args(["sign", "--request", "tx.json"])
        .env("WALLETSEAL_PASSWORD", PASSWORD)
        .output()
        .unwrap();
    assert!(output.status.success());

    let signed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(signed["chain"], "ethereum");
    assert_eq!(signed["signer"], MNEMONIC_ADDRESS);
    assert!(signed["raw"].as_str().unwrap().starts_with("0xf8"));
}

#[test]
fn sign_from_stdin_for_solana() {
    let tmp = project();
    import_mnemonic(&tmp);

    let request = r#"{
        "chain": "solana",
        "recent_blockhash": "11111111111111111111111111111111",
        "instructions": [{
            "program_id": "11111111111111111111111111111111",
            "data": "AgAAAOgDAAAAAAAA"
        }]
    }"#;

    in_project(&tmp)
        .args(["sign", "--request", "-"])
        .env("WALLETSEAL_PASSWORD", PASSWORD)
        .write_stdin(request)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"chain\": \"solana\""));
}

#[test]
fn sign_rejects_malformed_request() {
    let tmp = project();
    import_mnemonic(&tmp);

    in_project(&tmp)
        .args(["sign", "--request", "-"])
        .env("WALLETSEAL_PASSWORD", PASSWORD)
        .write_stdin(r#"{"chain":"bitcoin"}"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid signing request"));
}

#[test]
fn rotate_key_changes_password() {
    let tmp = project();
    import_mnemonic(&tmp);

    in_project(&tmp)
        .arg("rotate-key")
        .env("WALLETSEAL_PASSWORD", PASSWORD)
        .env("WALLETSEAL_NEW_PASSWORD", "battery staple")
        .assert()
        .success()
        .stdout(predicate::str::contains("Password rotated"));

    in_project(&tmp)
        .args(["address", "--chain", "ethereum"])
        .env("WALLETSEAL_PASSWORD", PASSWORD)
        .assert()
        .failure();

    in_project(&tmp)
        .args(["address", "--chain", "ethereum"])
        .env("WALLETSEAL_PASSWORD", "battery staple")
        .assert()
        .success()
        .stdout(predicate::str::contains(MNEMONIC_ADDRESS));
}

#[test]
fn list_and_delete() {
    let tmp = project();
    import_mnemonic(&tmp);

    in_project(&tmp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("main"));

    in_project(&tmp)
        .args(["delete", "--force"])
        .assert()
        .success();

    tmp.child(".walletseal/main.vault")
        .assert(predicate::path::missing());

    in_project(&tmp)
        .args(["delete", "--force"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Vault not found"));
}

#[test]
fn custom_wallet_and_vault_dir() {
    let tmp = project();

    in_project(&tmp)
        .args(["init", "--import", "--wallet", "cold", "--vault-dir", "keys"])
        .env("WALLETSEAL_PASSWORD", PASSWORD)
        .env("WALLETSEAL_SECRET", MNEMONIC)
        .assert()
        .success();

    tmp.child("keys/cold.vault")
        .assert(predicate::path::exists());
}

#[cfg(feature = "audit-log")]
#[test]
fn audit_records_operations_without_secrets() {
    let tmp = project();
    import_mnemonic(&tmp);

    in_project(&tmp)
        .args(["address", "--chain", "ethereum"])
        .env("WALLETSEAL_PASSWORD", PASSWORD)
        .assert()
        .success();

    in_project(&tmp)
        .args(["audit", "--last", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("address"))
        .stdout(predicate::str::contains(PASSWORD).not())
        .stdout(predicate::str::contains("junk").not());

    in_project(&tmp)
        .args(["audit", "--op", "address", "--chain", "ethereum", "--wallet", "main"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0xf39Fd6..b92266"))
        .stdout(predicate::str::contains("init").not());

    in_project(&tmp)
        .args(["audit", "--chain", "solana"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No audit entries found."));

    in_project(&tmp)
        .args(["audit", "--since", "999999999999999d"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("duration"));
}

#[test]
fn completions_generate_script() {
    walletseal()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("walletseal"));
}
