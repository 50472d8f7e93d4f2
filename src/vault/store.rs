//! Vault files on disk.
//!
//! This is the storage side of the crate: it moves the opaque wire form
//! of an `EncryptedVault` to and from `<vault_dir>/<wallet>.vault`.  It
//! never sees a password or plaintext secret.

use std::fs;
use std::path::{Path, PathBuf};

use super::format::EncryptedVault;
use crate::errors::{Result, WalletSealError};

/// File extension for vault files.
const VAULT_EXT: &str = "vault";

/// Longest wallet name accepted.
const MAX_WALLET_NAME_LEN: usize = 64;

/// Make sure a wallet name is safe to use as a file stem.
pub fn validate_wallet_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name.len() <= MAX_WALLET_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        && !name.starts_with('-');

    if valid {
        Ok(())
    } else {
        Err(WalletSealError::InvalidWalletName(name.to_string()))
    }
}

/// Build the path of a wallet's vault file.
///
/// Example: `vault_dir/main.vault`
pub fn vault_path(vault_dir: &Path, wallet: &str) -> PathBuf {
    vault_dir.join(format!("{wallet}.{VAULT_EXT}"))
}

/// Write a vault file to disk **atomically**.
///
/// The wire form goes to a temp file in the same directory which is then
/// renamed over the target, so readers never see a half-written vault.
/// On Unix the file is owner-only (`0o600`).
pub fn write_vault(path: &Path, vault: &EncryptedVault) -> Result<()> {
    let wire = vault.serialize()?;

    let parent = path.parent().unwrap_or(Path::new("."));
    if !parent.as_os_str().is_empty() && !parent.exists() {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    fs::write(&tmp_path, wire.as_bytes())?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600))?;
    }

    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Write a vault file only if none exists yet.
pub fn create_vault(path: &Path, vault: &EncryptedVault) -> Result<()> {
    if path.exists() {
        return Err(WalletSealError::VaultAlreadyExists(path.to_path_buf()));
    }
    write_vault(path, vault)
}

/// Read and decode a vault file.
pub fn read_vault(path: &Path) -> Result<EncryptedVault> {
    if !path.exists() {
        return Err(WalletSealError::VaultNotFound(path.to_path_buf()));
    }

    let wire = fs::read_to_string(path)?;
    Ok(EncryptedVault::deserialize(&wire)?)
}

/// Delete a wallet's vault file.
pub fn delete_vault(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(WalletSealError::VaultNotFound(path.to_path_buf()));
    }
    fs::remove_file(path)?;
    Ok(())
}

/// Information about a vault file found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletInfo {
    pub name: String,
    pub size: u64,
}

/// Scan a vault directory for `*.vault` files, sorted by name.
///
/// A missing directory simply has no wallets.
pub fn list_wallets(vault_dir: &Path) -> Result<Vec<WalletInfo>> {
    if !vault_dir.exists() {
        return Ok(Vec::new());
    }

    let mut wallets = Vec::new();
    for entry in fs::read_dir(vault_dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.extension().is_some_and(|ext| ext == VAULT_EXT) {
            if let Some(stem) = path.file_stem() {
                wallets.push(WalletInfo {
                    name: stem.to_string_lossy().to_string(),
                    size: entry.metadata()?.len(),
                });
            }
        }
    }

    wallets.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(wallets)
}
