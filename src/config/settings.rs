use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::{KdfParams, DEFAULT_ITERATIONS};
use crate::errors::{Result, WalletSealError};

/// Project-level configuration, loaded from `.walletseal.toml`.
///
/// Every field has a default, so a missing file is the same as an empty one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Wallet used when `--wallet` is not given.
    #[serde(default = "default_wallet")]
    pub default_wallet: String,

    /// Directory (relative to the project root) holding `*.vault` files.
    #[serde(default = "default_vault_dir")]
    pub vault_dir: String,

    /// PBKDF2 iteration count for newly sealed vaults.
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_wallet() -> String {
    "main".to_string()
}

fn default_vault_dir() -> String {
    ".walletseal".to_string()
}

fn default_kdf_iterations() -> u32 {
    DEFAULT_ITERATIONS
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_wallet: default_wallet(),
            vault_dir: default_vault_dir(),
            kdf_iterations: default_kdf_iterations(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    pub const FILE_NAME: &'static str = ".walletseal.toml";

    /// Load settings from `<project_dir>/.walletseal.toml`.
    ///
    /// A missing file yields defaults. A file that fails to parse, or that
    /// asks for fewer KDF iterations than the crypto layer accepts, is an
    /// error.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            WalletSealError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        settings.kdf_params().validate().map_err(|e| {
            WalletSealError::ConfigError(format!("{}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Directory holding the vault files.
    pub fn vault_dir(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.vault_dir)
    }

    /// Full path to a wallet's vault file.
    ///
    /// Example: `project_dir/.walletseal/main.vault`
    pub fn vault_path(&self, project_dir: &Path, wallet: &str) -> PathBuf {
        crate::vault::store::vault_path(&self.vault_dir(project_dir), wallet)
    }

    /// KDF parameters for sealing new vaults.
    pub fn kdf_params(&self) -> KdfParams {
        KdfParams::pbkdf2(self.kdf_iterations)
    }
}

// ── Tests ────────────────────────────────────────────────────────────
