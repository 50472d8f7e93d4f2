//! CLI module: Clap argument parser, prompts, output helpers, and command
//! implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;
use zeroize::Zeroizing;

use crate::audit::Operation;
use crate::config::Settings;
use crate::errors::{Result, WalletSealError};
use crate::signing::Chain;
use crate::vault::store::{validate_wallet_name, vault_path};

/// Minimum password length to prevent trivially weak passwords.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Unlock password for scripted use.
pub const PASSWORD_ENV: &str = "WALLETSEAL_PASSWORD";

/// Replacement password for `rotate-key` in scripted use.
pub const NEW_PASSWORD_ENV: &str = "WALLETSEAL_NEW_PASSWORD";

/// Mnemonic or private key for `init --import` in scripted use.
pub const SECRET_ENV: &str = "WALLETSEAL_SECRET";

/// walletseal: password-sealed wallet secrets and offline transaction signing.
#[derive(Parser)]
#[command(
    name = "walletseal",
    about = "Password-sealed wallet vaults with offline transaction signing",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Wallet to use (default: `default_wallet` from .walletseal.toml, else "main")
    #[arg(short, long, global = true)]
    pub wallet: Option<String>,

    /// Vault directory (default: `vault_dir` from .walletseal.toml, else .walletseal)
    #[arg(long, global = true)]
    pub vault_dir: Option<String>,

    /// Print debug diagnostics to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create a new wallet vault (generates a mnemonic unless --import)
    Init {
        /// Seal an existing mnemonic or private key instead of generating one
        #[arg(long)]
        import: bool,

        /// Mnemonic length for a generated wallet
        #[arg(long, default_value_t = 12, value_parser = parse_word_count)]
        words: usize,
    },

    /// Show the wallet address for a chain
    Address {
        /// Chain to derive the address for
        #[arg(short, long, value_enum)]
        chain: Chain,
    },

    /// Sign a transaction request (JSON) and print the signed transaction
    Sign {
        /// Path to the request file, or `-` for stdin
        #[arg(short, long)]
        request: String,
    },

    /// Change the vault password
    RotateKey,

    /// List wallets in the vault directory
    List,

    /// Delete a wallet vault
    Delete {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// View the audit log of wallet operations (all wallets unless --wallet)
    Audit {
        /// Number of entries to show
        #[arg(long, default_value_t = 50)]
        last: usize,
        /// Show entries since a duration ago (e.g. 7d, 24h, 30m, 2w)
        #[arg(long)]
        since: Option<String>,
        /// Only events on this chain
        #[arg(short, long, value_enum)]
        chain: Option<Chain>,
        /// Only this operation
        #[arg(long, value_enum)]
        op: Option<Operation>,
    },

    /// Generate shell completion scripts
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },

    /// Show version
    Version,
}

fn parse_word_count(s: &str) -> std::result::Result<usize, String> {
    match s {
        "12" => Ok(12),
        "24" => Ok(24),
        other => Err(format!("'{other}' is not 12 or 24")),
    }
}

/// Resolved locations for one CLI invocation.
#[derive(Debug, Clone)]
pub struct CliContext {
    pub settings: Settings,
    pub wallet: String,
    pub vault_dir: PathBuf,
}

impl CliContext {
    /// `<vault_dir>/<wallet>.vault`
    pub fn vault_path(&self) -> PathBuf {
        vault_path(&self.vault_dir, &self.wallet)
    }
}

impl Cli {
    /// Merge command-line flags over `.walletseal.toml` in the current
    /// directory and validate the wallet name.
    pub fn context(&self) -> Result<CliContext> {
        let cwd = std::env::current_dir()?;
        let settings = Settings::load(&cwd)?;

        let wallet = self
            .wallet
            .clone()
            .unwrap_or_else(|| settings.default_wallet.clone());
        validate_wallet_name(&wallet)?;

        let vault_dir = match &self.vault_dir {
            Some(dir) => cwd.join(dir),
            None => settings.vault_dir(&cwd),
        };

        Ok(CliContext {
            settings,
            wallet,
            vault_dir,
        })
    }
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Get the unlock password from `WALLETSEAL_PASSWORD`, or prompt for it.
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = env_secret(PASSWORD_ENV) {
        return Ok(pw);
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter wallet password")
        .interact()
        .map_err(|e| WalletSealError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new password with confirmation.
///
/// `env_var` is checked first for scripted use. Enforces
/// [`MIN_PASSWORD_LEN`].
pub fn prompt_new_password(env_var: &str) -> Result<Zeroizing<String>> {
    if let Some(pw) = env_secret(env_var) {
        check_password_strength(&pw)?;
        return Ok(pw);
    }

    loop {
        let password = Zeroizing::new(
            dialoguer::Password::new()
                .with_prompt("Choose wallet password")
                .with_confirmation(
                    "Confirm wallet password",
                    "Passwords do not match, try again",
                )
                .interact()
                .map_err(|e| WalletSealError::CommandFailed(format!("password prompt: {e}")))?,
        );

        if check_password_strength(&password).is_err() {
            output::warning(&format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(password);
    }
}

/// Read a mnemonic or private key to import, from `WALLETSEAL_SECRET` or a
/// hidden prompt.
pub fn prompt_secret() -> Result<Zeroizing<String>> {
    if let Some(secret) = env_secret(SECRET_ENV) {
        return Ok(secret);
    }

    let secret = dialoguer::Password::new()
        .with_prompt("Paste mnemonic or private key")
        .interact()
        .map_err(|e| WalletSealError::CommandFailed(format!("secret prompt: {e}")))?;
    Ok(Zeroizing::new(secret))
}

/// Reject passwords shorter than [`MIN_PASSWORD_LEN`] characters.
pub fn check_password_strength(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(WalletSealError::CommandFailed(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

fn env_secret(name: &str) -> Option<Zeroizing<String>> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .map(Zeroizing::new)
}
