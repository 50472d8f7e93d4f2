//! `walletseal init`: create a wallet vault from a new or imported secret.

use console::style;

use crate::cli::output;
use crate::audit::{self, AuditEvent, Operation};
use crate::cli::{prompt_new_password, prompt_secret, Cli, PASSWORD_ENV};
use crate::crypto::OsProvider;
use crate::errors::{Result, WalletSealError};
use crate::secret::SecretBytes;
use crate::signing::{address_for, check_secret, generate_mnemonic, Chain};
use crate::vault::store::create_vault;
use crate::vault::EncryptedVault;

/// Execute the `init` command.
pub fn execute(cli: &Cli, import: bool, words: usize) -> Result<()> {
    let ctx = cli.context()?;
    let vault_path = ctx.vault_path();

    // 1. Refuse to overwrite an existing wallet.
    if vault_path.exists() {
        output::tip("Use `walletseal rotate-key` to change its password instead.");
        return Err(WalletSealError::VaultAlreadyExists(vault_path));
    }

    // 2. Obtain the secret: imported and checked, or freshly generated.
    let (secret, phrase) = if import {
        let input = prompt_secret()?;
        let secret = SecretBytes::from_slice(input.trim().as_bytes());
        check_secret(&secret)?;
        (secret, None)
    } else {
        let phrase = generate_mnemonic(&OsProvider, words)?;
        (SecretBytes::from_slice(phrase.as_bytes()), Some(phrase))
    };

    // 3. Seal it under a new password.
    let password = prompt_new_password(PASSWORD_ENV)?;
    let vault = EncryptedVault::seal(
        &OsProvider,
        password.as_bytes(),
        secret.as_bytes(),
        &ctx.settings.kdf_params(),
    )?;
    create_vault(&vault_path, &vault)?;

    output::success(&format!(
        "Wallet '{}' created at {}",
        ctx.wallet,
        vault_path.display()
    ));

    // 4. A generated mnemonic is shown exactly once.
    if let Some(phrase) = &phrase {
        output::warning("Write down this recovery phrase. It will not be shown again.");
        println!("\n  {}\n", style(phrase.as_str()).bold());
    }

    // 5. Show the addresses this secret controls.
    for chain in [Chain::Ethereum, Chain::Solana] {
        if let Ok(address) = address_for(&secret, chain) {
            output::info(&format!("{chain} address: {address}"));
        }
    }

    let note = if import {
        "imported secret".to_string()
    } else {
        format!("generated {words}-word mnemonic")
    };
    audit::record(
        &ctx.vault_dir,
        &AuditEvent::new(Operation::Init, &ctx.wallet).note(note),
    );

    output::tip("Run `walletseal sign --request tx.json` to sign a transaction.");

    Ok(())
}
