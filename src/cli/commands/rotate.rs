//! `walletseal rotate-key`: change the wallet password.
//!
//! Opens the vault with the current password and seals the same secret
//! under the new one with a fresh salt and IV. The new vault replaces the
//! old file atomically.

use crate::cli::output;
use crate::audit::{self, AuditEvent, Operation};
use crate::cli::{prompt_new_password, prompt_password, Cli, NEW_PASSWORD_ENV};
use crate::crypto::OsProvider;
use crate::errors::Result;
use crate::vault::{read_vault, write_vault};

/// Execute the `rotate-key` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let ctx = cli.context()?;
    let path = ctx.vault_path();
    let vault = read_vault(&path)?;

    output::info("Enter your current wallet password.");
    let old_password = prompt_password()?;

    output::info("Choose your new wallet password.");
    let new_password = prompt_new_password(NEW_PASSWORD_ENV)?;

    let params = ctx.settings.kdf_params();
    let rotated = vault.reseal(
        &OsProvider,
        old_password.as_bytes(),
        new_password.as_bytes(),
        &params,
    )?;
    write_vault(&path, &rotated)?;

    audit::record(
        &ctx.vault_dir,
        &AuditEvent::new(Operation::RotateKey, &ctx.wallet)
            .note(format!("re-sealed with {} KDF iterations", params.iterations)),
    );

    output::success(&format!("Password rotated for wallet '{}'", ctx.wallet));

    Ok(())
}
