//! `walletseal delete`: remove a wallet vault.

use dialoguer::Confirm;

use crate::cli::output;
use crate::audit::{self, AuditEvent, Operation};
use crate::cli::Cli;
use crate::errors::{Result, WalletSealError};
use crate::vault::store::delete_vault;

/// Execute the `delete` command.
pub fn execute(cli: &Cli, force: bool) -> Result<()> {
    let ctx = cli.context()?;
    let path = ctx.vault_path();

    if !path.exists() {
        return Err(WalletSealError::VaultNotFound(path));
    }

    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete wallet '{}'? Without a backup of its secret the funds are lost",
                ctx.wallet
            ))
            .default(false)
            .interact()
            .map_err(|e| WalletSealError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    delete_vault(&path)?;

    audit::record(&ctx.vault_dir, &AuditEvent::new(Operation::Delete, &ctx.wallet));
    output::success(&format!(
        "Deleted wallet '{}' ({} removed)",
        ctx.wallet,
        path.display()
    ));

    Ok(())
}
