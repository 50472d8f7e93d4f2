//! `walletseal list`: list the wallets in the vault directory.

use crate::cli::output;
use crate::cli::Cli;
use crate::errors::Result;
use crate::vault::store::list_wallets;

/// Execute the `list` command. No password needed: only file names are read.
pub fn execute(cli: &Cli) -> Result<()> {
    let ctx = cli.context()?;
    let wallets = list_wallets(&ctx.vault_dir)?;

    if !wallets.is_empty() {
        output::info(&format!(
            "{} wallet(s) in {}",
            wallets.len(),
            ctx.vault_dir.display()
        ));
    }
    output::print_wallets_table(&wallets, &ctx.wallet);

    Ok(())
}
