//! `walletseal address`: unlock the wallet and print its address.

use crate::audit::{self, AuditEvent, Operation};
use crate::cli::{prompt_password, Cli};
use crate::errors::Result;
use crate::signing::{Chain, LockedVault};
use crate::vault::read_vault;

/// Execute the `address` command.
pub fn execute(cli: &Cli, chain: Chain) -> Result<()> {
    let ctx = cli.context()?;
    let vault = read_vault(&ctx.vault_path())?;

    let password = prompt_password()?;
    let unlocked = LockedVault::new(&vault).unlock(password.as_bytes())?;
    let address = unlocked.address(chain)?;
    unlocked.lock();

    println!("{address}");
    audit::record(
        &ctx.vault_dir,
        &AuditEvent::new(Operation::Address, &ctx.wallet).address(chain, &address),
    );

    Ok(())
}
