//! `walletseal audit`: show what has been done with the wallets.
//!
//! Usage:
//!   walletseal audit                          # last 50 events, all wallets
//!   walletseal audit --wallet cold            # one wallet
//!   walletseal audit --op sign --chain solana --since 7d

use chrono::Utc;

use crate::audit::{parse_since, AuditEntry, AuditFilter, AuditLog, Operation};
use crate::cli::output;
use crate::cli::Cli;
use crate::errors::{Result, WalletSealError};
use crate::signing::Chain;

/// Execute the `audit` command.
///
/// Filters by wallet only when `--wallet` is given explicitly.
pub fn execute(
    cli: &Cli,
    last: usize,
    since: Option<&str>,
    chain: Option<Chain>,
    operation: Option<Operation>,
) -> Result<()> {
    let ctx = cli.context()?;

    let filter = AuditFilter {
        wallet: cli.wallet.as_ref().map(|_| ctx.wallet.clone()),
        chain,
        operation,
        since: since.map(|s| parse_since(s, Utc::now())).transpose()?,
        limit: last,
    };

    let audit = AuditLog::open(&ctx.vault_dir)
        .ok_or_else(|| WalletSealError::AuditError("failed to open audit database".into()))?;
    let entries = audit.query(&filter)?;

    if entries.is_empty() {
        output::info("No audit entries found.");
        return Ok(());
    }

    print_audit_table(&entries);
    Ok(())
}

fn print_audit_table(entries: &[AuditEntry]) {
    use comfy_table::{ContentArrangement, Table};

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Time (UTC)", "Operation", "Wallet", "Chain", "Signer", "Tx", "Note"]);

    for entry in entries {
        table.add_row(vec![
            entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            entry.operation.clone(),
            entry.wallet.clone(),
            cell(entry.chain.as_deref()),
            cell(entry.signer.as_deref().map(abbreviate).as_deref()),
            cell(entry.tx_hash.as_deref().map(abbreviate).as_deref()),
            cell(entry.note.as_deref()),
        ]);
    }

    println!("{table}");
}

fn cell(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

/// Shorten an address or hash to its head and tail, e.g. `0xf39Fd6..b92266`.
fn abbreviate(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 18 {
        return value.to_string();
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 6..].iter().collect();
    format!("{head}..{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_identifiers_are_abbreviated() {
        assert_eq!(
            abbreviate("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
            "0xf39Fd6..b92266"
        );
        assert_eq!(abbreviate("short"), "short");
        assert_eq!(cell(None), "-");
    }
}
