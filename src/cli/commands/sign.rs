//! `walletseal sign`: sign a JSON transaction request.
//!
//! Usage:
//!   walletseal sign --request tx.json
//!   cat tx.json | walletseal sign --request -
//!
//! Only the signed transaction JSON goes to stdout, so the output can be
//! piped straight into a broadcaster.

use std::io::{self, Read};
use std::path::Path;

use crate::audit::{self, AuditEvent, Operation};
use crate::cli::{prompt_password, Cli};
use crate::errors::Result;
use crate::signing::{self, SigningRequest};
use crate::vault::read_vault;

/// Execute the `sign` command.
pub fn execute(cli: &Cli, request_source: &str) -> Result<()> {
    let ctx = cli.context()?;

    // Parse the request before asking for a password.
    let request = SigningRequest::from_json(&read_request(request_source)?)?;

    let vault = read_vault(&ctx.vault_path())?;
    let password = prompt_password()?;
    let signed = signing::sign(&vault, password.as_bytes(), request)?;

    println!("{}", signed.to_json()?);

    audit::record(
        &ctx.vault_dir,
        &AuditEvent::new(Operation::Sign, &ctx.wallet).signed(&signed),
    );

    Ok(())
}

/// Read the request JSON from a file, or stdin for `-`.
fn read_request(source: &str) -> Result<String> {
    if source == "-" {
        let mut json = String::new();
        io::stdin().read_to_string(&mut json)?;
        Ok(json)
    } else {
        Ok(std::fs::read_to_string(Path::new(source))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_request_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("tx.json");
        std::fs::write(&path, r#"{"chain":"ethereum"}"#).unwrap();

        let json = read_request(path.to_str().unwrap()).unwrap();
        assert!(json.contains("ethereum"));
    }

    #[test]
    fn missing_request_file_is_io_error() {
        let err = read_request("/nonexistent/tx.json").unwrap_err();
        assert!(matches!(err, crate::errors::WalletSealError::Io(_)));
    }
}
