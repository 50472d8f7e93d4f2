//! `walletseal version`: print the version and the enabled features.

use console::style;

use crate::errors::Result;

/// Execute the `version` command.
pub fn execute() -> Result<()> {
    let current = env!("CARGO_PKG_VERSION");
    println!("walletseal {current}");

    let audit = if cfg!(feature = "audit-log") {
        style("on").green()
    } else {
        style("off").dim()
    };
    println!("  audit log: {audit}");

    Ok(())
}
