//! `walletseal completions`: print a shell completion script.
//!
//! Usage:
//!   walletseal completions bash > ~/.bash_completion.d/walletseal

use std::io::{self, Write};

use clap::CommandFactory;
use clap_complete::Shell;

use crate::cli::Cli;
use crate::errors::Result;

/// Execute the `completions` command.
pub fn execute(shell: Shell) -> Result<()> {
    write_script(shell, &mut io::stdout())
}

fn write_script(shell: Shell, out: &mut dyn Write) -> Result<()> {
    clap_complete::generate(shell, &mut Cli::command(), "walletseal", out);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_covers_the_wallet_commands() {
        let mut script = Vec::new();
        write_script(Shell::Zsh, &mut script).unwrap();
        let script = String::from_utf8(script).unwrap();
        for command in ["rotate-key", "sign", "address"] {
            assert!(script.contains(command), "missing {command}");
        }
    }
}
