use clap::Parser;
use tracing_subscriber::EnvFilter;
use walletseal::cli::{commands, output, Cli, Commands};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Init { import, words } => commands::init::execute(&cli, import, words),
        Commands::Address { chain } => commands::address::execute(&cli, chain),
        Commands::Sign { ref request } => commands::sign::execute(&cli, request),
        Commands::RotateKey => commands::rotate::execute(&cli),
        Commands::List => commands::list::execute(&cli),
        Commands::Delete { force } => commands::delete::execute(&cli, force),
        #[cfg(feature = "audit-log")]
        Commands::Audit {
            last,
            ref since,
            chain,
            op,
        } => commands::audit_cmd::execute(&cli, last, since.as_deref(), chain, op),
        #[cfg(not(feature = "audit-log"))]
        Commands::Audit { .. } => Err(walletseal::errors::WalletSealError::CommandFailed(
            "built without the `audit-log` feature".into(),
        )),
        Commands::Completions { shell } => commands::completions::execute(shell),
        Commands::Version => commands::version::execute(),
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}

/// Diagnostics go to stderr so stdout stays clean for signed payloads.
/// `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "walletseal=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
