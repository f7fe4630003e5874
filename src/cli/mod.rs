// CLI module
// Command-line interface, argument parsing and subcommand dispatch

mod args;
mod commands;

pub use args::{CliArgs, Command, GenerateArgs, ReconcileArgs};
pub use commands::{generate, reconcile};

use crate::config::tenant_from_env;
use crate::types::{BankConfig, CnabError};
use clap::Parser;

/// Parse command-line arguments using clap
///
/// On invalid arguments or `--help`, clap prints the message and exits the
/// process.
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}

/// Run a parsed command against the environment configuration
///
/// Reports go to stdout; logs go wherever the subscriber writes.
pub fn run(cli: CliArgs) -> Result<(), CnabError> {
    let tenant_id = tenant_from_env()?;
    let mut stdout = std::io::stdout();

    match cli.command {
        Command::Generate(args) => {
            let bank = BankConfig::from_env()?;
            generate(&args, &bank, tenant_id, &mut stdout)?;
        }
        Command::Reconcile(args) => {
            reconcile(&args, tenant_id, &mut stdout)?;
        }
    }
    Ok(())
}
