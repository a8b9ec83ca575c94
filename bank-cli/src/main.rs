use argh::FromArgs;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

mod credentials;
mod ledger;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    BankError(#[from] bank_core::Error),
    #[error("I/O error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("{0} already exists, use --force to overwrite it")]
    AlreadyExists(camino::Utf8PathBuf),
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error("username and password must not be empty")]
    EmptyCredentials,
}

/// Command-line interface for bank admin and operations tasks.
#[derive(FromArgs, PartialEq, Eq, Debug)]
pub struct Arguments {
    #[argh(subcommand)]
    command: RootCommand,
}

#[derive(FromArgs, PartialEq, Eq, Debug)]
#[argh(subcommand)]
pub enum RootCommand {
    Ledger(ledger::LedgerCommand),
    Credentials(credentials::CredentialsCommand),
}

impl RootCommand {
    pub async fn run(&self) -> Result<(), CliError> {
        match self {
            RootCommand::Ledger(cmd) => cmd.run().await,
            RootCommand::Credentials(cmd) => cmd.run().await,
        }
    }
}

#[tokio::main]
async fn main() {
    if std::env::var_os("RUST_BACKTRACE").is_none() {
        std::env::set_var("RUST_BACKTRACE", "1")
    }

    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "bankcli=debug,bank_core=debug")
    }

    tracing_subscriber::fmt::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Arguments = argh::from_env();
    if let Err(e) = args.command.run().await {
        tracing::error!("command failed: {}", e);
        std::process::exit(1);
    }
}
