use argh::FromArgs;

use crate::CliError;

mod init;
mod show;

/// Creates and inspects ledger files.
#[derive(FromArgs, PartialEq, Eq, Debug)]
#[argh(subcommand, name = "ledger")]
pub struct LedgerCommand {
    #[argh(subcommand)]
    subcommand: LedgerSubCommand,
}

#[derive(FromArgs, PartialEq, Eq, Debug)]
#[argh(subcommand)]
pub enum LedgerSubCommand {
    Init(init::InitLedger),
    Show(show::ShowLedger),
}

impl LedgerCommand {
    pub async fn run(&self) -> Result<(), CliError> {
        match &self.subcommand {
            LedgerSubCommand::Init(cmd) => cmd.run().await,
            LedgerSubCommand::Show(cmd) => cmd.run().await,
        }
    }
}
