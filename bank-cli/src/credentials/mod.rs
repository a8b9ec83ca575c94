use argh::FromArgs;

use crate::CliError;

mod add;

/// Manages the login credentials file.
#[derive(FromArgs, PartialEq, Eq, Debug)]
#[argh(subcommand, name = "credentials")]
pub struct CredentialsCommand {
    #[argh(subcommand)]
    subcommand: CredentialsSubCommand,
}

#[derive(FromArgs, PartialEq, Eq, Debug)]
#[argh(subcommand)]
pub enum CredentialsSubCommand {
    Add(add::AddUser),
}

impl CredentialsCommand {
    pub async fn run(&self) -> Result<(), CliError> {
        match &self.subcommand {
            CredentialsSubCommand::Add(cmd) => cmd.run().await,
        }
    }
}
