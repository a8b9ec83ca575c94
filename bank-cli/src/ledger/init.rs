use argh::FromArgs;
use bank_core::{Ledger, LedgerStore};
use camino::Utf8PathBuf;

use crate::CliError;

/// Create an empty ledger file.
#[derive(FromArgs, PartialEq, Eq, Debug)]
#[argh(subcommand, name = "init")]
pub struct InitLedger {
    /// path to ledger file to create (default: accounts.json in current directory)
    #[argh(positional, default = "Utf8PathBuf::from(\"accounts.json\")")]
    file_name: Utf8PathBuf,
    /// overwrite the file if it already exists
    #[argh(switch)]
    force: bool,
}

impl InitLedger {
    pub async fn run(&self) -> Result<(), CliError> {
        if self.file_name.exists() && !self.force {
            return Err(CliError::AlreadyExists(self.file_name.clone()));
        }

        let ledger = Ledger::new();
        LedgerStore::new(self.file_name.clone()).save(&ledger).await?;

        tracing::info!(
            "created empty ledger {}, next account number is {}",
            self.file_name,
            ledger.last_id().next()?
        );

        Ok(())
    }
}
