use argh::FromArgs;
use bank_core::LedgerStore;
use camino::Utf8PathBuf;

use crate::CliError;

/// Print every account in a ledger file.
#[derive(FromArgs, PartialEq, Eq, Debug)]
#[argh(subcommand, name = "show")]
pub struct ShowLedger {
    /// path to ledger file (default: accounts.json in current directory)
    #[argh(positional, default = "Utf8PathBuf::from(\"accounts.json\")")]
    file_name: Utf8PathBuf,
}

impl ShowLedger {
    pub async fn run(&self) -> Result<(), CliError> {
        let ledger = LedgerStore::new(self.file_name.clone()).load().await?;

        for (account_no, account) in ledger.accounts() {
            tracing::info!(
                account_no = %account_no,
                account_type = account.account_type.as_str(),
                balance = %account.account_balance,
                "account"
            );
        }

        tracing::info!(
            "{} account(s), last issued account number {}",
            ledger.len(),
            ledger.last_id()
        );

        Ok(())
    }
}
