use bank_core::{Account, AccountNo, Balance, Ledger, LedgerStore, Withdrawal};
use miette::Diagnostic;
use thiserror::Error;

type Result<T> = std::result::Result<T, RepositoryError>;

/// Account operations over the ledger file.
///
/// Each mutation is a separate load, change and save. Nothing serializes
/// concurrent requests, so two overlapping mutations can lose one update.
#[derive(Clone)]
pub struct Repository {
    store: LedgerStore,
}

#[derive(Debug, Error, Diagnostic)]
pub enum RepositoryError {
    #[error("ledger I/O failed")]
    #[diagnostic(code(bank::error::ledger))]
    Ledger(#[source] bank_core::Error),
    #[error("account {account_no} does not exist")]
    #[diagnostic(code(bank::error::not_found))]
    NotFound { account_no: AccountNo },
    #[error("amount {amount} would leave a balance the ledger cannot hold")]
    #[diagnostic(code(bank::error::bad_argument))]
    InvalidAmount { amount: String },
}

impl From<bank_core::Error> for RepositoryError {
    fn from(e: bank_core::Error) -> Self {
        match e {
            bank_core::Error::AccountNotFound(account_no) => Self::NotFound { account_no },
            bank_core::Error::InvalidAmount(amount) => Self::InvalidAmount { amount },
            e => Self::Ledger(e),
        }
    }
}

impl Repository {
    pub fn new(store: LedgerStore) -> Self {
        Self { store }
    }

    pub async fn read_ledger(&self) -> Result<Ledger> {
        Ok(self.store.load().await?)
    }

    pub async fn read_account(&self, account_no: &AccountNo) -> Result<Option<Account>> {
        Ok(self.read_ledger().await?.account(account_no).cloned())
    }

    pub async fn account_exists(&self, account_no: &AccountNo) -> Result<bool> {
        Ok(self.read_ledger().await?.contains(account_no))
    }

    pub async fn open_account(&self, account_type: &str) -> Result<AccountNo> {
        let mut ledger = self.store.load().await?;
        let account_no = ledger.open_account(account_type)?;
        self.store.save(&ledger).await?;

        tracing::trace!(
            account_no = %account_no,
            account_type = account_type,
            "account opened"
        );

        Ok(account_no)
    }

    pub async fn deposit(&self, account_no: &AccountNo, amount: Balance) -> Result<Balance> {
        let mut ledger = self.store.load().await?;
        let balance = ledger.deposit(account_no, amount)?;
        self.store.save(&ledger).await?;

        tracing::trace!(
            account_no = %account_no,
            amount = %amount,
            balance = %balance,
            "deposit completed"
        );

        Ok(balance)
    }

    /// Withdraws `amount` if that leaves a positive balance. A refused
    /// withdrawal does not touch the ledger file.
    pub async fn withdraw(&self, account_no: &AccountNo, amount: Balance) -> Result<Withdrawal> {
        let mut ledger = self.store.load().await?;
        let withdrawal = ledger.withdraw(account_no, amount)?;

        match withdrawal {
            Withdrawal::Completed { balance } => {
                self.store.save(&ledger).await?;
                tracing::trace!(
                    account_no = %account_no,
                    amount = %amount,
                    balance = %balance,
                    "withdrawal completed"
                );
            }
            Withdrawal::InsufficientFunds { balance } => {
                tracing::trace!(
                    account_no = %account_no,
                    amount = %amount,
                    balance = %balance,
                    "withdrawal refused, insufficient funds"
                );
            }
        }

        Ok(withdrawal)
    }
}
