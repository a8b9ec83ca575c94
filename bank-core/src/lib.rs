use camino::Utf8PathBuf;

pub mod account_no;
pub mod amount;
pub mod credentials;
pub mod ledger;
pub mod store;

pub use account_no::AccountNo;
pub use amount::Balance;
pub use credentials::{Credentials, LoginError, PasswordCheck};
pub use ledger::{Account, Ledger, Withdrawal};
pub use store::LedgerStore;

pub const LEDGER_FILE_ENV: &str = "LEDGER_FILE";
pub const CREDENTIALS_FILE_ENV: &str = "CREDENTIALS_FILE";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    ReadError {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    ParseError {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write {path}: {source}")]
    WriteError {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON serialization error: {0}")]
    JSONSerializationError(#[from] serde_json::Error),
    #[error("account {0} does not exist")]
    AccountNotFound(AccountNo),
    #[error("'{0}' is not a valid account number")]
    InvalidAccountNo(String),
    #[error("'{0}' is not a valid amount")]
    InvalidAmount(String),
    #[error("no account number follows {0}")]
    AccountNoExhausted(AccountNo),
}

impl Error {
    /// Whether this error came from loading a file, as opposed to saving one.
    pub fn is_read_error(&self) -> bool {
        matches!(self, Error::ReadError { .. } | Error::ParseError { .. })
    }
}
