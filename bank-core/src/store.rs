use camino::{Utf8Path, Utf8PathBuf};

use crate::{Error, Ledger};

/// Whole-file JSON persistence for the [`Ledger`].
///
/// Every call reads or rewrites the entire file. There is no locking and no
/// atomic rename: two overlapping load/save cycles lose one of the updates,
/// and a crash mid-write can leave a truncated file.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: Utf8PathBuf,
}

impl LedgerStore {
    pub fn new<P: Into<Utf8PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub async fn load(&self) -> Result<Ledger, Error> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| Error::ReadError {
                path: self.path.clone(),
                source,
            })?;
        serde_json::from_str(&raw).map_err(|source| Error::ParseError {
            path: self.path.clone(),
            source,
        })
    }

    pub async fn save(&self, ledger: &Ledger) -> Result<(), Error> {
        let json = serde_json::to_string_pretty(ledger)?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|source| Error::WriteError {
                path: self.path.clone(),
                source,
            })?;
        tracing::trace!(
            path = self.path.as_str(),
            accounts = ledger.len(),
            "ledger saved"
        );
        Ok(())
    }
}
