use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{AccountNo, Balance, Error};

/// A single account record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub account_type: String,
    pub account_balance: Balance,
}

/// The ledger document: every account keyed by its number, plus the last
/// number issued.
///
/// Serialized as one flat JSON object, accounts first and `lastID` last:
///
/// ```json
/// {
///   "0000001": { "accountType": "savings", "accountBalance": 100 },
///   "lastID": "0000001"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(flatten)]
    accounts: BTreeMap<AccountNo, Account>,
    #[serde(rename = "lastID", default)]
    last_id: AccountNo,
}

/// Result of a withdrawal attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Withdrawal {
    /// The new balance was committed.
    Completed { balance: Balance },
    /// The withdrawal would not leave a positive balance, nothing changed.
    InsufficientFunds { balance: Balance },
}

impl Withdrawal {
    pub fn is_completed(&self) -> bool {
        matches!(self, Withdrawal::Completed { .. })
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_id(&self) -> AccountNo {
        self.last_id
    }

    pub fn account(&self, account_no: &AccountNo) -> Option<&Account> {
        self.accounts.get(account_no)
    }

    pub fn contains(&self, account_no: &AccountNo) -> bool {
        self.accounts.contains_key(account_no)
    }

    pub fn accounts(&self) -> impl Iterator<Item = (&AccountNo, &Account)> {
        self.accounts.iter()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Opens a new account with a zero balance under the number following
    /// `lastID`, and advances `lastID` to it.
    pub fn open_account(&mut self, account_type: &str) -> Result<AccountNo, Error> {
        let account_no = self.last_id.next()?;
        self.accounts.insert(
            account_no,
            Account {
                account_type: account_type.to_string(),
                account_balance: Balance::ZERO,
            },
        );
        self.last_id = account_no;
        Ok(account_no)
    }

    /// Adds `amount` to the account balance and returns the new balance.
    /// The amount is not checked for sign, but a deposit that would push
    /// the balance out of the finite range is rejected.
    pub fn deposit(&mut self, account_no: &AccountNo, amount: Balance) -> Result<Balance, Error> {
        let account = self.account_mut(account_no)?;
        let balance = account.account_balance + amount;
        if !balance.is_finite() {
            return Err(Error::InvalidAmount(amount.to_string()));
        }
        account.account_balance = balance;
        Ok(balance)
    }

    /// Subtracts `amount` from the account balance, but only if the result
    /// stays strictly positive. Emptying an account to exactly zero counts
    /// as insufficient funds.
    pub fn withdraw(
        &mut self,
        account_no: &AccountNo,
        amount: Balance,
    ) -> Result<Withdrawal, Error> {
        let account = self.account_mut(account_no)?;
        let balance = account.account_balance - amount;
        if !balance.is_finite() {
            return Err(Error::InvalidAmount(amount.to_string()));
        }
        if balance.is_positive() {
            account.account_balance = balance;
            Ok(Withdrawal::Completed { balance })
        } else {
            Ok(Withdrawal::InsufficientFunds {
                balance: account.account_balance,
            })
        }
    }

    fn account_mut(&mut self, account_no: &AccountNo) -> Result<&mut Account, Error> {
        self.accounts
            .get_mut(account_no)
            .ok_or(Error::AccountNotFound(*account_no))
    }
}
