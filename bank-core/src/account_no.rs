use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Error;

/// Number of digits an account number is zero-padded to.
pub const ACCOUNT_NO_WIDTH: usize = 7;

lazy_static! {
    // Zero-padded to seven digits, or wider without padding once the
    // counter outgrows seven digits.
    static ref ACCOUNT_NO_REGEX: Regex = Regex::new(r"^(\d{7}|[1-9]\d{7,})$").unwrap();
}

/// Identifier of an account in the ledger, rendered as a zero-padded
/// seven digit string (`0000042`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountNo(u64);

impl AccountNo {
    pub fn new(n: u64) -> Self {
        Self(n)
    }

    /// The account number issued after this one.
    pub fn next(&self) -> Result<Self, Error> {
        self.0
            .checked_add(1)
            .map(Self)
            .ok_or(Error::AccountNoExhausted(*self))
    }
}

impl FromStr for AccountNo {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !ACCOUNT_NO_REGEX.is_match(s) {
            return Err(Error::InvalidAccountNo(s.to_string()));
        }
        s.parse::<u64>()
            .map(Self)
            .map_err(|_| Error::InvalidAccountNo(s.to_string()))
    }
}

impl fmt::Display for AccountNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$}", self.0, width = ACCOUNT_NO_WIDTH)
    }
}

impl Serialize for AccountNo {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AccountNo {
    fn deserialize<D>(deserializer: D) -> Result<AccountNo, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
