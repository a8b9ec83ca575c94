use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Error;

// Largest integer an f64 holds exactly.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Monetary amount stored in the ledger as a plain JSON number.
///
/// Whole values are written without a fractional part (`100`, not `100.0`),
/// so a ledger written by hand or by another tool survives a load/save cycle
/// unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct Balance(f64);

impl Balance {
    pub const ZERO: Balance = Balance(0.0);

    pub fn new(value: f64) -> Self {
        Self(value)
    }

    /// Whether the balance can be written to the ledger as a JSON number.
    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0.0
    }

    fn as_exact_integer(&self) -> Option<i64> {
        if self.0.fract() == 0.0 && self.0.abs() < MAX_EXACT_INTEGER {
            Some(self.0 as i64)
        } else {
            None
        }
    }
}

impl Add for Balance {
    type Output = Balance;

    fn add(self, rhs: Balance) -> Balance {
        Balance(self.0 + rhs.0)
    }
}

impl Sub for Balance {
    type Output = Balance;

    fn sub(self, rhs: Balance) -> Balance {
        Balance(self.0 - rhs.0)
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_exact_integer() {
            Some(n) => write!(f, "{}", n),
            None => write!(f, "{}", self.0),
        }
    }
}

impl Serialize for Balance {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.as_exact_integer() {
            Some(n) => serializer.serialize_i64(n),
            None => serializer.serialize_f64(self.0),
        }
    }
}

impl<'de> Deserialize<'de> for Balance {
    fn deserialize<D>(deserializer: D) -> Result<Balance, D::Error>
    where
        D: Deserializer<'de>,
    {
        f64::deserialize(deserializer).map(Balance)
    }
}

/// Parses an amount entered in a form field.
///
/// Blank input counts as zero and negative numbers are accepted as-is; input
/// that is not a finite number is rejected so it never reaches the ledger.
pub fn parse_amount(input: &str) -> Result<Balance, Error> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(Balance::ZERO);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Balance(value)),
        _ => Err(Error::InvalidAmount(input.to_string())),
    }
}
