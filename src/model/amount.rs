//! Amount type for the money recorded on a transaction.
//!
//! Amounts are never negative. Whether a transaction adds to or subtracts from the balance is
//! decided by its `TransactionType`, not by the sign of its amount.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{self, Debug, Display, Formatter};
use std::str::FromStr;

/// The largest amount a single transaction can hold: `9,999,999,999`.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0x540B_E3FF, 0x2, 0, false, 0);

/// The currency sign accepted as a prefix when parsing and used by [`Amount::formatted`].
const CURRENCY_SIGN: char = '₺';

/// Represents a non-negative amount of money.
///
/// The finance store clamps every amount it receives to [`MAX_AMOUNT`].
///
/// # Examples
///
/// ```
/// # use pocket_ledger::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("₺1,250.5").unwrap();
/// assert_eq!(amount.to_string(), "1250.5");
/// assert_eq!(amount.formatted(), "₺1,250.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);
    pub const MAX: Amount = Amount(MAX_AMOUNT);

    /// Creates an `Amount`, refusing negative values.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value < Decimal::ZERO {
            return Err(AmountError::Negative(value));
        }
        Ok(Self(value))
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns `self`, or [`Amount::MAX`] when `self` is larger than it.
    pub fn clamped(self) -> Self {
        if self.0 > MAX_AMOUNT {
            Self::MAX
        } else {
            self
        }
    }

    /// Formats with a currency sign, thousands separators and two decimals, e.g. `₺60,000.00`.
    pub fn formatted(&self) -> String {
        format!(
            "{CURRENCY_SIGN}{}",
            format_num::format_num!(",.2", self.0.to_f64().unwrap_or_default())
        )
    }
}

/// An error that can occur when turning user input into an `Amount`.
pub enum AmountError {
    Empty,
    Negative(Decimal),
    Invalid(rust_decimal::Error),
}

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Empty => write!(f, "An amount is required"),
            AmountError::Negative(value) => write!(f, "An amount cannot be negative, got {value}"),
            AmountError::Invalid(e) => write!(f, "Invalid amount: {e}"),
        }
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AmountError::Invalid(e) => Some(e),
            _ => None,
        }
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let without_sign = trimmed
            .strip_prefix(CURRENCY_SIGN)
            .unwrap_or(trimmed)
            .trim_start();
        if without_sign.is_empty() {
            return Err(AmountError::Empty);
        }

        // Thousands separators
        let digits = without_sign.replace([',', '_'], "");
        let value = Decimal::from_str(&digits).map_err(AmountError::Invalid)?;
        Amount::new(value)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Amount(Decimal::from(value))
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}
