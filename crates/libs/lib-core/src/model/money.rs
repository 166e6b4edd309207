//! # Money
//!
//! Exact two-decimal monetary amounts.
//!
//! Amounts are parsed and rendered through [`rust_decimal::Decimal`] and held as
//! integer minor units (cents), which is also how they are persisted. No binary
//! floating point is involved at any step, so repeated deposits and purchases
//! never drift.
//!
//! ```rust
//! use lib_core::Money;
//!
//! let price = Money::parse_positive("50.00").unwrap();
//! let balance = Money::parse("100").unwrap();
//!
//! assert_eq!(balance.checked_sub(price).unwrap().to_string(), "50.00");
//! ```

use crate::error::AppError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Number of fractional digits carried by every amount.
const SCALE: u32 = 2;

/// Minor units per whole unit (`10^SCALE`).
const MINOR_PER_UNIT: i64 = 100;

/// A monetary amount with exactly two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, sqlx::Type)]
#[sqlx(transparent)]
pub struct Money(i64);

/// Reasons an amount can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    #[error("'{0}' is not a valid decimal amount")]
    NotANumber(String),
    #[error("amounts support at most two decimal places")]
    TooPrecise,
    #[error("amount exceeds the maximum of {}", Money::MAX)]
    OutOfRange,
    #[error("amount must be greater than zero")]
    NotPositive,
}

impl Money {
    pub const ZERO: Money = Money(0);

    /// Largest amount a balance or price may hold (`99,999,999.99`).
    pub const MAX: Money = Money(9_999_999_999);

    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, SCALE)
    }

    /// Convert an exact decimal, rejecting extra precision and out-of-range values.
    pub fn from_decimal(value: Decimal) -> Result<Self, MoneyError> {
        let value = value.normalize();
        if value.scale() > SCALE {
            return Err(MoneyError::TooPrecise);
        }
        if value.abs() > Money::MAX.to_decimal() {
            return Err(MoneyError::OutOfRange);
        }

        value
            .checked_mul(Decimal::from(MINOR_PER_UNIT))
            .and_then(|minor| minor.to_i64())
            .map(Money)
            .ok_or(MoneyError::OutOfRange)
    }

    /// Parse a decimal string such as `"12"`, `"12.5"` or `"12.50"`.
    pub fn parse(input: &str) -> Result<Self, MoneyError> {
        let trimmed = input.trim();
        let value = Decimal::from_str(trimmed)
            .map_err(|_| MoneyError::NotANumber(trimmed.to_string()))?;
        Self::from_decimal(value)
    }

    /// Parse an amount that must be strictly greater than zero.
    pub fn parse_positive(input: &str) -> Result<Self, MoneyError> {
        let amount = Self::parse(input)?;
        if amount.is_positive() {
            Ok(amount)
        } else {
            Err(MoneyError::NotPositive)
        }
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Addition bounded by [`Money::MAX`].
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0
            .checked_add(other.0)
            .filter(|cents| cents.abs() <= Money::MAX.0)
            .map(Money)
    }

    /// Subtraction that refuses to go below zero.
    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0
            .checked_sub(other.0)
            .filter(|cents| *cents >= 0)
            .map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

impl From<MoneyError> for AppError {
    fn from(err: MoneyError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

/// Serialized as a decimal string (`"50.00"`) so clients never see a float.
impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        MoneyInput::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}

/// Raw amount as sent by clients: either a JSON number or a decimal string.
///
/// Kept unparsed so services can report validation failures as
/// [`AppError::InvalidInput`] instead of a body-rejection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MoneyInput {
    Text(String),
    Number(serde_json::Number),
}

impl MoneyInput {
    pub fn parse(&self) -> Result<Money, MoneyError> {
        match self {
            MoneyInput::Text(text) => Money::parse(text),
            MoneyInput::Number(number) => Money::parse(&number.to_string()),
        }
    }

    pub fn parse_positive(&self) -> Result<Money, MoneyError> {
        match self {
            MoneyInput::Text(text) => Money::parse_positive(text),
            MoneyInput::Number(number) => Money::parse_positive(&number.to_string()),
        }
    }
}

impl From<&str> for MoneyInput {
    fn from(text: &str) -> Self {
        MoneyInput::Text(text.to_string())
    }
}

impl From<Money> for MoneyInput {
    fn from(amount: Money) -> Self {
        MoneyInput::Text(amount.to_string())
    }
}
