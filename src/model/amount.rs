//! Amount type for monetary values in Brazilian real formatting.
//!
//! This module provides the `Amount` type which wraps `Decimal` and handles
//! parsing values that may include the `R$` symbol, `.` thousands separators
//! and a `,` decimal comma.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;
use tracing::warn;

/// The currency symbol found in sheet cells and used for display.
pub const CURRENCY_SYMBOL: &str = "R$";

/// Represents a monetary amount in reais.
///
/// Wraps `Decimal` and provides custom serialization/deserialization: cells
/// arrive from the sheet either as plain JSON numbers or as strings in
/// Brazilian formatting. Note that in the string form a period is always a
/// thousands separator and the comma is the decimal mark, so `"1.234,56"`
/// and the number `1234.56` parse to the same value.
///
/// # Examples
///
/// Parsing a formatted string:
/// ```
/// # use caderneta::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("R$ 1.234,56").unwrap();
/// assert_eq!(amount.to_string(), "R$ 1.234,56");
/// ```
///
/// Empty input is zero:
/// ```
/// # use caderneta::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("").unwrap();
/// assert!(amount.is_zero());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    /// Creates a new Amount from a Decimal value.
    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Returns the value as an `f64`, e.g. for ratio math.
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.value().is_zero()
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.value().is_sign_positive()
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.value().is_sign_negative()
    }

    /// Parses a raw sheet cell without ever failing.
    ///
    /// Numeric cells pass through unchanged; string cells go through the
    /// Brazilian-format cleanup of [`Amount::from_str`]. Anything that still
    /// does not parse, and anything negative, becomes zero so that a dirty
    /// row cannot take the whole view down. Blank cells are zero without
    /// comment; garbage is logged.
    pub fn parse_lossy(raw: &Value) -> Amount {
        let parsed = match raw {
            Value::Null => Ok(Amount::default()),
            Value::Number(n) => Decimal::from_str(&n.to_string())
                .map(Amount::new)
                .map_err(|e| e.to_string()),
            Value::String(s) => {
                if s.trim().is_empty() {
                    Ok(Amount::default())
                } else {
                    Amount::from_str(s).map_err(|e| e.to_string())
                }
            }
            other => Err(format!("unexpected cell type: {other}")),
        };
        match parsed {
            Ok(amount) if amount.is_negative() => {
                warn!("negative amount {amount} normalized to zero");
                Amount::default()
            }
            Ok(amount) => amount,
            Err(e) => {
                warn!("unparseable amount {raw}: {e}, defaulting to zero");
                Amount::default()
            }
        }
    }
}

/// An error that can occur when parsing strings into `Decimal` values.
pub struct AmountError(rust_decimal::Error);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        // Handle empty string
        if trimmed.is_empty() {
            return Ok(Amount::default());
        }

        // Remove the currency symbol and any interior whitespace
        let without_symbol: String = trimmed
            .replace(CURRENCY_SYMBOL, "")
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        // Periods are thousands separators, the comma is the decimal mark
        let normalized = without_symbol.replace('.', "").replace(',', ".");

        let value = Decimal::from_str(&normalized).map_err(AmountError)?;
        Ok(Amount(value))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // format_num produces en-US separators; swap them for pt-BR.
        let en = format_num::format_num!(",.2", self.to_f64());
        let br: String = en
            .chars()
            .map(|c| match c {
                ',' => '.',
                '.' => ',',
                c => c,
            })
            .collect();
        write!(f, "{CURRENCY_SYMBOL} {br}")
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // The proxy stores plain numbers, not formatted strings.
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Number(n) => Decimal::from_str(&n.to_string())
                .map(Amount::new)
                .map_err(serde::de::Error::custom),
            Value::String(s) => Amount::from_str(&s).map_err(serde::de::Error::custom),
            other => Err(serde::de::Error::custom(format!(
                "expected an amount, found {other}"
            ))),
        }
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        self.0 += rhs.0;
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Amount) -> Amount {
        Amount(self.0 - rhs.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::default(), Add::add)
    }
}
