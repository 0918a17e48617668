//! Month keys and date-cell parsing.
//!
//! Transactions carry full `YYYY-MM-DD` dates while the metas sheet stores
//! months as `MM/YY`. Both collapse into a `MonthKey`, which renders in the
//! canonical `MM/YYYY` form used by the derived views.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Two-digit years on the metas sheet are assumed to fall in the 2000s.
/// A latent defect past 2099, acceptable for this sheet's lifetime.
pub const ASSUMED_CENTURY: i32 = 2000;

/// A year-month identifier.
/// Serializes to its canonical `MM/YYYY` string form.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MonthKey {
    // Field order matters for the derived `Ord`: year before month gives
    // chronological iteration over BTreeMap keys.
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> crate::Result<Self> {
        if !(1..=12).contains(&month) {
            anyhow::bail!("month must be between 1 and 12, got: {month}");
        }
        Ok(Self { year, month })
    }

    /// The month key of a calendar date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The `MM/YY` form the metas sheet stores.
    pub fn short(&self) -> String {
        format!("{:02}/{:02}", self.month, self.year.rem_euclid(100))
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:04}", self.month, self.year)
    }
}

impl FromStr for MonthKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Expected format: "MM/YYYY" or the sheet's short "MM/YY"
        let s = s.trim();
        let parts: Vec<&str> = s.split('/').collect();
        if parts.len() != 2 {
            anyhow::bail!("month key must be in format 'MM/YYYY' or 'MM/YY', got: {s}");
        }

        let month = parts[0]
            .parse::<u32>()
            .map_err(|e| anyhow::anyhow!("invalid month in {s:?}: {e}"))?;
        let year = match parts[1].len() {
            2 => {
                let short = parts[1]
                    .parse::<i32>()
                    .map_err(|e| anyhow::anyhow!("invalid year in {s:?}: {e}"))?;
                ASSUMED_CENTURY + short
            }
            4 => parts[1]
                .parse::<i32>()
                .map_err(|e| anyhow::anyhow!("invalid year in {s:?}: {e}"))?,
            _ => anyhow::bail!("year must have 2 or 4 digits, got: {s}"),
        };

        MonthKey::new(year, month)
    }
}

impl Serialize for MonthKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        MonthKey::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Parses the date cell of a transaction row.
///
/// The sheet sometimes returns bare `YYYY-MM-DD` strings and sometimes full
/// datetime strings, so only the 10-character ISO prefix is considered.
/// Anything shorter, or a prefix that is not a real calendar date, yields
/// `None`; callers skip such rows for month attribution rather than invent a
/// date for them.
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    let prefix = raw.trim().get(0..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}
