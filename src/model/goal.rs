//! A single row from the Metas sheet: a monthly spending target for one tag.

use crate::model::{cell_text, cell_u64, Amount, MonthKey, RawRow};
use crate::Result;
use anyhow::bail;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::warn;

/// A canonical goal record.
///
/// The month is `None` when the `Mes` cell could not be read; the row stays
/// in the snapshot so it can still be listed and fixed, but goal-progress
/// derivation skips it.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Goal {
    month: Option<MonthKey>,
    tag: String,
    target: Amount,
    other_fields: BTreeMap<String, String>,
    row_number: Option<u64>,
}

impl Goal {
    pub fn new(month: MonthKey, tag: String, target: Amount) -> Self {
        Self {
            month: Some(month),
            tag: tag.trim().to_string(),
            target,
            other_fields: BTreeMap::new(),
            row_number: None,
        }
    }

    /// Maps a raw proxy row onto the canonical record. Total: every row
    /// produces a `Goal`, however dirty.
    pub fn from_raw(raw: &RawRow) -> Self {
        let mut month_cell = String::new();
        let mut tag = String::new();
        let mut target = Amount::default();
        let mut other_fields = BTreeMap::new();
        let mut row_number = None;

        for (header, value) in raw {
            match GoalColumn::from_header(header) {
                Ok(GoalColumn::Month) => month_cell = cell_text(value),
                Ok(GoalColumn::Tag) => tag = cell_text(value),
                Ok(GoalColumn::Target) => target = Amount::parse_lossy(value),
                Ok(GoalColumn::RowNumber) => row_number = cell_u64(value),
                Err(_) => {
                    let _ = other_fields.insert(header.clone(), cell_text(value));
                }
            }
        }

        let month = if month_cell.trim().is_empty() {
            None
        } else {
            match MonthKey::from_str(&month_cell) {
                Ok(month) => Some(month),
                Err(e) => {
                    warn!("unusable month {month_cell:?} in meta row {row_number:?}: {e}");
                    None
                }
            }
        };

        Self {
            month,
            tag: tag.trim().to_string(),
            target,
            other_fields,
            row_number,
        }
    }

    /// The full-row wire form for an add operation, with the month in the
    /// sheet's short `MM/YY` form.
    pub fn to_raw(&self) -> RawRow {
        let mut raw = RawRow::new();
        let month = self.month.map(|m| m.short()).unwrap_or_default();
        raw.insert(MONTH_STR.to_string(), Value::String(month));
        raw.insert(TAG_STR.to_string(), Value::String(self.tag.clone()));
        raw.insert(
            TARGET_STR.to_string(),
            serde_json::to_value(self.target).unwrap_or(Value::Null),
        );
        for (header, value) in &self.other_fields {
            raw.insert(header.clone(), Value::String(value.clone()));
        }
        raw
    }

    pub fn month(&self) -> Option<MonthKey> {
        self.month
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn target(&self) -> Amount {
        self.target
    }

    pub fn row_number(&self) -> Option<u64> {
        self.row_number
    }
}

/// The known columns of the Metas sheet.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum GoalColumn {
    #[serde(rename = "Mes")]
    Month,
    #[serde(rename = "Tag")]
    Tag,
    #[serde(rename = "Meta")]
    Target,
    #[serde(rename = "ROW_NUMBER")]
    RowNumber,
}

serde_plain::derive_display_from_serialize!(GoalColumn);
serde_plain::derive_fromstr_from_deserialize!(GoalColumn);

impl GoalColumn {
    pub fn from_header(header: impl AsRef<str>) -> Result<GoalColumn> {
        let header_str = header.as_ref();
        match header_str {
            MONTH_STR | MONTH_ACCENTED_STR => Ok(GoalColumn::Month),
            TAG_STR => Ok(GoalColumn::Tag),
            TARGET_STR => Ok(GoalColumn::Target),
            ROW_NUMBER_STR => Ok(GoalColumn::RowNumber),
            bad => bail!("Invalid meta column name '{bad}'"),
        }
    }

    pub fn as_header_str(&self) -> &'static str {
        match self {
            GoalColumn::Month => MONTH_STR,
            GoalColumn::Tag => TAG_STR,
            GoalColumn::Target => TARGET_STR,
            GoalColumn::RowNumber => ROW_NUMBER_STR,
        }
    }
}

pub(super) const MONTH_STR: &str = "Mes";
pub(super) const MONTH_ACCENTED_STR: &str = "Mês";
pub(super) const TAG_STR: &str = "Tag";
pub(super) const TARGET_STR: &str = "Meta";
pub(super) const ROW_NUMBER_STR: &str = "ROW_NUMBER";
