//! Types that represent the core data model, such as `Transaction`, `Goal`
//! and `Tag`, plus the snapshot the aggregation runs over.

mod amount;
mod goal;
mod month_key;
mod tag;
mod transaction;

pub use amount::{Amount, AmountError, CURRENCY_SYMBOL};
pub use goal::{Goal, GoalColumn};
pub use month_key::{parse_iso_date, MonthKey, ASSUMED_CENTURY};
pub use tag::{Tag, TagColumn, DEFAULT_TAG_COLOR};
pub use transaction::{Kind, Transaction, TransactionColumn, TAG_SLOT_COUNT};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One row as the proxy returns it: sheet header -> cell value.
pub type RawRow = serde_json::Map<String, Value>;

/// The synthetic column the proxy stamps onto every fetched row.
pub(crate) const ROW_NUMBER_KEY: &str = "ROW_NUMBER";

/// An immutable read of all three sheets, taken in one fetch.
///
/// Everything derived is recomputed from a snapshot wholesale; nothing is
/// ever patched in place after a mutation, the caller fetches a new one.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Snapshot {
    /// Canonical rows from the Registro sheet.
    transactions: Vec<Transaction>,
    /// Canonical rows from the Metas sheet.
    goals: Vec<Goal>,
    /// Canonical rows from the Organizadores sheet.
    tags: Vec<Tag>,
}

impl Snapshot {
    pub fn new(transactions: Vec<Transaction>, goals: Vec<Goal>, tags: Vec<Tag>) -> Self {
        Self {
            transactions,
            goals,
            tags,
        }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }
}

/// Reads a loosely-typed cell as text. Scalars stringify; anything
/// structured is not expected in a cell and reads as empty.
pub(crate) fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(_) | Value::Object(_) => String::new(),
    }
}

/// Reads a cell as a row number, accepting the numeric form the proxy sends
/// and the string form a sheet export sometimes produces.
pub(crate) fn cell_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&json!("Mercado")), "Mercado");
        assert_eq!(cell_text(&json!(12.5)), "12.5");
        assert_eq!(cell_text(&Value::Null), "");
        assert_eq!(cell_text(&json!([1, 2])), "");
    }

    #[test]
    fn test_cell_u64() {
        assert_eq!(cell_u64(&json!(7)), Some(7));
        assert_eq!(cell_u64(&json!("7")), Some(7));
        assert_eq!(cell_u64(&json!(" 12 ")), Some(12));
        assert_eq!(cell_u64(&json!(-1)), None);
        assert_eq!(cell_u64(&json!("abc")), None);
    }

    #[test]
    fn test_snapshot_serde_round_trip() {
        let snapshot = Snapshot::new(
            vec![],
            vec![Goal::new(
                MonthKey::new(2025, 12).unwrap(),
                "Mercado".to_string(),
                Amount::default(),
            )],
            vec![Tag::new("Mercado".to_string(), String::new(), String::new())],
        );
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
