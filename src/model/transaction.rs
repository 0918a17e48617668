//! A single row from the Registro sheet: one financial event.

use crate::model::{cell_text, cell_u64, parse_iso_date, Amount, MonthKey, RawRow};
use crate::Result;
use anyhow::bail;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::{debug, warn};

/// How many tag slots a registro row carries.
pub const TAG_SLOT_COUNT: usize = 4;

/// Income or expense classification of a transaction.
///
/// The sheet stores the Portuguese words, which are also the wire form.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Kind {
    #[serde(rename = "Receita")]
    Income,
    #[serde(rename = "Despesa")]
    Expense,
}

serde_plain::derive_display_from_serialize!(Kind);
serde_plain::derive_fromstr_from_deserialize!(Kind);

/// A canonical transaction record.
///
/// Rows coming from the proxy are loosely keyed and inconsistently typed;
/// [`Transaction::from_raw`] maps them onto this shape once so nothing
/// downstream has to look at raw cells again. The date is `None` when the
/// cell could not be read as a calendar date; such rows still count toward
/// totals but cannot be attributed to a month.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Transaction {
    date: Option<NaiveDate>,
    description: String,
    amount: Amount,
    kind: Kind,
    /// Non-blank, deduplicated tag names in slot order. The first one is the
    /// primary tag.
    tags: Vec<String>,
    /// Columns we do not know about, preserved as text.
    other_fields: BTreeMap<String, String>,
    /// The sheet row this record came from. `None` until persisted.
    row_number: Option<u64>,
}

impl Transaction {
    pub fn new(
        date: NaiveDate,
        amount: Amount,
        kind: Kind,
        tags: Vec<String>,
        description: String,
    ) -> Self {
        Self {
            date: Some(date),
            description,
            amount,
            kind,
            tags: normalize_tags(tags),
            other_fields: BTreeMap::new(),
            row_number: None,
        }
    }

    /// Maps a raw proxy row onto the canonical record.
    ///
    /// Returns `None` when the row has no usable kind, which covers both the
    /// fully blank filler rows a sheet accumulates and rows whose `Tipo` cell
    /// holds something unrecognized. Everything else is normalized losslessly
    /// or defaulted: bad amounts become zero, bad dates become `None`, blank
    /// and repeated tag slots are dropped.
    pub fn from_raw(raw: &RawRow) -> Option<Self> {
        let mut date_cell = String::new();
        let mut description = String::new();
        let mut amount = Amount::default();
        let mut kind_cell = String::new();
        let mut slots: [String; TAG_SLOT_COUNT] = Default::default();
        let mut other_fields = BTreeMap::new();
        let mut row_number = None;

        for (header, value) in raw {
            match TransactionColumn::from_header(header) {
                Ok(TransactionColumn::Date) => date_cell = cell_text(value),
                Ok(TransactionColumn::Description) => description = cell_text(value),
                Ok(TransactionColumn::Amount) => amount = Amount::parse_lossy(value),
                Ok(TransactionColumn::Kind) => kind_cell = cell_text(value),
                Ok(TransactionColumn::Tag1) => slots[0] = cell_text(value),
                Ok(TransactionColumn::Tag2) => slots[1] = cell_text(value),
                Ok(TransactionColumn::Tag3) => slots[2] = cell_text(value),
                Ok(TransactionColumn::Tag4) => slots[3] = cell_text(value),
                Ok(TransactionColumn::RowNumber) => row_number = cell_u64(value),
                Err(_) => {
                    let _ = other_fields.insert(header.clone(), cell_text(value));
                }
            }
        }

        let kind = match Kind::from_str(kind_cell.trim()) {
            Ok(kind) => kind,
            Err(_) if kind_cell.trim().is_empty() => {
                debug!("skipping registro row {row_number:?} with no kind");
                return None;
            }
            Err(_) => {
                warn!("skipping registro row {row_number:?} with unknown kind {kind_cell:?}");
                return None;
            }
        };

        let date = if date_cell.trim().is_empty() {
            None
        } else {
            let parsed = parse_iso_date(&date_cell);
            if parsed.is_none() {
                warn!("unparseable date {date_cell:?} in registro row {row_number:?}");
            }
            parsed
        };

        Some(Self {
            date,
            description,
            amount,
            kind,
            tags: normalize_tags(slots),
            other_fields,
            row_number,
        })
    }

    /// The full-row wire form for an add operation. The row number is never
    /// included; the sheet assigns it.
    pub fn to_raw(&self) -> RawRow {
        let mut raw = RawRow::new();
        let date = self
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        raw.insert(DATE_STR.to_string(), Value::String(date));
        raw.insert(
            DESCRIPTION_STR.to_string(),
            Value::String(self.description.clone()),
        );
        raw.insert(
            AMOUNT_STR.to_string(),
            serde_json::to_value(self.amount).unwrap_or(Value::Null),
        );
        raw.insert(KIND_STR.to_string(), Value::String(self.kind.to_string()));
        for (ix, header) in [TAG_1_STR, TAG_2_STR, TAG_3_STR, TAG_4_STR]
            .into_iter()
            .enumerate()
        {
            let tag = self.tags.get(ix).cloned().unwrap_or_default();
            raw.insert(header.to_string(), Value::String(tag));
        }
        for (header, value) in &self.other_fields {
            raw.insert(header.clone(), Value::String(value.clone()));
        }
        raw
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// The month this transaction belongs to, when its date is usable.
    pub fn month_key(&self) -> Option<MonthKey> {
        self.date.map(MonthKey::from_date)
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// The first tag slot, which category-breakdown views key on.
    pub fn primary_tag(&self) -> Option<&str> {
        self.tags.first().map(String::as_str)
    }

    pub fn row_number(&self) -> Option<u64> {
        self.row_number
    }
}

/// Drops blank and repeated names, preserving slot order.
fn normalize_tags(slots: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for slot in slots {
        let name = slot.trim();
        if name.is_empty() || tags.iter().any(|t| t == name) {
            continue;
        }
        tags.push(name.to_string());
    }
    tags
}

/// The known columns of the Registro sheet.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum TransactionColumn {
    #[serde(rename = "Data")]
    Date,
    #[serde(rename = "Descricao")]
    Description,
    #[serde(rename = "Valor")]
    Amount,
    #[serde(rename = "Tipo")]
    Kind,
    #[serde(rename = "Tag_1")]
    Tag1,
    #[serde(rename = "Tag_2")]
    Tag2,
    #[serde(rename = "Tag_3")]
    Tag3,
    #[serde(rename = "Tag_4")]
    Tag4,
    #[serde(rename = "ROW_NUMBER")]
    RowNumber,
}

serde_plain::derive_display_from_serialize!(TransactionColumn);
serde_plain::derive_fromstr_from_deserialize!(TransactionColumn);

impl TransactionColumn {
    pub fn from_header(header: impl AsRef<str>) -> Result<TransactionColumn> {
        let header_str = header.as_ref();
        match header_str {
            DATE_STR => Ok(TransactionColumn::Date),
            // The description header appears with and without the accent
            // depending on when the sheet column was created.
            DESCRIPTION_STR | DESCRIPTION_ACCENTED_STR => Ok(TransactionColumn::Description),
            AMOUNT_STR => Ok(TransactionColumn::Amount),
            KIND_STR => Ok(TransactionColumn::Kind),
            TAG_1_STR => Ok(TransactionColumn::Tag1),
            TAG_2_STR => Ok(TransactionColumn::Tag2),
            TAG_3_STR => Ok(TransactionColumn::Tag3),
            TAG_4_STR => Ok(TransactionColumn::Tag4),
            ROW_NUMBER_STR => Ok(TransactionColumn::RowNumber),
            bad => bail!("Invalid registro column name '{bad}'"),
        }
    }

    pub fn as_header_str(&self) -> &'static str {
        match self {
            TransactionColumn::Date => DATE_STR,
            TransactionColumn::Description => DESCRIPTION_STR,
            TransactionColumn::Amount => AMOUNT_STR,
            TransactionColumn::Kind => KIND_STR,
            TransactionColumn::Tag1 => TAG_1_STR,
            TransactionColumn::Tag2 => TAG_2_STR,
            TransactionColumn::Tag3 => TAG_3_STR,
            TransactionColumn::Tag4 => TAG_4_STR,
            TransactionColumn::RowNumber => ROW_NUMBER_STR,
        }
    }
}

pub(super) const DATE_STR: &str = "Data";
pub(super) const DESCRIPTION_STR: &str = "Descricao";
pub(super) const DESCRIPTION_ACCENTED_STR: &str = "Descrição";
pub(super) const AMOUNT_STR: &str = "Valor";
pub(super) const KIND_STR: &str = "Tipo";
pub(super) const TAG_1_STR: &str = "Tag_1";
pub(super) const TAG_2_STR: &str = "Tag_2";
pub(super) const TAG_3_STR: &str = "Tag_3";
pub(super) const TAG_4_STR: &str = "Tag_4";
pub(super) const ROW_NUMBER_STR: &str = "ROW_NUMBER";

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn raw_row(value: Value) -> RawRow {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    #[test]
    fn test_from_raw_full_row() {
        let raw = raw_row(json!({
            "Data": "2025-12-01",
            "Descricao": "Feira da semana",
            "Valor": "R$ 150,00",
            "Tipo": "Despesa",
            "Tag_1": "Mercado",
            "Tag_2": "",
            "Tag_3": "",
            "Tag_4": "",
            "ROW_NUMBER": 2,
        }));
        let tx = Transaction::from_raw(&raw).unwrap();
        assert_eq!(tx.date(), NaiveDate::from_ymd_opt(2025, 12, 1));
        assert_eq!(tx.description(), "Feira da semana");
        assert_eq!(tx.amount().value(), Decimal::new(150, 0));
        assert_eq!(tx.kind(), Kind::Expense);
        assert_eq!(tx.tags(), ["Mercado"]);
        assert_eq!(tx.primary_tag(), Some("Mercado"));
        assert_eq!(tx.row_number(), Some(2));
    }

    #[test]
    fn test_from_raw_accepts_accented_description_header() {
        let raw = raw_row(json!({
            "Descrição": "Aluguel",
            "Valor": 1200,
            "Tipo": "Despesa",
        }));
        let tx = Transaction::from_raw(&raw).unwrap();
        assert_eq!(tx.description(), "Aluguel");
    }

    #[test]
    fn test_from_raw_numeric_amount() {
        let raw = raw_row(json!({"Valor": 99.9, "Tipo": "Receita"}));
        let tx = Transaction::from_raw(&raw).unwrap();
        assert_eq!(tx.amount().value(), Decimal::new(999, 1));
        assert_eq!(tx.kind(), Kind::Income);
    }

    #[test]
    fn test_from_raw_bad_amount_is_zero() {
        let raw = raw_row(json!({"Valor": "???", "Tipo": "Despesa"}));
        let tx = Transaction::from_raw(&raw).unwrap();
        assert!(tx.amount().is_zero());
    }

    #[test]
    fn test_from_raw_bad_date_is_none() {
        let raw = raw_row(json!({"Data": "12/01/2025", "Tipo": "Despesa"}));
        let tx = Transaction::from_raw(&raw).unwrap();
        assert!(tx.date().is_none());
        assert!(tx.month_key().is_none());
    }

    #[test]
    fn test_from_raw_datetime_suffix() {
        let raw = raw_row(json!({"Data": "2025-12-01T03:00:00.000Z", "Tipo": "Receita"}));
        let tx = Transaction::from_raw(&raw).unwrap();
        assert_eq!(tx.date(), NaiveDate::from_ymd_opt(2025, 12, 1));
    }

    #[test]
    fn test_from_raw_missing_kind_skips_row() {
        let raw = raw_row(json!({"Data": "2025-12-01", "Valor": 10}));
        assert!(Transaction::from_raw(&raw).is_none());

        let raw = raw_row(json!({"Tipo": "", "Valor": 10}));
        assert!(Transaction::from_raw(&raw).is_none());
    }

    #[test]
    fn test_from_raw_unknown_kind_skips_row() {
        let raw = raw_row(json!({"Tipo": "Transferencia", "Valor": 10}));
        assert!(Transaction::from_raw(&raw).is_none());
    }

    #[test]
    fn test_from_raw_tags_drop_blanks_and_duplicates() {
        let raw = raw_row(json!({
            "Tipo": "Despesa",
            "Tag_1": "Mercado",
            "Tag_2": "  ",
            "Tag_3": "Mercado",
            "Tag_4": "Lazer",
        }));
        let tx = Transaction::from_raw(&raw).unwrap();
        assert_eq!(tx.tags(), ["Mercado", "Lazer"]);
    }

    #[test]
    fn test_from_raw_trims_tag_names() {
        let raw = raw_row(json!({"Tipo": "Despesa", "Tag_2": " Luz "}));
        let tx = Transaction::from_raw(&raw).unwrap();
        assert_eq!(tx.tags(), ["Luz"]);
        assert_eq!(tx.primary_tag(), Some("Luz"));
    }

    #[test]
    fn test_from_raw_unknown_column_goes_to_other_fields() {
        let raw = raw_row(json!({"Tipo": "Despesa", "Forma do pagamento": "Crédito"}));
        let tx = Transaction::from_raw(&raw).unwrap();
        assert_eq!(
            tx.other_fields.get("Forma do pagamento").map(String::as_str),
            Some("Crédito")
        );
    }

    #[test]
    fn test_to_raw() {
        let tx = Transaction::new(
            NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
            Amount::new(Decimal::new(15050, 2)),
            Kind::Expense,
            vec!["Mercado".to_string(), "Casa".to_string()],
            "Feira".to_string(),
        );
        let raw = tx.to_raw();
        assert_eq!(raw.get(DATE_STR), Some(&json!("2025-12-01")));
        assert_eq!(raw.get(DESCRIPTION_STR), Some(&json!("Feira")));
        assert_eq!(raw.get(AMOUNT_STR), Some(&json!(150.5)));
        assert_eq!(raw.get(KIND_STR), Some(&json!("Despesa")));
        assert_eq!(raw.get(TAG_1_STR), Some(&json!("Mercado")));
        assert_eq!(raw.get(TAG_2_STR), Some(&json!("Casa")));
        assert_eq!(raw.get(TAG_3_STR), Some(&json!("")));
        assert!(!raw.contains_key(ROW_NUMBER_STR));
    }

    #[test]
    fn test_round_trip_through_raw() {
        let tx = Transaction::new(
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            Amount::new(Decimal::new(4200, 2)),
            Kind::Income,
            vec!["Salario".to_string()],
            "Pagamento".to_string(),
        );
        let back = Transaction::from_raw(&tx.to_raw()).unwrap();
        assert_eq!(back.date(), tx.date());
        assert_eq!(back.amount(), tx.amount());
        assert_eq!(back.kind(), tx.kind());
        assert_eq!(back.tags(), tx.tags());
        assert_eq!(back.description(), tx.description());
    }

    #[test]
    fn test_kind_display_and_from_str() {
        assert_eq!(Kind::Income.to_string(), "Receita");
        assert_eq!(Kind::Expense.to_string(), "Despesa");
        assert_eq!(Kind::from_str("Receita").unwrap(), Kind::Income);
        assert_eq!(Kind::from_str("Despesa").unwrap(), Kind::Expense);
        // Matching is exact, like the sheet's validation list.
        assert!(Kind::from_str("despesa").is_err());
        assert!(Kind::from_str("Transfer").is_err());
    }

    #[test]
    fn test_column_from_header() {
        assert_eq!(
            TransactionColumn::from_header("Valor").unwrap(),
            TransactionColumn::Amount
        );
        assert_eq!(
            TransactionColumn::from_header("Descrição").unwrap(),
            TransactionColumn::Description
        );
        assert!(TransactionColumn::from_header("Unknown").is_err());
    }

    #[test]
    fn test_column_display_is_header() {
        assert_eq!(TransactionColumn::Amount.to_string(), "Valor");
        assert_eq!(TransactionColumn::RowNumber.to_string(), "ROW_NUMBER");
    }
}
