//! Single-pass kind and tag totals over transactions.

use crate::model::{Amount, Kind, MonthKey, Transaction};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summed amounts by kind, and expense amounts by primary tag.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Totals {
    /// Every transaction's amount, keyed by its kind. Kinds that never
    /// occur are simply absent.
    by_kind: BTreeMap<Kind, Amount>,
    /// Expense amounts keyed by the transaction's primary tag only.
    /// Secondary tags never contribute here; they matter for goal
    /// attribution, not for the spending breakdown.
    expenses_by_tag: BTreeMap<String, Amount>,
}

impl Totals {
    pub fn by_kind(&self) -> &BTreeMap<Kind, Amount> {
        &self.by_kind
    }

    pub fn expenses_by_tag(&self) -> &BTreeMap<String, Amount> {
        &self.expenses_by_tag
    }

    pub fn income(&self) -> Amount {
        self.by_kind.get(&Kind::Income).copied().unwrap_or_default()
    }

    pub fn expense(&self) -> Amount {
        self.by_kind
            .get(&Kind::Expense)
            .copied()
            .unwrap_or_default()
    }

    /// Income minus expense, the saldo. May be negative.
    pub fn net(&self) -> Amount {
        self.income() - self.expense()
    }
}

/// Sums every transaction into [`Totals`] in one pass.
pub fn aggregate_totals<'a, I>(transactions: I) -> Totals
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut totals = Totals::default();
    for tx in transactions {
        *totals.by_kind.entry(tx.kind()).or_default() += tx.amount();
        if tx.kind() == Kind::Expense {
            if let Some(primary) = tx.primary_tag() {
                *totals
                    .expenses_by_tag
                    .entry(primary.to_string())
                    .or_default() += tx.amount();
            }
        }
    }
    totals
}

/// [`aggregate_totals`] restricted to the transactions of one month.
/// Rows without a usable date belong to no month and never appear here.
pub fn month_totals(transactions: &[Transaction], month: MonthKey) -> Totals {
    aggregate_totals(
        transactions
            .iter()
            .filter(|tx| tx.month_key() == Some(month)),
    )
}
