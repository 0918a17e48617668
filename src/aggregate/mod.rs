//! The derived views computed from a snapshot.
//!
//! Everything in this module is pure and synchronous: a complete, already
//! fetched [`Snapshot`] goes in, derived views come out. There is no
//! incremental update path; after a mutation the caller fetches a fresh
//! snapshot and recomputes from scratch.

mod goals;
mod options;
mod totals;

pub use goals::{goal_progress, GoalProgress};
pub use options::{derive_options, Options};
pub use totals::{aggregate_totals, month_totals, Totals};

use crate::model::{MonthKey, Snapshot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Every derived view in one place, computed in one shot.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Aggregates {
    totals: Totals,
    goal_progress: BTreeMap<MonthKey, BTreeMap<String, GoalProgress>>,
    options: Options,
}

impl Aggregates {
    /// Computes all derived views from one snapshot.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            totals: aggregate_totals(snapshot.transactions()),
            goal_progress: goal_progress(snapshot.transactions(), snapshot.goals()),
            options: derive_options(snapshot.tags()),
        }
    }

    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    pub fn goal_progress(&self) -> &BTreeMap<MonthKey, BTreeMap<String, GoalProgress>> {
        &self.goal_progress
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The months that have any goal tracking, oldest first.
    pub fn months(&self) -> Vec<MonthKey> {
        self.goal_progress.keys().copied().collect()
    }

    /// The most recent month with goal tracking, the dashboard's default.
    pub fn latest_month(&self) -> Option<MonthKey> {
        self.goal_progress.keys().next_back().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, Goal, Kind, Tag, Transaction};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn snapshot() -> Snapshot {
        let txs = vec![
            Transaction::new(
                NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
                Amount::new(Decimal::new(150, 0)),
                Kind::Expense,
                vec!["Mercado".to_string()],
                "Feira".to_string(),
            ),
            Transaction::new(
                NaiveDate::from_ymd_opt(2025, 12, 5).unwrap(),
                Amount::new(Decimal::new(3000, 0)),
                Kind::Income,
                vec![],
                "Pagamento".to_string(),
            ),
        ];
        let goals = vec![
            Goal::new(
                "12/2025".parse().unwrap(),
                "Mercado".to_string(),
                Amount::new(Decimal::new(500, 0)),
            ),
            Goal::new(
                "01/2026".parse().unwrap(),
                "Mercado".to_string(),
                Amount::new(Decimal::new(500, 0)),
            ),
        ];
        let tags = vec![Tag::new(
            "Mercado".to_string(),
            "#ff6384".to_string(),
            "Despesa".to_string(),
        )];
        Snapshot::new(txs, goals, tags)
    }

    #[test]
    fn test_from_snapshot() {
        let aggregates = Aggregates::from_snapshot(&snapshot());
        assert_eq!(
            aggregates.totals().expense(),
            Amount::new(Decimal::new(150, 0))
        );
        assert_eq!(
            aggregates.totals().income(),
            Amount::new(Decimal::new(3000, 0))
        );
        let december: MonthKey = "12/2025".parse().unwrap();
        assert_eq!(
            aggregates.goal_progress()[&december]["Mercado"].ratio(),
            0.3
        );
        assert_eq!(aggregates.options().tag_names(), ["Mercado"]);
    }

    #[test]
    fn test_months_and_latest() {
        let aggregates = Aggregates::from_snapshot(&snapshot());
        let months: Vec<String> = aggregates.months().iter().map(|m| m.to_string()).collect();
        assert_eq!(months, ["12/2025", "01/2026"]);
        assert_eq!(
            aggregates.latest_month(),
            Some("01/2026".parse().unwrap())
        );
    }

    #[test]
    fn test_empty_snapshot() {
        let aggregates = Aggregates::from_snapshot(&Snapshot::default());
        assert!(aggregates.totals().by_kind().is_empty());
        assert!(aggregates.goal_progress().is_empty());
        assert!(aggregates.options().tag_names().is_empty());
        assert!(aggregates.latest_month().is_none());
    }

    #[test]
    fn test_recompute_is_identical() {
        let snapshot = snapshot();
        assert_eq!(
            Aggregates::from_snapshot(&snapshot),
            Aggregates::from_snapshot(&snapshot)
        );
    }
}
