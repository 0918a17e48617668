//! Goal progress: realized spending reconciled against monthly targets.

use crate::model::{Amount, Goal, Kind, MonthKey, Transaction};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// One goal's standing for one month: the target, what was actually spent,
/// and how much of the target that consumes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GoalProgress {
    target: Amount,
    actual: Amount,
    ratio: f64,
}

impl GoalProgress {
    /// Builds the progress entry, guarding the zero-target cases: spending
    /// against a zero target counts as fully consumed (ratio 1.0) rather
    /// than dividing by zero, and no target with no spending is simply 0.
    pub fn new(target: Amount, actual: Amount) -> Self {
        let ratio = if target.is_positive() {
            actual.to_f64() / target.to_f64()
        } else if actual.is_positive() {
            1.0
        } else {
            0.0
        };
        Self {
            target,
            actual,
            ratio,
        }
    }

    pub fn target(&self) -> Amount {
        self.target
    }

    pub fn actual(&self) -> Amount {
        self.actual
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// The ratio as a percentage, for display.
    pub fn percent(&self) -> f64 {
        self.ratio * 100.0
    }

    /// Whether spending has reached or passed the target.
    pub fn exhausted(&self) -> bool {
        self.ratio >= 1.0
    }
}

/// Reconciles goals against expense transactions, month by month, tag by tag.
///
/// Two passes. First, every expense with a usable date credits its full
/// amount to **each** tag it carries, under the transaction's month. This is
/// deliberately wider than the primary-tag spending breakdown: a goal may
/// target any of the four tag slots, so spending must count against all of
/// them. Second, every usable goal row looks up its realized amount
/// (defaulting to zero) and becomes a [`GoalProgress`] entry. When two goal
/// rows name the same month and tag, the later row wins.
pub fn goal_progress<'a, T, G>(
    transactions: T,
    goals: G,
) -> BTreeMap<MonthKey, BTreeMap<String, GoalProgress>>
where
    T: IntoIterator<Item = &'a Transaction>,
    G: IntoIterator<Item = &'a Goal>,
{
    // Realized pass
    let mut realized: BTreeMap<MonthKey, BTreeMap<&str, Amount>> = BTreeMap::new();
    for tx in transactions {
        if tx.kind() != Kind::Expense {
            continue;
        }
        let Some(month) = tx.month_key() else {
            // No usable date, so no month to attribute the spending to.
            continue;
        };
        for tag in tx.tags() {
            *realized
                .entry(month)
                .or_default()
                .entry(tag.as_str())
                .or_default() += tx.amount();
        }
    }

    // Target pass
    let mut progress: BTreeMap<MonthKey, BTreeMap<String, GoalProgress>> = BTreeMap::new();
    for goal in goals {
        let Some(month) = goal.month() else {
            debug!(
                "meta row {:?} has no usable month, skipping",
                goal.row_number()
            );
            continue;
        };
        if goal.tag().is_empty() {
            debug!("meta row {:?} has no tag, skipping", goal.row_number());
            continue;
        }
        let actual = realized
            .get(&month)
            .and_then(|by_tag| by_tag.get(goal.tag()))
            .copied()
            .unwrap_or_default();
        progress
            .entry(month)
            .or_default()
            .insert(goal.tag().to_string(), GoalProgress::new(goal.target(), actual));
    }
    progress
}
