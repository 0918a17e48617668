//! The `show` command: a month dashboard of totals, expenses by tag, and meta progress.

use crate::aggregate::{month_totals, Aggregates};
use crate::api::{self, Mode};
use crate::commands::Out;
use crate::model::{Amount, MonthKey};
use crate::{Config, Result};
use anyhow::bail;
use serde::Serialize;
use std::collections::BTreeMap;

/// The dashboard for one month, along with the running totals across all months.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    /// The month the dashboard is for.
    pub month: MonthKey,
    /// Totals for the dashboard month.
    pub monthly: MonthSummary,
    /// Income across every dated registro row.
    pub income_total: Amount,
    /// Expense across every dated registro row.
    pub expense_total: Amount,
    /// Expense per primary tag across all months.
    pub expenses_by_tag: BTreeMap<String, Amount>,
    /// Progress against each meta defined for the dashboard month.
    pub goals: Vec<GoalCard>,
}

/// Income, expense and net for one month.
#[derive(Debug, Clone, Serialize)]
pub struct MonthSummary {
    /// Total Receita for the month.
    pub income: Amount,
    /// Total Despesa for the month.
    pub expense: Amount,
    /// Income minus expense.
    pub net: Amount,
}

/// Progress against one meta.
#[derive(Debug, Clone, Serialize)]
pub struct GoalCard {
    /// The tag the meta constrains.
    pub tag: String,
    /// The spending ceiling for the month.
    pub target: Amount,
    /// What was actually spent on the tag in the month. Rows carrying several tags count in
    /// full toward each of them.
    pub actual: Amount,
    /// `actual` over `target` as a percentage.
    pub percent: f64,
}

/// Builds the dashboard for `month`. When no month is given, the latest month with a dated
/// registro row is used.
///
/// # Errors
/// - Returns an error if the fetch fails, or if no month was given and no registro row carries
///   a date.
pub async fn show(config: Config, mode: Mode, month: Option<MonthKey>) -> Result<Out<Dashboard>> {
    let mut backend = api::backend(&config, mode)?;
    let snapshot = api::fetch_snapshot(backend.as_mut()).await?;
    let aggregates = Aggregates::from_snapshot(&snapshot);

    // Prefer the latest month with a dated registro row; a sheet with metas but no dated
    // spending yet still gets a dashboard.
    let latest = snapshot
        .transactions()
        .iter()
        .filter_map(|t| t.month_key())
        .max()
        .or_else(|| aggregates.latest_month());
    let month = match month.or(latest) {
        Some(month) => month,
        None => bail!(
            "There is no dated activity to show yet. Add a registro row with a date first, or \
             pass --month explicitly."
        ),
    };

    let monthly_totals = month_totals(snapshot.transactions(), month);
    let monthly = MonthSummary {
        income: monthly_totals.income(),
        expense: monthly_totals.expense(),
        net: monthly_totals.net(),
    };

    let goals = match aggregates.goal_progress().get(&month) {
        Some(progress) => progress
            .iter()
            .map(|(tag, p)| GoalCard {
                tag: tag.clone(),
                target: p.target(),
                actual: p.actual(),
                percent: p.percent(),
            })
            .collect(),
        None => Vec::new(),
    };

    let totals = aggregates.totals();
    let dashboard = Dashboard {
        month,
        monthly,
        income_total: totals.income(),
        expense_total: totals.expense(),
        expenses_by_tag: totals.expenses_by_tag().clone(),
        goals,
    };

    Ok(Out::new(render(&dashboard), dashboard))
}

/// Formats the dashboard as the text block the CLI prints.
fn render(dashboard: &Dashboard) -> String {
    let mut lines = vec![
        format!("Dashboard for {}", dashboard.month),
        String::new(),
        format!("  Receitas: {}", dashboard.monthly.income),
        format!("  Despesas: {}", dashboard.monthly.expense),
        format!("  Saldo:    {}", dashboard.monthly.net),
        String::new(),
        "Totals across all months".to_string(),
        format!("  Receitas: {}", dashboard.income_total),
        format!("  Despesas: {}", dashboard.expense_total),
    ];

    if !dashboard.expenses_by_tag.is_empty() {
        lines.push(String::new());
        lines.push("Expenses by tag, all months".to_string());
        for (tag, amount) in &dashboard.expenses_by_tag {
            lines.push(format!("  {tag}: {amount}"));
        }
    }

    if !dashboard.goals.is_empty() {
        lines.push(String::new());
        lines.push(format!("Metas for {}", dashboard.month));
        for goal in &dashboard.goals {
            lines.push(format!(
                "  {}: {} of {} ({:.0}%)",
                goal.tag, goal.actual, goal.target, goal.percent
            ));
        }
    }

    lines.join("\n")
}
