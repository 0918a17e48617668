//! The `list` command: the raw rows of one sheet tab, with their row numbers.
//!
//! The row numbers printed here are what `update` and `delete` take as `--row`.

use crate::api::{self, Mode};
use crate::args::ListEntity;
use crate::commands::Out;
use crate::model::{Goal, Snapshot, Transaction};
use crate::{Config, Result};
use serde::Serialize;

/// The rows of one tab.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Listing {
    Registros(Vec<Transaction>),
    Metas(Vec<Goal>),
    Tags(Vec<TagRow>),
}

/// One organizador row, with the default color filled in where the sheet left it blank.
#[derive(Debug, Clone, Serialize)]
pub struct TagRow {
    pub name: String,
    pub color: String,
    pub kind: String,
    pub row_number: Option<u64>,
}

/// Lists the rows of the tab named by `entity`, in sheet order.
pub async fn list(config: Config, mode: Mode, entity: ListEntity) -> Result<Out<Listing>> {
    let mut backend = api::backend(&config, mode)?;
    let snapshot = api::fetch_snapshot(backend.as_mut()).await?;
    let out = match entity {
        ListEntity::Registros => registros(&snapshot),
        ListEntity::Metas => metas(&snapshot),
        ListEntity::Tags => tags(&snapshot),
    };
    Ok(out)
}

fn registros(snapshot: &Snapshot) -> Out<Listing> {
    let rows = snapshot.transactions().to_vec();
    let mut lines = vec![format!("{} registro row(s)", rows.len())];
    for tx in &rows {
        let date = match tx.date() {
            Some(date) => date.format("%d/%m/%Y").to_string(),
            None => "??/??/????".to_string(),
        };
        let mut line = format!(
            "  [{}] {date}  {}  {}  {}",
            row_label(tx.row_number()),
            tx.kind(),
            tx.amount(),
            tx.description()
        );
        if !tx.tags().is_empty() {
            line.push_str(&format!("  ({})", tx.tags().join(", ")));
        }
        lines.push(line);
    }
    Out::new(lines.join("\n"), Listing::Registros(rows))
}

fn metas(snapshot: &Snapshot) -> Out<Listing> {
    let rows = snapshot.goals().to_vec();
    let mut lines = vec![format!("{} meta row(s)", rows.len())];
    for goal in &rows {
        let month = match goal.month() {
            Some(month) => month.to_string(),
            None => "??/????".to_string(),
        };
        lines.push(format!(
            "  [{}] {month}  {}  {}",
            row_label(goal.row_number()),
            goal.tag(),
            goal.target()
        ));
    }
    Out::new(lines.join("\n"), Listing::Metas(rows))
}

fn tags(snapshot: &Snapshot) -> Out<Listing> {
    let mut rows: Vec<TagRow> = snapshot
        .tags()
        .iter()
        .map(|tag| TagRow {
            name: tag.name().to_string(),
            color: tag.color_or_default().to_string(),
            kind: tag.kind().to_string(),
            row_number: tag.row_number(),
        })
        .collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name));

    let mut lines = vec![format!("{} organizador row(s)", rows.len())];
    for tag in &rows {
        lines.push(format!(
            "  [{}] {}  {}  {}",
            row_label(tag.row_number),
            tag.name,
            tag.color,
            tag.kind
        ));
    }
    Out::new(lines.join("\n"), Listing::Tags(rows))
}

fn row_label(row_number: Option<u64>) -> String {
    match row_number {
        Some(n) => n.to_string(),
        None => "-".to_string(),
    }
}
