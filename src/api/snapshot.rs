//! Turns fetched rows into the canonical [`Snapshot`] and provides the row-level writes the
//! commands use. Every function here takes the backend as a trait object so the commands run
//! the same against the proxy and the in-memory test backend.

use crate::api::{Backend, Tab};
use crate::model::{
    Goal, GoalColumn, Snapshot, Tag, TagColumn, Transaction, TransactionColumn,
};
use crate::Result;
use anyhow::bail;
use serde_json::Value;
use tracing::debug;

/// Fetches all three tabs and normalizes them into a [`Snapshot`]. Registro rows without a
/// usable `Tipo` are dropped; metas and organizadores rows are kept no matter how ragged.
pub(crate) async fn fetch_snapshot(backend: &mut (dyn Backend + Send)) -> Result<Snapshot> {
    let raw = backend.fetch().await?;
    let transactions: Vec<Transaction> = raw
        .registro
        .iter()
        .filter_map(Transaction::from_raw)
        .collect();
    debug!(
        "Loaded {} of {} registro row(s), {} meta(s), {} organizador(es)",
        transactions.len(),
        raw.registro.len(),
        raw.metas.len(),
        raw.organizadores.len()
    );
    let goals = raw.metas.iter().map(Goal::from_raw).collect();
    let tags = raw.organizadores.iter().map(Tag::from_raw).collect();
    Ok(Snapshot::new(transactions, goals, tags))
}

/// Appends a registro row.
pub(crate) async fn add_transaction(
    backend: &mut (dyn Backend + Send),
    transaction: &Transaction,
) -> Result<()> {
    backend.append(Tab::Registro, transaction.to_raw()).await
}

/// Writes one cell of a registro row.
pub(crate) async fn update_transaction_field(
    backend: &mut (dyn Backend + Send),
    row_number: u64,
    column: TransactionColumn,
    value: Value,
) -> Result<()> {
    if matches!(column, TransactionColumn::RowNumber) {
        bail!("ROW_NUMBER comes from the sheet position and cannot be written");
    }
    backend
        .update(Tab::Registro, row_number, column.as_header_str(), value)
        .await
}

/// Appends a meta row.
pub(crate) async fn add_goal(backend: &mut (dyn Backend + Send), goal: &Goal) -> Result<()> {
    backend.append(Tab::Meta, goal.to_raw()).await
}

/// Writes one cell of a meta row.
pub(crate) async fn update_goal_field(
    backend: &mut (dyn Backend + Send),
    row_number: u64,
    column: GoalColumn,
    value: Value,
) -> Result<()> {
    if matches!(column, GoalColumn::RowNumber) {
        bail!("ROW_NUMBER comes from the sheet position and cannot be written");
    }
    backend
        .update(Tab::Meta, row_number, column.as_header_str(), value)
        .await
}

/// Deletes a meta row. Rows below it shift up, so callers must re-fetch before using any
/// previously observed row number.
pub(crate) async fn delete_goal(backend: &mut (dyn Backend + Send), row_number: u64) -> Result<()> {
    backend.delete(Tab::Meta, row_number).await
}

/// Appends an organizador row.
pub(crate) async fn add_tag(backend: &mut (dyn Backend + Send), tag: &Tag) -> Result<()> {
    backend.append(Tab::Organizador, tag.to_raw()).await
}

/// Writes one cell of an organizador row.
pub(crate) async fn update_tag_field(
    backend: &mut (dyn Backend + Send),
    row_number: u64,
    column: TagColumn,
    value: Value,
) -> Result<()> {
    if matches!(column, TagColumn::RowNumber) {
        bail!("ROW_NUMBER comes from the sheet position and cannot be written");
    }
    backend
        .update(Tab::Organizador, row_number, column.as_header_str(), value)
        .await
}

/// Deletes an organizador row.
pub(crate) async fn delete_tag(backend: &mut (dyn Backend + Send), row_number: u64) -> Result<()> {
    backend.delete(Tab::Organizador, row_number).await
}
