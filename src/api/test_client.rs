//! Implements the `Backend` trait using in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the
//! whole app, top-to-bottom, without a proxy deployment.

use crate::api::{Backend, RawData, Tab};
use crate::model::{RawRow, ROW_NUMBER_KEY};
use crate::Result;
use anyhow::{bail, Context};
use serde_json::Value;
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Mutex, MutexGuard, OnceLock};

/// Sheet rows start at 2 because row 1 holds the headers.
const FIRST_DATA_ROW: u64 = 2;

/// The rows held for one simulated deployment. Rows are stored without `ROW_NUMBER`; positions
/// are stamped at fetch time the way the real sheet reports them, so a delete renumbers
/// everything below it.
#[derive(Debug, Clone, Default)]
pub(crate) struct TestState {
    pub(crate) registro: Vec<RawRow>,
    pub(crate) metas: Vec<RawRow>,
    pub(crate) organizadores: Vec<RawRow>,
}

impl TestState {
    fn rows_mut(&mut self, tab: Tab) -> &mut Vec<RawRow> {
        match tab {
            Tab::Registro => &mut self.registro,
            Tab::Meta => &mut self.metas,
            Tab::Organizador => &mut self.organizadores,
        }
    }
}

/// An implementation of the `Backend` trait that does not use the web proxy. State lives in a
/// process-wide registry keyed by proxy URL so that a command under test and the test's own
/// assertions observe the same rows.
pub(crate) struct TestBackend {
    key: String,
}

impl TestBackend {
    /// Creates a backend for `key`, seeding the registry with the fixture rows below on the
    /// first use of that key.
    pub(crate) fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        lock_registry().entry(key.clone()).or_insert_with(seed_state);
        Self { key }
    }

    /// Returns a copy of the rows currently held for this backend's key.
    #[cfg(test)]
    pub(crate) fn state(&self) -> TestState {
        lock_registry().get(&self.key).cloned().unwrap_or_default()
    }

    /// Replaces the rows held for this backend's key.
    #[cfg(test)]
    pub(crate) fn set_state(&self, state: TestState) {
        lock_registry().insert(self.key.clone(), state);
    }
}

#[async_trait::async_trait]
impl Backend for TestBackend {
    async fn fetch(&mut self) -> Result<RawData> {
        let registry = lock_registry();
        let state = registry.get(&self.key).cloned().unwrap_or_default();
        drop(registry);
        Ok(RawData {
            registro: numbered(&state.registro),
            metas: numbered(&state.metas),
            organizadores: numbered(&state.organizadores),
        })
    }

    async fn append(&mut self, tab: Tab, row: RawRow) -> Result<()> {
        let mut registry = lock_registry();
        let state = registry.entry(self.key.clone()).or_default();
        state.rows_mut(tab).push(row);
        Ok(())
    }

    async fn update(
        &mut self,
        tab: Tab,
        row_number: u64,
        column: &str,
        value: Value,
    ) -> Result<()> {
        let mut registry = lock_registry();
        let state = registry.entry(self.key.clone()).or_default();
        let rows = state.rows_mut(tab);
        let index = index_of(row_number, rows.len(), tab)?;
        rows[index].insert(column.to_string(), value);
        Ok(())
    }

    async fn delete(&mut self, tab: Tab, row_number: u64) -> Result<()> {
        if !tab.deletable() {
            bail!("The proxy does not support deleting {} rows", tab.slug());
        }
        let mut registry = lock_registry();
        let state = registry.entry(self.key.clone()).or_default();
        let rows = state.rows_mut(tab);
        let index = index_of(row_number, rows.len(), tab)?;
        rows.remove(index);
        Ok(())
    }
}

fn lock_registry() -> MutexGuard<'static, HashMap<String, TestState>> {
    static REGISTRY: OnceLock<Mutex<HashMap<String, TestState>>> = OnceLock::new();
    match REGISTRY.get_or_init(|| Mutex::new(HashMap::new())).lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Maps a sheet row number onto a store index, erroring the way the proxy does for a row that
/// is not there.
fn index_of(row_number: u64, len: usize, tab: Tab) -> Result<usize> {
    let index = row_number
        .checked_sub(FIRST_DATA_ROW)
        .with_context(|| format!("Row {row_number} is before the first data row"))?
        as usize;
    if index >= len {
        bail!("Row {row_number} does not exist in the {} sheet", tab.slug());
    }
    Ok(index)
}

/// Clones `rows`, stamping each with the `ROW_NUMBER` its sheet position implies.
fn numbered(rows: &[RawRow]) -> Vec<RawRow> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            let mut row = row.clone();
            row.insert(
                ROW_NUMBER_KEY.to_string(),
                Value::from(FIRST_DATA_ROW + index as u64),
            );
            row
        })
        .collect()
}

/// Provides the seed rows parsed from the CSV fixtures in this module.
fn seed_state() -> TestState {
    TestState {
        registro: load_csv(REGISTRO_DATA).unwrap(),
        metas: load_csv(METAS_DATA).unwrap(),
        organizadores: load_csv(ORGANIZADORES_DATA).unwrap(),
    }
}

/// Loads rows from a CSV-formatted string. The first record carries the headers.
fn load_csv(csv_data: &str) -> Result<Vec<RawRow>> {
    let bytes = csv_data.as_bytes();
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(Cursor::new(bytes));

    let mut records = rdr.records();
    let headers: Vec<String> = match records.next() {
        Some(record) => record?.iter().map(|field| field.to_string()).collect(),
        None => return Ok(Vec::new()),
    };

    let mut rows = Vec::new();
    for result in records {
        let record = result?;
        let mut row = RawRow::new();
        for (header, field) in headers.iter().zip(record.iter()) {
            row.insert(header.clone(), cell_value(field));
        }
        rows.push(row);
    }
    Ok(rows)
}

/// The sheet hands back typed cells, so fixture cells that look numeric become JSON numbers.
fn cell_value(field: &str) -> Value {
    if !field.is_empty() {
        if let Ok(number) = field.parse::<f64>() {
            if let Some(n) = serde_json::Number::from_f64(number) {
                return Value::Number(n);
            }
        }
    }
    Value::String(field.to_string())
}

/// Seed registro rows.
const REGISTRO_DATA: &str = r##"Data,Descricao,Valor,Tipo,Tag_1,Tag_2,Tag_3,Tag_4
2025-11-03,Supermercado Zona Sul,412.37,Despesa,Mercado,,,
2025-11-05,Salario,8500,Receita,Salario,,,
2025-11-08,Padaria Imperial,38.9,Despesa,Mercado,Padaria,,
2025-11-12,Conta de luz,187.44,Despesa,Casa,,,
2025-11-15,Uber centro,24.9,Despesa,Transporte,,,
2025-11-21,Farmacia,96.3,Despesa,Saude,,,
2025-12-01,Supermercado Guanabara,150,Despesa,Mercado,,,
2025-12-02,Salario,8500,Receita,Salario,,,
2025-12-04,Gasolina,220,Despesa,Transporte,Carro,,
2025-12-06,Restaurante Bar do Omar,132.5,Despesa,Lazer,,,
"##;

/// Seed metas rows.
const METAS_DATA: &str = r##"Mes,Tag,Meta
11/25,Mercado,600
11/25,Transporte,300
12/25,Mercado,500
12/25,Lazer,400
"##;

/// Seed organizadores rows.
const ORGANIZADORES_DATA: &str = r##"Tag,Cor,Tipo
Mercado,#e8743b,Despesa
Transporte,#19a979,Despesa
Casa,#945ecf,Despesa
Saude,#13a4b4,Despesa
Lazer,#6c8893,Despesa
Salario,#2f6497,Receita
Padaria,,Despesa
Carro,#ed4a7b,Despesa
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_seed_data_loads() {
        let mut backend = TestBackend::new("test-client-seed");
        let raw = backend.fetch().await.unwrap();
        assert_eq!(10, raw.registro.len());
        assert_eq!(4, raw.metas.len());
        assert_eq!(8, raw.organizadores.len());

        let first = &raw.registro[0];
        assert_eq!(Some(&json!(2)), first.get(ROW_NUMBER_KEY));
        assert_eq!(Some(&json!("Supermercado Zona Sul")), first.get("Descricao"));
        assert_eq!(Some(&json!(412.37)), first.get("Valor"));
        assert_eq!(Some(&json!("")), first.get("Tag_2"));

        let last = &raw.registro[9];
        assert_eq!(Some(&json!(11)), last.get(ROW_NUMBER_KEY));
    }

    #[tokio::test]
    async fn test_append_lands_at_the_bottom() {
        let mut backend = TestBackend::new("test-client-append");
        let mut row = RawRow::new();
        row.insert("Mes".to_string(), json!("01/26"));
        row.insert("Tag".to_string(), json!("Ferias"));
        row.insert("Meta".to_string(), json!(2000.0));
        backend.append(Tab::Meta, row).await.unwrap();

        let raw = backend.fetch().await.unwrap();
        assert_eq!(5, raw.metas.len());
        let added = &raw.metas[4];
        assert_eq!(Some(&json!(6)), added.get(ROW_NUMBER_KEY));
        assert_eq!(Some(&json!("Ferias")), added.get("Tag"));
    }

    #[tokio::test]
    async fn test_update_changes_one_cell() {
        let mut backend = TestBackend::new("test-client-update");
        backend
            .update(Tab::Meta, 2, "Meta", json!(750.0))
            .await
            .unwrap();

        let raw = backend.fetch().await.unwrap();
        assert_eq!(Some(&json!(750.0)), raw.metas[0].get("Meta"));
        // The neighboring cells are untouched.
        assert_eq!(Some(&json!("Mercado")), raw.metas[0].get("Tag"));
        assert_eq!(Some(&json!(300.0)), raw.metas[1].get("Meta"));
    }

    #[tokio::test]
    async fn test_update_missing_row_errors() {
        let mut backend = TestBackend::new("test-client-update-missing");
        assert!(backend
            .update(Tab::Meta, 99, "Meta", json!(1.0))
            .await
            .is_err());
        assert!(backend
            .update(Tab::Meta, 1, "Meta", json!(1.0))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_delete_renumbers_rows_below() {
        let mut backend = TestBackend::new("test-client-delete");
        backend.delete(Tab::Meta, 2).await.unwrap();

        let raw = backend.fetch().await.unwrap();
        assert_eq!(3, raw.metas.len());
        let first = &raw.metas[0];
        assert_eq!(Some(&json!(2)), first.get(ROW_NUMBER_KEY));
        assert_eq!(Some(&json!("Transporte")), first.get("Tag"));
    }

    #[tokio::test]
    async fn test_delete_registro_rejected() {
        let mut backend = TestBackend::new("test-client-delete-registro");
        let result = backend.delete(Tab::Registro, 2).await;
        assert!(result.is_err());
        let raw = backend.fetch().await.unwrap();
        assert_eq!(10, raw.registro.len());
    }

    #[tokio::test]
    async fn test_keys_are_isolated() {
        let mut left = TestBackend::new("test-client-isolated-left");
        let mut right = TestBackend::new("test-client-isolated-right");
        left.delete(Tab::Organizador, 2).await.unwrap();

        assert_eq!(7, left.fetch().await.unwrap().organizadores.len());
        assert_eq!(8, right.fetch().await.unwrap().organizadores.len());
    }

    #[tokio::test]
    async fn test_set_state_replaces_rows() {
        let mut backend = TestBackend::new("test-client-set-state");
        backend.set_state(TestState::default());
        let raw = backend.fetch().await.unwrap();
        assert!(raw.registro.is_empty());
        assert!(raw.metas.is_empty());
        assert!(raw.organizadores.is_empty());
    }

    #[test]
    fn test_cell_value_types() {
        assert_eq!(json!(412.37), cell_value("412.37"));
        assert_eq!(json!(8500.0), cell_value("8500"));
        assert_eq!(json!("11/25"), cell_value("11/25"));
        assert_eq!(json!("2025-11-03"), cell_value("2025-11-03"));
        assert_eq!(json!("#e8743b"), cell_value("#e8743b"));
        assert_eq!(json!(""), cell_value(""));
    }
}
