//! The seam between the app and the spreadsheet proxy.
//!
//! Everything the commands need from the proxy goes through the `Backend` trait: one atomic
//! fetch of all three tabs and row-level appends, single-cell updates and deletes. There is an
//! HTTP implementation and an in-memory one, selected by `Mode`.

mod proxy;
mod snapshot;
mod test_client;

use crate::model::RawRow;
use crate::{Config, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub(crate) use snapshot::{
    add_goal, add_tag, add_transaction, delete_goal, delete_tag, fetch_snapshot, update_goal_field,
    update_tag_field, update_transaction_field,
};
pub(crate) use test_client::TestBackend;
#[cfg(test)]
pub(crate) use test_client::TestState;

/// The environment variable that switches the app onto the in-memory backend.
const TEST_MODE_ENV: &str = "CADERNETA_IN_TEST_MODE";

/// Selects which `Backend` implementation the commands use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Talk to the configured web proxy over HTTP.
    Proxy,
    /// Use the in-memory backend seeded with fixture rows.
    Test,
}

impl Mode {
    /// Returns `Mode::Test` when `CADERNETA_IN_TEST_MODE` is set and non-empty, otherwise
    /// `Mode::Proxy`.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Proxy,
        }
    }
}

/// Identifies one of the three sheet tabs behind the proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tab {
    Registro,
    Meta,
    Organizador,
}

impl Tab {
    /// The noun the proxy uses in its endpoint paths, e.g. `api/add-meta`.
    pub(crate) fn slug(&self) -> &'static str {
        match self {
            Tab::Registro => "registro",
            Tab::Meta => "meta",
            Tab::Organizador => "organizador",
        }
    }

    /// The proxy exposes no delete endpoint for registro rows.
    pub(crate) fn deletable(&self) -> bool {
        !matches!(self, Tab::Registro)
    }
}

/// The three collections exactly as one fetch returns them: rows keyed by sheet headers, each
/// fetched row carrying a `ROW_NUMBER`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct RawData {
    #[serde(default)]
    pub(crate) registro: Vec<RawRow>,
    #[serde(default)]
    pub(crate) metas: Vec<RawRow>,
    #[serde(default)]
    pub(crate) organizadores: Vec<RawRow>,
}

/// The row-level operations the app needs from the proxy. `ProxyClient` implements them over
/// HTTP; `TestBackend` implements them in memory.
#[async_trait::async_trait]
pub(crate) trait Backend {
    /// Fetches all three tabs in one atomic read.
    async fn fetch(&mut self) -> Result<RawData>;

    /// Appends one row to `tab`. Keys are sheet headers; `ROW_NUMBER` is assigned by the sheet
    /// and must not be sent.
    async fn append(&mut self, tab: Tab, row: RawRow) -> Result<()>;

    /// Writes a single cell: the `column` of the row at `row_number`.
    async fn update(&mut self, tab: Tab, row_number: u64, column: &str, value: Value)
        -> Result<()>;

    /// Removes the row at `row_number`. Rows below it shift up, so any held row numbers are
    /// stale until the next fetch. Not available for `Tab::Registro`.
    async fn delete(&mut self, tab: Tab, row_number: u64) -> Result<()>;
}

/// Creates the `Backend` for `mode`.
pub(crate) fn backend(config: &Config, mode: Mode) -> Result<Box<dyn Backend + Send>> {
    match mode {
        Mode::Proxy => Ok(Box::new(proxy::ProxyClient::new(config)?)),
        Mode::Test => Ok(Box::new(TestBackend::new(config.proxy_url()))),
    }
}
