//! Implements the `Backend` trait using `reqwest` to talk to the web proxy over HTTP.

use crate::api::{Backend, RawData, Tab};
use crate::model::RawRow;
use crate::{Config, Result};
use anyhow::{bail, Context};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::trace;
use url::Url;

/// Implements the `Backend` trait against the configured proxy deployment. The proxy is
/// stateless, so one client per command invocation is enough and there is no session to keep
/// alive between calls.
pub(super) struct ProxyClient {
    base_url: Url,
    client: reqwest::Client,
}

impl ProxyClient {
    pub(super) fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            base_url: base_url(config.proxy_url())?,
            client: reqwest::Client::new(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("Unable to build the '{path}' endpoint URL"))
    }

    /// Posts `body` to `path`, checking both the HTTP status and the `{ success, error }`
    /// envelope every write endpoint returns.
    async fn post(&self, path: &str, body: &Value) -> Result<()> {
        trace!("post to {path}");
        let url = self.endpoint(path)?;
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to send the '{path}' request to the proxy"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            bail!("The proxy returned status {status} for '{path}': {body}");
        }

        let envelope: Envelope = response
            .json()
            .await
            .with_context(|| format!("Failed to parse the proxy response for '{path}'"))?;
        if !envelope.success {
            bail!(
                "The proxy rejected the '{path}' request: {}",
                envelope
                    .error
                    .unwrap_or_else(|| "no error message".to_string())
            );
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Backend for ProxyClient {
    async fn fetch(&mut self) -> Result<RawData> {
        trace!("fetch");
        let url = self.endpoint("api/data")?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to fetch data from the proxy")?;
        let status = response.status();
        if !status.is_success() {
            bail!("The proxy returned status {status} for the data fetch");
        }
        let payload: FetchPayload = response
            .json()
            .await
            .context("Failed to parse the fetched data")?;
        if let Some(error) = payload.error {
            bail!("The proxy reported an error during fetch: {error}");
        }
        Ok(RawData {
            registro: payload.registro,
            metas: payload.metas,
            organizadores: payload.organizadores,
        })
    }

    async fn append(&mut self, tab: Tab, row: RawRow) -> Result<()> {
        self.post(&format!("api/add-{}", tab.slug()), &Value::Object(row))
            .await
    }

    async fn update(
        &mut self,
        tab: Tab,
        row_number: u64,
        column: &str,
        value: Value,
    ) -> Result<()> {
        let body = json!({
            "rowNumber": row_number,
            "column": column,
            "value": value,
        });
        self.post(&format!("api/update-{}", tab.slug()), &body)
            .await
    }

    async fn delete(&mut self, tab: Tab, row_number: u64) -> Result<()> {
        if !tab.deletable() {
            bail!("The proxy does not support deleting {} rows", tab.slug());
        }
        let body = json!({ "rowNumber": row_number });
        self.post(&format!("api/delete-{}", tab.slug()), &body)
            .await
    }
}

/// Parses the proxy URL and guarantees a trailing slash, without which joining endpoint paths
/// would drop the last path segment of a sub-path deployment.
fn base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw).with_context(|| format!("Invalid proxy URL '{raw}'"))?;
    if !url.path().ends_with('/') {
        url.set_path(&format!("{}/", url.path()));
    }
    Ok(url)
}

/// What the data fetch returns. A failure the proxy handled arrives as a 200 carrying an
/// `error` string instead of an HTTP error status.
#[derive(Debug, Deserialize)]
struct FetchPayload {
    #[serde(default)]
    registro: Vec<RawRow>,
    #[serde(default)]
    metas: Vec<RawRow>,
    #[serde(default)]
    organizadores: Vec<RawRow>,
    #[serde(default)]
    error: Option<String>,
}

/// The `{ success, error }` envelope every write endpoint returns.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
}
