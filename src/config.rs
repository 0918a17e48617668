//! Configuration file handling for caderneta.
//!
//! The configuration file is stored at `$CADERNETA_HOME/config.json` and holds the settings for
//! the caderneta application, principally the URL of the web proxy that fronts the household
//! spreadsheet.

use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

const APP_NAME: &str = "caderneta";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$CADERNETA_HOME` and from there it loads `$CADERNETA_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the data directory and an initial `config.json` pointing at `proxy_url`.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of the data directory, e.g.
    ///   `$HOME/caderneta`
    /// - `proxy_url` - The URL of the web proxy that fronts the household spreadsheet, e.g.
    ///   `https://script.google.com/macros/s/AKfycbxExample/exec`
    ///
    /// # Errors
    /// - Returns an error if `proxy_url` is not a usable http(s) URL or any file operation
    ///   fails.
    pub async fn create(dir: impl Into<PathBuf>, proxy_url: &str) -> Result<Self> {
        // Reject URLs the proxy client would choke on before anything lands on disk
        let _ = parse_proxy_url(proxy_url)?;

        // Create the directory if it does not exist
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the caderneta home directory")?;

        // Canonicalize the directory path
        let root = utils::canonicalize(&maybe_relative).await?;

        // Create and save an initial ConfigFile in the data dir
        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            proxy_url: proxy_url.to_string(),
        };
        config_file.save(&config_path).await?;

        // Return a new `Config` object that represents a data directory that is ready to use
        Ok(Self {
            root,
            config_path,
            config_file,
        })
    }

    /// This will
    /// - validate that the `caderneta_home` exists and that the config file exists
    /// - load the config file
    /// - return the loaded configuration object
    pub async fn load(caderneta_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = caderneta_home.into();
        let root = utils::canonicalize(&maybe_relative).await?;

        // Validate that the home directory exists.
        let _ = utils::read_dir(&root)
            .await
            .context("Caderneta home is missing")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        // A config written by hand can still carry a bad URL
        let _ = parse_proxy_url(&config_file.proxy_url)?;

        Ok(Self {
            root,
            config_path,
            config_file,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn proxy_url(&self) -> &str {
        &self.config_file.proxy_url
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "caderneta",
///   "config_version": 1,
///   "proxy_url": "https://script.google.com/macros/s/AKfycbxExample/exec"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "caderneta"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// URL of the web proxy that fronts the spreadsheet
    proxy_url: String,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            proxy_url: String::new(),
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        // Validate app_name
        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    #[cfg(test)]
    /// Creates a new ConfigFile with the specified settings.
    pub fn new(proxy_url: String) -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            proxy_url,
        }
    }
}

/// Parses and vets a proxy URL. Only http(s) URLs are usable by the proxy client.
fn parse_proxy_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).with_context(|| format!("Invalid proxy URL '{url}'"))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        bail!(
            "The proxy URL must use http or https, got '{}'",
            parsed.scheme()
        );
    }
    Ok(parsed)
}
