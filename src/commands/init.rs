use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory and:
/// - Validates that `proxy_url` is a usable http(s) URL
/// - Creates an initial `config.json` file pointing at `proxy_url`
///
/// # Arguments
/// - `home` - The directory that will be the root of the data directory, e.g. `$HOME/caderneta`
/// - `proxy_url` - The URL of the web proxy deployment that fronts the budget spreadsheet, e.g.
///   https://script.google.com/macros/s/AKfycbxExample/exec
///
/// # Errors
/// - Returns an error if the URL is unusable or any file operation fails.
pub async fn init(home: &Path, proxy_url: &str) -> Result<Out<()>> {
    let config = Config::create(home, proxy_url)
        .await
        .context("Unable to create the caderneta directory and config")?;
    Ok(format!(
        "Successfully created the caderneta directory at '{}'",
        config.root().display()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_creates_the_config() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("caderneta");
        let proxy_url = "https://script.google.com/macros/s/AKfycbxExample/exec";

        let out = init(&home, proxy_url).await.unwrap();
        let contains = "Successfully created the caderneta directory";
        assert!(
            out.message().contains(contains),
            "Expected message to contain '{contains}', but message was {}",
            out.message()
        );

        let config = Config::load(&home).await.unwrap();
        assert_eq!(proxy_url, config.proxy_url());
    }

    #[tokio::test]
    async fn test_init_rejects_a_bad_url() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("caderneta");

        let result = init(&home, "not a url").await;
        assert!(result.is_err());
    }
}
