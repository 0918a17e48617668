//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::api::{TestBackend, TestState};
use crate::Config;
use tempfile::TempDir;
use uuid::Uuid;

/// Test environment that sets up a caderneta home directory with a Config whose proxy URL is
/// unique, so each test gets its own in-memory sheet.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a test environment with a Config pointing at a unique fake proxy.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("caderneta");

        let rand = Uuid::new_v4().to_string().replace('-', "");
        let proxy_url = format!("https://{rand}.budget-proxy.example.com/exec");
        let config = Config::create(&root, &proxy_url).await.unwrap();

        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    /// Gets the current state of the in-memory sheet associated with this environment.
    pub fn get_state(&self) -> TestState {
        let backend = TestBackend::new(self.config.proxy_url());
        backend.state()
    }

    /// Sets the state of the in-memory sheet associated with this environment.
    pub fn set_state(&self, state: TestState) {
        let backend = TestBackend::new(self.config.proxy_url());
        backend.set_state(state)
    }
}
