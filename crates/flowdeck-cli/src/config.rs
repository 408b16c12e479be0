//! CLI configuration.

use std::time::Duration;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the backend REST API.
    pub server_url: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8080/api".to_string(),
            timeout_secs: 30,
        }
    }
}
