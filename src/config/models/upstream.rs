//! Upstream API configuration

use serde::{Deserialize, Serialize};

/// Upstream API target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the upstream API, no trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// API key injected into upstream calls as `X-Api-Key`
    #[serde(default)]
    pub api_key: Option<String>,
    /// Forwarding timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl UpstreamConfig {
    /// Validate upstream configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("Upstream base URL cannot be empty".to_string());
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(format!("Invalid upstream base URL: {}", self.base_url));
        }
        if self.timeout_secs == 0 {
            return Err("Upstream timeout must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}
