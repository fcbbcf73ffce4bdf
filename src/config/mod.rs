//! Configuration management for the gateway
//!
//! This module handles loading and validation of all gateway configuration.
//! Configuration comes from an optional YAML file with environment-variable
//! overrides applied on top, so a containerized deployment can run on
//! environment alone.

pub mod models;

pub use models::*;

use crate::utils::error::{GatewayError, Result};
use std::env;
use std::path::Path;
use tracing::{debug, info};

/// Main configuration struct for the gateway
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Gateway configuration
    pub gateway: GatewayConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| GatewayError::Config(format!("Failed to read config file: {}", e)))?;

        let gateway: GatewayConfig = serde_yaml::from_str(&content)
            .map_err(|e| GatewayError::Config(format!("Failed to parse config: {}", e)))?;

        let config = Self { gateway };
        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load configuration: file if present, defaults otherwise, environment
    /// overrides on top of either.
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = if path.as_ref().exists() {
            Self::from_file(&path).await?
        } else {
            info!(
                "Config file {:?} not found, using defaults",
                path.as_ref()
            );
            Self::default()
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Apply recognized environment variables over the current values.
    pub fn apply_env(&mut self) {
        let gw = &mut self.gateway;

        if let Ok(host) = env::var("GATEWAY_HOST") {
            gw.server.host = host;
        }
        if let Some(port) = parse_env("GATEWAY_PORT") {
            gw.server.port = port;
        }
        if let Some(workers) = parse_env("GATEWAY_WORKERS") {
            gw.server.workers = Some(workers);
        }

        if let Ok(url) = env::var("UPSTREAM_BASE_URL") {
            gw.upstream.base_url = url;
        }
        if let Ok(key) = env::var("UPSTREAM_API_KEY") {
            gw.upstream.api_key = Some(key);
        }
        if let Some(timeout) = parse_env("UPSTREAM_TIMEOUT_SECS") {
            gw.upstream.timeout_secs = timeout;
        }

        if let Ok(secret) = env::var("CAPTCHA_SECRET") {
            if !secret.is_empty() {
                gw.captcha.secret = Some(secret);
            }
        }
        if let Ok(url) = env::var("CAPTCHA_VERIFY_URL") {
            gw.captcha.verify_url = url;
        }

        if let Ok(secret) = env::var("SIGNING_SECRET") {
            if !secret.is_empty() {
                gw.signing.secret = Some(secret);
            }
        }
    }

    /// Get server configuration
    pub fn server(&self) -> &ServerConfig {
        &self.gateway.server
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.gateway
            .server
            .validate()
            .map_err(|e| GatewayError::Config(format!("Server config error: {}", e)))?;
        self.gateway
            .rate_limit
            .validate()
            .map_err(|e| GatewayError::Config(format!("Rate limit config error: {}", e)))?;
        self.gateway
            .pow
            .validate()
            .map_err(|e| GatewayError::Config(format!("PoW config error: {}", e)))?;
        self.gateway
            .captcha
            .validate()
            .map_err(|e| GatewayError::Config(format!("CAPTCHA config error: {}", e)))?;
        self.gateway
            .upstream
            .validate()
            .map_err(|e| GatewayError::Config(format!("Upstream config error: {}", e)))?;
        self.gateway
            .signing
            .validate()
            .map_err(|e| GatewayError::Config(format!("Signing config error: {}", e)))?;

        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server().port, 3000);
    }

    #[tokio::test]
    async fn test_from_file_parses_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "server:\n  port: 4000\nrate_limit:\n  ip_per_minute: 120\nupstream:\n  base_url: \"https://api.example.test\""
        )
        .unwrap();

        let config = Config::from_file(file.path()).await.unwrap();
        assert_eq!(config.gateway.server.port, 4000);
        assert_eq!(config.gateway.rate_limit.ip_per_minute, 120);
        assert_eq!(config.gateway.upstream.base_url, "https://api.example.test");
        // Untouched sections keep their defaults.
        assert_eq!(config.gateway.pow.difficulty, 3);
    }

    #[tokio::test]
    async fn test_from_file_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server:\n  port: 0").unwrap();

        assert!(Config::from_file(file.path()).await.is_err());
    }

    #[tokio::test]
    async fn test_load_falls_back_to_defaults() {
        let config = Config::load("/nonexistent/gateway.yaml").await.unwrap();
        assert_eq!(config.gateway.server.port, 3000);
    }
}
