//! Server startup with automatic configuration loading

use crate::config::Config;
use crate::server::server::HttpServer;
use crate::utils::error::Result;
use std::env;
use tracing::info;

/// Default config file location, overridable via `GATEWAY_CONFIG`.
const DEFAULT_CONFIG_PATH: &str = "config/gateway.yaml";

/// Run the server with automatic configuration loading.
///
/// Loads the YAML config when present, falls back to defaults otherwise,
/// and applies environment overrides in both cases.
pub async fn run_server() -> Result<()> {
    let config_path =
        env::var("GATEWAY_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    let config = Config::load(&config_path).await?;

    info!(
        "Upstream target: {}",
        config.gateway.upstream.base_url
    );
    info!(
        "CAPTCHA validation: {}",
        if config.gateway.captcha.secret.is_some() {
            "strict"
        } else {
            "fail-open (no secret configured)"
        }
    );
    info!(
        "Envelope signing: {}",
        if config.gateway.signing.secret.is_some() {
            "enforced"
        } else {
            "disabled (no secret configured)"
        }
    );

    let server = HttpServer::new(&config)?;
    info!(
        "Endpoints: GET /health, GET /api/pow-challenge, POST /api/proxy"
    );

    server.start().await
}
