//! Upstream HTTP forwarder

use crate::config::UpstreamConfig;
use crate::core::routing::{ActionRoute, build_query, resolve_path};
use crate::utils::error::{GatewayError, Result};
use actix_web::http::{Method, StatusCode};
use bytes::Bytes;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, info};

/// Upstream response captured for verbatim relay
#[derive(Debug)]
pub struct UpstreamResponse {
    /// Upstream status code, relayed unchanged
    pub status: StatusCode,
    /// Upstream content type, `application/json` when absent
    pub content_type: String,
    /// Raw response body
    pub body: Bytes,
}

/// Forwards resolved calls to the upstream API
pub struct UpstreamForwarder {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl UpstreamForwarder {
    /// Build a forwarder with its own HTTP client and bounded timeout.
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                GatewayError::Config(format!("Failed to build upstream client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// Resolve the target URL and forward the call.
    ///
    /// Path placeholders consume their parameters; leftovers become a query
    /// string for GET/DELETE and a JSON body for POST/PUT. The caller's
    /// `Authorization` header is preserved and a configured API key is
    /// injected. A timed-out call is reported distinctly from other
    /// transport failures.
    pub async fn forward(
        &self,
        route: &ActionRoute,
        mut params: Map<String, Value>,
        authorization: Option<&str>,
    ) -> Result<UpstreamResponse> {
        let path = resolve_path(&route.path, &mut params);

        let url = if route.method == Method::GET || route.method == Method::DELETE {
            format!("{}{}{}", self.base_url, path, build_query(&params))
        } else {
            format!("{}{}", self.base_url, path)
        };

        info!("Forwarding {} {}", route.method, url);

        let mut request = self
            .client
            .request(route.method.clone(), &url)
            .header("Content-Type", "application/json");

        if let Some(key) = self.api_key.as_deref() {
            request = request.header("X-Api-Key", key);
        }
        if let Some(auth) = authorization {
            request = request.header("Authorization", auth);
        }
        if route.method == Method::POST || route.method == Method::PUT {
            request = request.json(&params);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::UpstreamTimeout
            } else {
                GatewayError::HttpClient(e)
            }
        })?;

        let status = response.status();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/json")
            .to_string();
        let body = response.bytes().await.map_err(GatewayError::HttpClient)?;

        debug!("Upstream responded {} ({} bytes)", status, body.len());

        Ok(UpstreamResponse {
            status,
            content_type,
            body,
        })
    }
}
