//! CAPTCHA verification gate
//!
//! When the rate limiter flags a request, the client must present a solved
//! CAPTCHA token. The token is validated synchronously against an external
//! siteverify endpoint; with no verification secret configured the gate
//! accepts tokens uncritically (explicit fail-open). Passing this gate does
//! not exempt a request from the Proof-of-Work check — the defenses are
//! additive.

use crate::config::CaptchaConfig;
use crate::utils::error::{GatewayError, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Siteverify response shape; only the success flag matters.
#[derive(Debug, Deserialize)]
struct SiteverifyResponse {
    #[serde(default)]
    success: bool,
}

/// External CAPTCHA token verifier
pub struct CaptchaVerifier {
    client: reqwest::Client,
    config: CaptchaConfig,
}

impl CaptchaVerifier {
    /// Create a verifier with its own HTTP client.
    pub fn new(config: CaptchaConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GatewayError::Config(format!("Failed to build CAPTCHA client: {}", e)))?;
        Ok(Self { client, config })
    }

    /// Verify a CAPTCHA token for `ip`.
    ///
    /// Returns `true` when the external service confirms the token, or when
    /// no secret is configured. Any transport failure, non-success status
    /// or unparseable body counts as an invalid token.
    pub async fn verify(&self, token: &str, ip: &str) -> bool {
        let Some(secret) = self.config.secret.as_deref() else {
            debug!("No CAPTCHA secret configured, accepting token uncritically");
            return true;
        };

        let form = [("secret", secret), ("response", token), ("remoteip", ip)];
        match self.client.post(&self.config.verify_url).form(&form).send().await {
            Ok(response) => match response.json::<SiteverifyResponse>().await {
                Ok(body) => body.success,
                Err(e) => {
                    warn!("CAPTCHA verification returned unparseable body: {}", e);
                    false
                }
            },
            Err(e) => {
                warn!("CAPTCHA verification call failed: {}", e);
                false
            }
        }
    }
}
