//! Signed request envelope
//!
//! Every proxied call arrives as a signed envelope produced by the client:
//! the action name, a JSON-encoded parameter payload, an HMAC-SHA256
//! signature over the envelope fields plus the client fingerprint, a
//! millisecond timestamp and a one-time nonce. The envelope is
//! attacker-controlled; with a signing secret configured the gateway
//! verifies the signature and timestamp freshness before any other gate.

use crate::config::SigningConfig;
use crate::utils::clock::epoch_ms_i64;
use crate::utils::error::{GatewayError, Result};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::{Map, Value};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// The `POST /api/proxy` request body
#[derive(Debug, Clone, Deserialize)]
pub struct ProxyEnvelope {
    /// Action name resolved against the route table
    pub action: String,
    /// JSON-encoded parameter object
    #[serde(default)]
    pub payload: String,
    /// Hex HMAC-SHA256 signature
    #[serde(default)]
    pub signature: String,
    /// Client clock at signing time, epoch milliseconds
    #[serde(default)]
    pub timestamp: i64,
    /// One-time token mixed into the signature
    #[serde(default)]
    pub nonce: String,
}

impl ProxyEnvelope {
    /// Decode the payload into a parameter map.
    ///
    /// An empty payload is an empty parameter set; anything that is not a
    /// JSON object is a malformed request.
    pub fn params(&self) -> Result<Map<String, Value>> {
        if self.payload.is_empty() {
            return Ok(Map::new());
        }
        let params: Map<String, Value> = serde_json::from_str(&self.payload)?;
        Ok(params)
    }
}

/// Envelope signature and freshness verifier
pub struct EnvelopeVerifier {
    secret: Option<String>,
    timestamp_window_ms: i64,
}

impl EnvelopeVerifier {
    /// Build a verifier from configuration.
    pub fn new(config: &SigningConfig) -> Self {
        Self {
            secret: config.secret.clone(),
            timestamp_window_ms: config.timestamp_window_ms,
        }
    }

    /// Whether envelope validation is active.
    pub fn enforced(&self) -> bool {
        self.secret.is_some()
    }

    /// Verify an envelope against the current clock.
    pub fn verify(&self, envelope: &ProxyEnvelope, fingerprint: &str) -> Result<()> {
        self.verify_at(envelope, fingerprint, epoch_ms_i64())
    }

    /// `verify` against an explicit clock.
    pub(crate) fn verify_at(
        &self,
        envelope: &ProxyEnvelope,
        fingerprint: &str,
        now_ms: i64,
    ) -> Result<()> {
        let Some(secret) = self.secret.as_deref() else {
            return Ok(());
        };

        if (now_ms - envelope.timestamp).abs() > self.timestamp_window_ms {
            return Err(GatewayError::StaleTimestamp);
        }

        let signature = hex::decode(&envelope.signature)
            .map_err(|_| GatewayError::InvalidSignature)?;

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|_| GatewayError::InvalidSignature)?;
        mac.update(signing_input(envelope, fingerprint).as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| GatewayError::InvalidSignature)
    }

    /// Produce the signature the client would send for these fields.
    ///
    /// `None` when no secret is configured. Used by tests and tooling.
    pub fn sign(&self, envelope: &ProxyEnvelope, fingerprint: &str) -> Option<String> {
        let secret = self.secret.as_deref()?;
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
        mac.update(signing_input(envelope, fingerprint).as_bytes());
        Some(hex::encode(mac.finalize().into_bytes()))
    }
}

/// The exact byte string both sides sign.
fn signing_input(envelope: &ProxyEnvelope, fingerprint: &str) -> String {
    format!(
        "{}:{}:{}:{}:{}",
        envelope.action, envelope.payload, envelope.timestamp, envelope.nonce, fingerprint
    )
}
