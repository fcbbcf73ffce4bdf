//! Request envelope signing configuration

use serde::{Deserialize, Serialize};

/// Envelope signature validation settings
///
/// The secret must match the one compiled into the client. Unset disables
/// signature and freshness checks entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigningConfig {
    /// Shared HMAC secret; unset disables envelope validation
    #[serde(default)]
    pub secret: Option<String>,
    /// Accepted clock skew between client timestamp and server, milliseconds
    #[serde(default = "default_timestamp_window_ms")]
    pub timestamp_window_ms: i64,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            secret: None,
            timestamp_window_ms: default_timestamp_window_ms(),
        }
    }
}

impl SigningConfig {
    /// Validate signing configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.timestamp_window_ms <= 0 {
            return Err("Timestamp window must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn default_timestamp_window_ms() -> i64 {
    30_000
}
