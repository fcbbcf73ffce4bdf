//! CAPTCHA verification configuration

use serde::{Deserialize, Serialize};

/// CAPTCHA verification settings
///
/// With no secret configured the gate accepts tokens uncritically — an
/// explicit operational fail-open, not an oversight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptchaConfig {
    /// Server-side verification secret; unset disables strict validation
    #[serde(default)]
    pub secret: Option<String>,
    /// Verification endpoint
    #[serde(default = "default_verify_url")]
    pub verify_url: String,
    /// Verification call timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CaptchaConfig {
    fn default() -> Self {
        Self {
            secret: None,
            verify_url: default_verify_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl CaptchaConfig {
    /// Validate CAPTCHA configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.verify_url.is_empty() {
            return Err("CAPTCHA verify URL cannot be empty".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("CAPTCHA timeout must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn default_verify_url() -> String {
    "https://api.hcaptcha.com/siteverify".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}
