//! Configuration models
//!
//! One model per concern, each with serde defaults matching the shipped
//! gateway behavior so an empty config file yields a working instance.

pub mod captcha;
pub mod pow;
pub mod rate_limit;
pub mod server;
pub mod signing;
pub mod upstream;

pub use captcha::CaptchaConfig;
pub use pow::PowConfig;
pub use rate_limit::RateLimitConfig;
pub use server::ServerConfig;
pub use signing::SigningConfig;
pub use upstream::UpstreamConfig;

use serde::{Deserialize, Serialize};

/// Top-level gateway configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Rate limiter thresholds and windows
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Proof-of-Work challenge settings
    #[serde(default)]
    pub pow: PowConfig,
    /// CAPTCHA verification settings
    #[serde(default)]
    pub captcha: CaptchaConfig,
    /// Upstream API target
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// Request envelope signing
    #[serde(default)]
    pub signing: SigningConfig,
}
