//! Rate limiter configuration

use serde::{Deserialize, Serialize};

/// Rate limiter thresholds and windows
///
/// Four independent counters share this configuration: a short burst window
/// keyed by IP, a minute window keyed by IP, a minute window keyed by client
/// fingerprint, and a minute window for search traffic keyed by
/// fingerprint-or-IP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests per minute allowed per client IP
    #[serde(default = "default_ip_per_minute")]
    pub ip_per_minute: u32,
    /// Requests per minute allowed per client fingerprint
    #[serde(default = "default_fp_per_minute")]
    pub fp_per_minute: u32,
    /// Search requests per minute allowed per fingerprint-or-IP
    #[serde(default = "default_search_per_minute")]
    pub search_per_minute: u32,
    /// Requests allowed inside the burst window per IP
    #[serde(default = "default_burst_per_second")]
    pub burst_per_second: u32,
    /// Minute window size in milliseconds
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
    /// Burst window size in milliseconds
    #[serde(default = "default_burst_window_ms")]
    pub burst_window_ms: u64,
    /// IP-utilization ratio at which progressive slowdown starts
    #[serde(default = "default_slowdown_threshold")]
    pub slowdown_threshold: f64,
    /// Artificial delay as utilization approaches the limit, milliseconds
    #[serde(default = "default_max_slowdown_ms")]
    pub max_slowdown_ms: u64,
    /// Utilization ratio at which CAPTCHA escalation triggers
    #[serde(default = "default_captcha_threshold")]
    pub captcha_threshold: f64,
    /// Seconds between bucket sweeps
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            ip_per_minute: default_ip_per_minute(),
            fp_per_minute: default_fp_per_minute(),
            search_per_minute: default_search_per_minute(),
            burst_per_second: default_burst_per_second(),
            window_ms: default_window_ms(),
            burst_window_ms: default_burst_window_ms(),
            slowdown_threshold: default_slowdown_threshold(),
            max_slowdown_ms: default_max_slowdown_ms(),
            captcha_threshold: default_captcha_threshold(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl RateLimitConfig {
    /// Validate rate limiter configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.ip_per_minute == 0
            || self.fp_per_minute == 0
            || self.search_per_minute == 0
            || self.burst_per_second == 0
        {
            return Err("Rate limits must be greater than 0".to_string());
        }
        if self.window_ms == 0 || self.burst_window_ms == 0 {
            return Err("Rate limit windows must be greater than 0".to_string());
        }
        if !(0.0..1.0).contains(&self.slowdown_threshold) {
            return Err("Slowdown threshold must be in [0, 1)".to_string());
        }
        if !(0.0..=1.0).contains(&self.captcha_threshold) {
            return Err("CAPTCHA threshold must be in [0, 1]".to_string());
        }
        if self.sweep_interval_secs == 0 {
            return Err("Sweep interval must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn default_ip_per_minute() -> u32 {
    60
}

fn default_fp_per_minute() -> u32 {
    100
}

fn default_search_per_minute() -> u32 {
    20
}

fn default_burst_per_second() -> u32 {
    10
}

fn default_window_ms() -> u64 {
    60_000
}

fn default_burst_window_ms() -> u64 {
    1_000
}

fn default_slowdown_threshold() -> f64 {
    0.8
}

fn default_max_slowdown_ms() -> u64 {
    2_000
}

fn default_captcha_threshold() -> f64 {
    0.9
}

fn default_sweep_interval_secs() -> u64 {
    30
}
