//! Proof-of-Work configuration

use serde::{Deserialize, Serialize};

/// Proof-of-Work challenge settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowConfig {
    /// Required number of leading zero characters in the hex solution hash
    #[serde(default = "default_difficulty")]
    pub difficulty: u32,
    /// Challenge lifetime in seconds
    #[serde(default = "default_challenge_ttl_secs")]
    pub challenge_ttl_secs: u64,
    /// Seconds between expiry sweeps
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for PowConfig {
    fn default() -> Self {
        Self {
            difficulty: default_difficulty(),
            challenge_ttl_secs: default_challenge_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl PowConfig {
    /// Challenge lifetime in milliseconds
    pub fn challenge_ttl_ms(&self) -> u64 {
        self.challenge_ttl_secs * 1_000
    }

    /// Validate Proof-of-Work configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.difficulty == 0 || self.difficulty > 16 {
            return Err("PoW difficulty must be between 1 and 16".to_string());
        }
        if self.challenge_ttl_secs == 0 {
            return Err("Challenge TTL must be greater than 0".to_string());
        }
        if self.sweep_interval_secs == 0 {
            return Err("Sweep interval must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn default_difficulty() -> u32 {
    3
}

fn default_challenge_ttl_secs() -> u64 {
    300
}

fn default_sweep_interval_secs() -> u64 {
    60
}
