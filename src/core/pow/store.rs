//! Challenge store
//!
//! In-memory registry of issued Proof-of-Work challenges. A challenge is
//! consumed by exactly one successful verification and expires after its
//! TTL whether used or not.

use crate::config::PowConfig;
use crate::core::sweep::Sweeper;
use crate::utils::clock::epoch_ms;
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Challenge as issued to a client
#[derive(Debug, Clone, serde::Serialize)]
pub struct PowChallenge {
    /// Opaque 32-hex-character token
    pub challenge: String,
    /// Required number of leading zero hex characters
    pub difficulty: u32,
}

/// Server-side record of an issued challenge
#[derive(Debug, Clone)]
pub struct IssuedChallenge {
    /// Issue time, epoch milliseconds
    pub created_at_ms: u64,
    /// IP the challenge was issued to
    pub ip: String,
}

/// Registry of outstanding challenges with TTL expiry
pub struct ChallengeStore {
    config: PowConfig,
    challenges: DashMap<String, IssuedChallenge>,
}

impl ChallengeStore {
    /// Create an empty store
    pub fn new(config: PowConfig) -> Self {
        Self {
            config,
            challenges: DashMap::new(),
        }
    }

    /// Configured difficulty, included in every issued challenge.
    pub fn difficulty(&self) -> u32 {
        self.config.difficulty
    }

    /// Issue a fresh challenge for `ip`.
    pub fn issue(&self, ip: &str) -> PowChallenge {
        self.issue_at(ip, epoch_ms())
    }

    /// `issue` against an explicit clock.
    pub(crate) fn issue_at(&self, ip: &str, now_ms: u64) -> PowChallenge {
        let seed = format!("{}:{}:{}", ip, now_ms, rand::random::<u64>());
        let digest = Sha256::digest(seed.as_bytes());
        let token: String = hex::encode(digest).chars().take(32).collect();

        self.challenges.insert(
            token.clone(),
            IssuedChallenge {
                created_at_ms: now_ms,
                ip: ip.to_string(),
            },
        );
        debug!("Issued PoW challenge {}... for {}", &token[..8], ip);

        PowChallenge {
            challenge: token,
            difficulty: self.config.difficulty,
        }
    }

    /// Look up the issue time of an outstanding challenge.
    pub fn created_at(&self, token: &str) -> Option<u64> {
        self.challenges.get(token).map(|c| c.created_at_ms)
    }

    /// Whether the challenge has outlived its TTL at `now_ms`.
    pub fn is_expired(&self, created_at_ms: u64, now_ms: u64) -> bool {
        now_ms.saturating_sub(created_at_ms) > self.config.challenge_ttl_ms()
    }

    /// Remove a challenge (single-use consumption or expiry).
    pub fn remove(&self, token: &str) {
        self.challenges.remove(token);
    }

    /// Delete every challenge past its TTL.
    pub fn sweep(&self) {
        self.sweep_at(epoch_ms());
    }

    /// `sweep` against an explicit clock.
    pub(crate) fn sweep_at(&self, now_ms: u64) {
        let ttl_ms = self.config.challenge_ttl_ms();
        self.challenges
            .retain(|_, c| now_ms.saturating_sub(c.created_at_ms) <= ttl_ms);
    }

    /// Spawn the periodic expiry sweep, owned by the returned handle.
    pub fn start_sweeper(self: Arc<Self>) -> Sweeper {
        let period = Duration::from_secs(self.config.sweep_interval_secs);
        let store = self;
        Sweeper::spawn(
            period,
            move || {
                let store = Arc::clone(&store);
                async move {
                    store.sweep();
                }
            },
        )
    }

    /// Number of outstanding challenges.
    pub fn len(&self) -> usize {
        self.challenges.len()
    }

    /// Whether the store holds no challenges.
    pub fn is_empty(&self) -> bool {
        self.challenges.is_empty()
    }
}
