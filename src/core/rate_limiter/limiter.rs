//! Core rate limiter implementation

use super::types::{RateBucket, RateLimitDecision};
use crate::config::RateLimitConfig;
use crate::core::sweep::Sweeper;
use crate::utils::clock::epoch_ms;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// The four bucket maps, guarded together.
///
/// Limits are advisory; slightly approximate counts under racing requests
/// are acceptable, so one coarse lock covers all four maps.
#[derive(Default)]
struct BucketMaps {
    burst: HashMap<String, RateBucket>,
    ip: HashMap<String, RateBucket>,
    fingerprint: HashMap<String, RateBucket>,
    search: HashMap<String, RateBucket>,
}

/// Multi-bucket sliding-window rate limiter
///
/// `check` evaluates the tiers in strict order (burst, IP, fingerprint,
/// search) and reports the accumulated decision; `record` appends accepted
/// traffic. Recording is the caller's responsibility and must happen only
/// after every other gate has passed, so rejected or incomplete requests do
/// not inflate the counters.
pub struct RateLimiter {
    config: RateLimitConfig,
    buckets: RwLock<BucketMaps>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            buckets: RwLock::new(BucketMaps::default()),
        }
    }

    /// Decide whether a request may proceed.
    pub async fn check(
        &self,
        ip: &str,
        fingerprint: Option<&str>,
        is_search: bool,
    ) -> RateLimitDecision {
        self.check_at(ip, fingerprint, is_search, epoch_ms()).await
    }

    /// `check` against an explicit clock.
    pub(crate) async fn check_at(
        &self,
        ip: &str,
        fingerprint: Option<&str>,
        is_search: bool,
        now_ms: u64,
    ) -> RateLimitDecision {
        let cfg = &self.config;
        let buckets = self.buckets.read().await;

        // 1. Burst brake: hard short-window cap, fixed 1s retry, never
        //    escalates to CAPTCHA.
        let burst_count = count(&buckets.burst, ip, now_ms, cfg.burst_window_ms);
        if burst_count >= cfg.burst_per_second {
            debug!("Burst limit hit for {}: {} in window", ip, burst_count);
            return RateLimitDecision::limited(1);
        }

        // 2. Per-IP minute window.
        let ip_count = count(&buckets.ip, ip, now_ms, cfg.window_ms);
        if ip_count >= cfg.ip_per_minute {
            let retry = retry_after(&buckets.ip, ip, now_ms, cfg.window_ms);
            debug!("IP limit hit for {}: {}/{}", ip, ip_count, cfg.ip_per_minute);
            return RateLimitDecision::limited(retry);
        }

        // 3. Per-fingerprint minute window, only when the client sent one.
        if let Some(fp) = fingerprint {
            let fp_count = count(&buckets.fingerprint, fp, now_ms, cfg.window_ms);
            if fp_count >= cfg.fp_per_minute {
                let retry = retry_after(&buckets.fingerprint, fp, now_ms, cfg.window_ms);
                debug!("Fingerprint limit hit: {}/{}", fp_count, cfg.fp_per_minute);
                return RateLimitDecision::limited(retry);
            }
        }

        // 4. Search-specific window, keyed by fingerprint when available.
        if is_search {
            let key = fingerprint.unwrap_or(ip);
            let search_count = count(&buckets.search, key, now_ms, cfg.window_ms);
            if search_count >= cfg.search_per_minute {
                let retry = retry_after(&buckets.search, key, now_ms, cfg.window_ms);
                return RateLimitDecision::limited(retry);
            }
            let search_ratio = f64::from(search_count) / f64::from(cfg.search_per_minute);
            if search_ratio >= cfg.captcha_threshold {
                // Soft gate: demand CAPTCHA without rejecting or slowing.
                return RateLimitDecision {
                    limited: false,
                    retry_after_secs: 0,
                    slowdown_ms: 0,
                    captcha_required: true,
                };
            }
        }

        // 5. Progressive slowdown and CAPTCHA escalation from IP utilization.
        let mut slowdown_ms = 0;
        let mut captcha_required = false;
        let ip_ratio = f64::from(ip_count) / f64::from(cfg.ip_per_minute);
        if ip_ratio >= cfg.slowdown_threshold {
            let over = (ip_ratio - cfg.slowdown_threshold) / (1.0 - cfg.slowdown_threshold);
            slowdown_ms = (over * cfg.max_slowdown_ms as f64).round() as u64;
        }
        if ip_ratio >= cfg.captcha_threshold {
            captcha_required = true;
        }

        RateLimitDecision {
            limited: false,
            retry_after_secs: 0,
            slowdown_ms,
            captcha_required,
        }
    }

    /// Record an accepted request in every applicable bucket.
    pub async fn record(&self, ip: &str, fingerprint: Option<&str>, is_search: bool) {
        self.record_at(ip, fingerprint, is_search, epoch_ms()).await;
    }

    /// `record` against an explicit clock.
    pub(crate) async fn record_at(
        &self,
        ip: &str,
        fingerprint: Option<&str>,
        is_search: bool,
        now_ms: u64,
    ) {
        let mut buckets = self.buckets.write().await;
        push(&mut buckets.burst, ip, now_ms);
        push(&mut buckets.ip, ip, now_ms);
        if let Some(fp) = fingerprint {
            push(&mut buckets.fingerprint, fp, now_ms);
        }
        if is_search {
            let key = fingerprint.unwrap_or(ip);
            push(&mut buckets.search, key, now_ms);
        }
    }

    /// Drop expired timestamps and delete empty buckets across all maps.
    pub async fn cleanup(&self) {
        self.cleanup_at(epoch_ms()).await;
    }

    /// `cleanup` against an explicit clock.
    pub(crate) async fn cleanup_at(&self, now_ms: u64) {
        let window_ms = self.config.window_ms;
        let burst_window_ms = self.config.burst_window_ms;

        let mut buckets = self.buckets.write().await;
        buckets.ip.retain(|_, b| b.prune(now_ms, window_ms));
        buckets.fingerprint.retain(|_, b| b.prune(now_ms, window_ms));
        buckets.search.retain(|_, b| b.prune(now_ms, window_ms));
        buckets.burst.retain(|_, b| b.prune(now_ms, burst_window_ms));
    }

    /// Spawn the periodic bucket sweep, owned by the returned handle.
    pub fn start_sweeper(self: Arc<Self>) -> Sweeper {
        let period = Duration::from_secs(self.config.sweep_interval_secs);
        let limiter = self;
        Sweeper::spawn(
            period,
            move || {
                let limiter = Arc::clone(&limiter);
                async move {
                    limiter.cleanup().await;
                }
            },
        )
    }

    /// Number of live buckets across all maps (diagnostics and tests).
    pub async fn bucket_count(&self) -> usize {
        let buckets = self.buckets.read().await;
        buckets.burst.len() + buckets.ip.len() + buckets.fingerprint.len() + buckets.search.len()
    }
}

fn count(map: &HashMap<String, RateBucket>, key: &str, now_ms: u64, window_ms: u64) -> u32 {
    map.get(key)
        .map(|b| b.count_in_window(now_ms, window_ms))
        .unwrap_or(0)
}

fn push(map: &mut HashMap<String, RateBucket>, key: &str, now_ms: u64) {
    // Avoid the String allocation when the bucket already exists.
    if let Some(bucket) = map.get_mut(key) {
        bucket.timestamps.push(now_ms);
    } else {
        map.entry(key.to_string()).or_default().timestamps.push(now_ms);
    }
}

/// Seconds until the oldest surviving timestamp leaves the window, rounded
/// up, floored at 1.
fn retry_after(map: &HashMap<String, RateBucket>, key: &str, now_ms: u64, window_ms: u64) -> u64 {
    let Some(oldest) = map.get(key).and_then(|b| b.oldest_in_window(now_ms, window_ms)) else {
        return 1;
    };
    let remaining_ms = (oldest + window_ms).saturating_sub(now_ms);
    remaining_ms.div_ceil(1_000).max(1)
}
