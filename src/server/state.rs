//! Application state shared across HTTP handlers

use crate::config::Config;
use crate::core::captcha::CaptchaVerifier;
use crate::core::envelope::EnvelopeVerifier;
use crate::core::pow::ChallengeStore;
use crate::core::rate_limiter::RateLimiter;
use crate::core::routing::RouteTable;
use crate::upstream::UpstreamForwarder;
use crate::utils::error::Result;
use std::sync::Arc;

/// HTTP server state shared across handlers
///
/// All components are owned service instances behind `Arc` and injected
/// here — nothing reaches for process-wide globals.
#[derive(Clone)]
pub struct AppState {
    /// Gateway configuration (shared read-only)
    pub config: Arc<Config>,
    /// Sliding-window rate limiter
    pub limiter: Arc<RateLimiter>,
    /// Outstanding Proof-of-Work challenges
    pub challenges: Arc<ChallengeStore>,
    /// External CAPTCHA verifier
    pub captcha: Arc<CaptchaVerifier>,
    /// Action dispatch table
    pub routes: Arc<RouteTable>,
    /// Upstream forwarder
    pub upstream: Arc<UpstreamForwarder>,
    /// Request envelope verifier
    pub envelope: Arc<EnvelopeVerifier>,
}

impl AppState {
    /// Build every component from configuration.
    pub fn from_config(config: Config) -> Result<Self> {
        let gateway = &config.gateway;

        let limiter = Arc::new(RateLimiter::new(gateway.rate_limit.clone()));
        let challenges = Arc::new(ChallengeStore::new(gateway.pow.clone()));
        let captcha = Arc::new(CaptchaVerifier::new(gateway.captcha.clone())?);
        let routes = Arc::new(RouteTable::with_default_routes());
        let upstream = Arc::new(UpstreamForwarder::new(&gateway.upstream)?);
        let envelope = Arc::new(EnvelopeVerifier::new(&gateway.signing));

        Ok(Self {
            config: Arc::new(config),
            limiter,
            challenges,
            captcha,
            routes,
            upstream,
            envelope,
        })
    }
}
