//! Rate limiting
//!
//! Multi-bucket sliding-window rate limiter with burst, per-IP,
//! per-fingerprint and search-specific tiers, progressive slowdown and
//! CAPTCHA escalation signaling.

mod limiter;
mod types;


pub use limiter::RateLimiter;
pub use types::RateLimitDecision;
