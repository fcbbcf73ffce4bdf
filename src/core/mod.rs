//! Core gateway components
//!
//! The anti-abuse building blocks: rate limiting, Proof-of-Work, CAPTCHA
//! verification, request routing and envelope validation. Each component is
//! an explicitly owned service instance injected into the HTTP layer —
//! there are no module-level singletons.

pub mod captcha;
pub mod envelope;
pub mod pow;
pub mod rate_limiter;
pub mod routing;
pub mod sweep;
