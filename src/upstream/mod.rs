//! Upstream forwarding
//!
//! Relays resolved calls to the upstream API and hands the response back
//! for verbatim relay. The gateway never reinterprets or reshapes upstream
//! payloads.

mod forwarder;

pub use forwarder::{UpstreamForwarder, UpstreamResponse};
