//! # Palisade
//!
//! A backend-for-frontend anti-abuse gateway. Palisade fronts an upstream
//! catalog API and guards a single proxy endpoint with layered defenses:
//!
//! - **Sliding-window rate limiting** across four keys: a 1-second burst
//!   brake per IP, minute windows per IP and per client fingerprint, and a
//!   tighter minute window for search traffic.
//! - **Progressive slowdown**: artificial response latency ramping from 0
//!   to 2 seconds as a client approaches its limit.
//! - **CAPTCHA escalation**: clients near their budget must present an
//!   externally verified CAPTCHA token.
//! - **Proof-of-Work**: each proxied call spends a single-use,
//!   server-issued hash-prefix challenge.
//!
//! Requests arrive as signed envelopes carrying an opaque action name; the
//! gateway resolves the action against a static dispatch table, forwards
//! the call upstream and relays the response verbatim.
//!
//! ## Running the gateway
//!
//! ```rust,no_run
//! use palisade::{Config, Gateway};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config/gateway.yaml").await?;
//!     let gateway = Gateway::new(&config)?;
//!     gateway.run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod upstream;
pub mod utils;

// Re-export main types
pub use config::Config;
pub use utils::error::{GatewayError, Result};

use tracing::info;

/// The gateway: configuration plus an HTTP server ready to run
pub struct Gateway {
    server: server::HttpServer,
}

impl Gateway {
    /// Create a new gateway instance
    pub fn new(config: &Config) -> Result<Self> {
        info!("Creating gateway instance");
        let server = server::HttpServer::new(config)?;
        Ok(Self { server })
    }

    /// Run the gateway server until shutdown
    pub async fn run(self) -> Result<()> {
        info!("Starting palisade gateway");
        self.server.start().await
    }
}

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
