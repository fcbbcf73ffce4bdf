//! HTTP server implementation
//!
//! This module provides the HTTP server, shared application state and the
//! route handlers, including the proxy orchestrator.

pub mod builder;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;
mod utils;

pub use server::HttpServer;
pub use state::AppState;
