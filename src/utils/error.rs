//! Error handling for the gateway
//!
//! This module defines all error types used throughout the gateway and
//! their mapping onto the HTTP surface. Rejection bodies are deliberately
//! minimal: no counter values, bucket keys or action identifiers ever reach
//! the client.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Result type alias for the gateway
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Main error type for the gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request rejected by the rate limiter
    #[error("Rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds until the oldest counted request leaves the window
        retry_after_secs: u64,
    },

    /// CAPTCHA demanded but no token was supplied
    #[error("CAPTCHA required")]
    CaptchaRequired,

    /// A CAPTCHA token was supplied but failed verification
    #[error("Invalid CAPTCHA token")]
    CaptchaInvalid,

    /// Proof-of-Work headers missing from the request
    #[error("Proof-of-Work required")]
    PowRequired,

    /// Proof-of-Work challenge was never issued by this gateway
    #[error("Unknown Proof-of-Work challenge")]
    PowUnknown,

    /// Proof-of-Work challenge outlived its TTL
    #[error("Proof-of-Work challenge expired")]
    PowExpired,

    /// Proof-of-Work solution does not satisfy the difficulty predicate
    #[error("Invalid Proof-of-Work solution")]
    PowInvalid,

    /// Envelope signature does not match the signed fields
    #[error("Invalid request signature")]
    InvalidSignature,

    /// Envelope timestamp outside the freshness window
    #[error("Request timestamp outside validity window")]
    StaleTimestamp,

    /// Action identifier not present in the route table
    #[error("Unknown action")]
    UnknownAction,

    /// Upstream call exceeded the configured timeout
    #[error("Upstream request timed out")]
    UpstreamTimeout,

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Whether this error is reported to the client as an opaque 500.
    fn is_opaque(&self) -> bool {
        matches!(
            self,
            GatewayError::Config(_)
                | GatewayError::HttpClient(_)
                | GatewayError::Serialization(_)
                | GatewayError::Io(_)
                | GatewayError::Internal(_)
        )
    }
}

impl ResponseError for GatewayError {
    fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::CaptchaRequired
            | GatewayError::CaptchaInvalid
            | GatewayError::PowRequired
            | GatewayError::PowUnknown
            | GatewayError::PowExpired
            | GatewayError::PowInvalid
            | GatewayError::InvalidSignature
            | GatewayError::StaleTimestamp => StatusCode::FORBIDDEN,
            GatewayError::UnknownAction => StatusCode::BAD_REQUEST,
            GatewayError::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Detail for internal failures stays in the server log.
        if self.is_opaque() {
            error!("Internal gateway error: {}", self);
        }

        match self {
            GatewayError::RateLimited { retry_after_secs } => {
                HttpResponse::TooManyRequests()
                    .insert_header(("Retry-After", retry_after_secs.to_string()))
                    .json(json!({
                        "error": "Too many requests",
                        "retryAfter": retry_after_secs,
                    }))
            }
            GatewayError::CaptchaRequired => HttpResponse::Forbidden().json(json!({
                "error": "CAPTCHA required",
                "captchaRequired": true,
            })),
            GatewayError::CaptchaInvalid => HttpResponse::Forbidden().json(json!({
                "error": "Invalid CAPTCHA token",
                "captchaRequired": true,
            })),
            GatewayError::PowRequired => HttpResponse::Forbidden().json(json!({
                "error": "Proof-of-Work required",
                "powRequired": true,
            })),
            GatewayError::PowUnknown => HttpResponse::Forbidden().json(json!({
                "error": "Invalid Proof-of-Work challenge",
                "powRequired": true,
            })),
            GatewayError::PowExpired => HttpResponse::Forbidden().json(json!({
                "error": "Proof-of-Work challenge expired",
                "powRequired": true,
            })),
            GatewayError::PowInvalid => HttpResponse::Forbidden().json(json!({
                "error": "Invalid Proof-of-Work solution",
                "powRequired": true,
            })),
            GatewayError::InvalidSignature => HttpResponse::Forbidden().json(json!({
                "error": "Invalid request signature",
            })),
            GatewayError::StaleTimestamp => HttpResponse::Forbidden().json(json!({
                "error": "Request timestamp outside validity window",
            })),
            GatewayError::UnknownAction => HttpResponse::BadRequest().json(json!({
                "error": "Unknown action",
            })),
            GatewayError::UpstreamTimeout => HttpResponse::GatewayTimeout().json(json!({
                "error": "Upstream request timed out",
            })),
            _ => HttpResponse::InternalServerError().json(json!({
                "error": "Internal proxy error",
            })),
        }
    }
}
