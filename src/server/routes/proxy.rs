//! Proxy orchestrator
//!
//! `POST /api/proxy` runs every request through the fixed gate sequence:
//! envelope signature, rate-limit check, CAPTCHA (only when flagged),
//! Proof-of-Work, slowdown hold, rate-limit record, route resolution,
//! upstream forward, verbatim relay. The first failing gate wins;
//! recording happens strictly after the verification gates so rejected or
//! incomplete requests never inflate the counters.

use crate::core::envelope::ProxyEnvelope;
use crate::core::pow::verify_solution;
use crate::server::state::AppState;
use crate::server::utils::{client_ip, header_value};
use crate::utils::clock::epoch_ms;
use crate::utils::error::GatewayError;
use actix_web::{HttpRequest, HttpResponse, web};
use std::time::Duration;
use tracing::{debug, info};

/// `POST /api/proxy`
pub async fn proxy(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<ProxyEnvelope>,
) -> Result<HttpResponse, GatewayError> {
    let envelope = body.into_inner();
    let ip = client_ip(&req);
    let fingerprint = header_value(&req, "x-client-fp");
    let is_search = state.routes.is_search_action(&envelope.action);

    debug!(
        "Proxy request from ip={} fp={} search={}",
        ip,
        fingerprint.unwrap_or("-"),
        is_search
    );

    // Envelope signature and freshness, when a signing secret is configured.
    state
        .envelope
        .verify(&envelope, fingerprint.unwrap_or_default())?;

    // Rate limiting.
    let decision = state.limiter.check(&ip, fingerprint, is_search).await;
    if decision.limited {
        info!(
            "Rate limited ip={} retry_after={}s",
            ip, decision.retry_after_secs
        );
        return Err(GatewayError::RateLimited {
            retry_after_secs: decision.retry_after_secs,
        });
    }

    // CAPTCHA escalation. Rejecting here consumes neither PoW nor budget:
    // the client retries the same request with a token.
    if decision.captcha_required {
        let Some(token) = header_value(&req, "x-captcha-token") else {
            info!("CAPTCHA demanded for ip={}, no token present", ip);
            return Err(GatewayError::CaptchaRequired);
        };
        if !state.captcha.verify(token, &ip).await {
            info!("CAPTCHA token rejected for ip={}", ip);
            return Err(GatewayError::CaptchaInvalid);
        }
    }

    // Proof-of-Work. The challenge must have been issued here, be inside
    // its TTL and carry a valid solution; success consumes it.
    let challenge = header_value(&req, "x-pow-challenge");
    let nonce = header_value(&req, "x-pow-nonce");
    let (Some(challenge), Some(nonce)) = (challenge, nonce) else {
        return Err(GatewayError::PowRequired);
    };

    let Some(created_at) = state.challenges.created_at(challenge) else {
        return Err(GatewayError::PowUnknown);
    };
    if state.challenges.is_expired(created_at, epoch_ms()) {
        state.challenges.remove(challenge);
        return Err(GatewayError::PowExpired);
    }
    if !verify_solution(challenge, nonce, state.challenges.difficulty()) {
        // The unconsumed challenge stays valid for another attempt.
        return Err(GatewayError::PowInvalid);
    }
    state.challenges.remove(challenge);
    debug!("PoW verified for ip={}", ip);

    // Progressive slowdown: hold this response without blocking others.
    if decision.slowdown_ms > 0 {
        debug!("Slowing down ip={} by {}ms", ip, decision.slowdown_ms);
        tokio::time::sleep(Duration::from_millis(decision.slowdown_ms)).await;
    }

    // Only now does the request count against the budget.
    state.limiter.record(&ip, fingerprint, is_search).await;

    // Route resolution and forward.
    let Some(route) = state.routes.resolve(&envelope.action) else {
        info!("Unknown action from ip={}", ip);
        return Err(GatewayError::UnknownAction);
    };

    let params = envelope.params()?;
    let authorization = header_value(&req, "authorization");
    let upstream = state.upstream.forward(route, params, authorization).await?;

    Ok(HttpResponse::build(upstream.status)
        .content_type(upstream.content_type)
        .body(upstream.body))
}
