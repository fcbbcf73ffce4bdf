//! HTTP route modules
//!
//! The two public endpoints of the gateway: challenge issuance and the
//! guarded proxy.

pub mod pow;
pub mod proxy;

use actix_web::web;

/// Register the gateway routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/pow-challenge", web::get().to(pow::pow_challenge))
        .route("/api/proxy", web::post().to(proxy::proxy));
}
