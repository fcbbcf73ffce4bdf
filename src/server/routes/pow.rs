//! Proof-of-Work challenge issuance

use crate::server::state::AppState;
use crate::server::utils::client_ip;
use actix_web::{HttpRequest, HttpResponse, web};

/// `GET /api/pow-challenge`
///
/// Issues a fresh challenge bound to the requesting IP. No authentication:
/// the cost lives in solving, not obtaining, a challenge.
pub async fn pow_challenge(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    let ip = client_ip(&req);
    let challenge = state.challenges.issue(&ip);
    HttpResponse::Ok().json(challenge)
}
