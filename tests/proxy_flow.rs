//! End-to-end tests for the proxy gate sequence
//!
//! Each test builds the full actix application around a wiremock upstream
//! and drives it over HTTP, exactly as a client would.

use actix_web::{App, test, web};
use palisade::config::Config;
use palisade::core::envelope::{EnvelopeVerifier, ProxyEnvelope};
use palisade::core::pow::{solve, verify_solution};
use palisade::server::{AppState, handlers, routes};
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CLIENT_IP: &str = "203.0.113.5";

fn base_config(upstream_uri: &str) -> Config {
    let mut config = Config::default();
    config.gateway.upstream.base_url = upstream_uri.to_string();
    // Difficulty 1 keeps test solves to a handful of hash attempts.
    config.gateway.pow.difficulty = 1;
    config
}

fn state_for(config: Config) -> AppState {
    AppState::from_config(config).expect("state builds from config")
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .route("/health", web::get().to(handlers::health_check))
                .configure(routes::configure),
        )
        .await
    };
}

/// Issue a challenge through the store and brute-force its solution.
fn solved_challenge(state: &AppState) -> (String, String) {
    let issued = state.challenges.issue(CLIENT_IP);
    let nonce = solve(&issued.challenge, issued.difficulty).expect("solvable");
    (issued.challenge, nonce)
}

fn proxy_request(
    action: &str,
    payload: Value,
    pow: Option<(&str, &str)>,
) -> test::TestRequest {
    let mut req = test::TestRequest::post()
        .uri("/api/proxy")
        .insert_header(("x-forwarded-for", CLIENT_IP))
        .set_json(json!({
            "action": action,
            "payload": payload.to_string(),
        }));
    if let Some((challenge, nonce)) = pow {
        req = req
            .insert_header(("x-pow-challenge", challenge.to_string()))
            .insert_header(("x-pow-nonce", nonce.to_string()));
    }
    req
}

#[actix_web::test]
async fn test_health_endpoint() {
    let state = state_for(base_config("http://127.0.0.1:1"));
    let app = init_app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request())
        .await;
    assert!(resp.status().is_success());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
}

#[actix_web::test]
async fn test_pow_challenge_issuance() {
    let state = state_for(base_config("http://127.0.0.1:1"));
    let app = init_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/pow-challenge")
            .to_request(),
    )
    .await;
    assert!(resp.status().is_success());
    let body: Value = test::read_body_json(resp).await;

    let challenge = body["challenge"].as_str().unwrap();
    assert_eq!(challenge.len(), 32);
    assert_eq!(body["difficulty"], 1);
}

#[actix_web::test]
async fn test_happy_path_forwards_and_relays() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dictionaries/servers"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/json")
                .set_body_json(json!([{"id": 1, "name": "Aurora"}])),
        )
        .expect(1)
        .mount(&upstream)
        .await;

    let state = state_for(base_config(&upstream.uri()));
    let app = init_app!(state);

    // Obtain the challenge over HTTP like a real client.
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/pow-challenge")
            .to_request(),
    )
    .await;
    let issued: Value = test::read_body_json(resp).await;
    let challenge = issued["challenge"].as_str().unwrap().to_string();
    let nonce = solve(&challenge, issued["difficulty"].as_u64().unwrap() as u32).unwrap();

    let resp = test::call_service(
        &app,
        proxy_request("getServers", json!({}), Some((&challenge, &nonce))).to_request(),
    )
    .await;

    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body[0]["name"], "Aurora");
}

#[actix_web::test]
async fn test_challenge_is_single_use_over_http() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dictionaries/servers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&upstream)
        .await;

    let state = state_for(base_config(&upstream.uri()));
    let app = init_app!(state);
    let (challenge, nonce) = solved_challenge(&state);

    let resp = test::call_service(
        &app,
        proxy_request("getServers", json!({}), Some((&challenge, &nonce))).to_request(),
    )
    .await;
    assert_eq!(resp.status().as_u16(), 200);

    // Identical resubmission: the consumed token is gone.
    let resp = test::call_service(
        &app,
        proxy_request("getServers", json!({}), Some((&challenge, &nonce))).to_request(),
    )
    .await;
    assert_eq!(resp.status().as_u16(), 403);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["powRequired"], true);
}

#[actix_web::test]
async fn test_missing_pow_headers_rejected() {
    let state = state_for(base_config("http://127.0.0.1:1"));
    let app = init_app!(state);

    let resp = test::call_service(
        &app,
        proxy_request("getServers", json!({}), None).to_request(),
    )
    .await;
    assert_eq!(resp.status().as_u16(), 403);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["powRequired"], true);
}

#[actix_web::test]
async fn test_unknown_challenge_rejected() {
    let state = state_for(base_config("http://127.0.0.1:1"));
    let app = init_app!(state);

    let resp = test::call_service(
        &app,
        proxy_request(
            "getServers",
            json!({}),
            Some(("00000000000000000000000000000000", "7")),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status().as_u16(), 403);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["powRequired"], true);
}

#[actix_web::test]
async fn test_invalid_solution_keeps_challenge_usable() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dictionaries/servers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&upstream)
        .await;

    let state = state_for(base_config(&upstream.uri()));
    let app = init_app!(state);

    let issued = state.challenges.issue(CLIENT_IP);
    // The smallest nonce that does NOT satisfy the predicate.
    let wrong = (0..)
        .map(|n: u64| n.to_string())
        .find(|n| !verify_solution(&issued.challenge, n, issued.difficulty))
        .unwrap();

    let resp = test::call_service(
        &app,
        proxy_request("getServers", json!({}), Some((&issued.challenge, &wrong))).to_request(),
    )
    .await;
    assert_eq!(resp.status().as_u16(), 403);

    // The rejected attempt did not consume the token: a correct solution
    // for the same challenge still goes through.
    let nonce = solve(&issued.challenge, issued.difficulty).unwrap();
    let resp = test::call_service(
        &app,
        proxy_request("getServers", json!({}), Some((&issued.challenge, &nonce))).to_request(),
    )
    .await;
    assert_eq!(resp.status().as_u16(), 200);
}

#[actix_web::test]
async fn test_burst_limit_returns_429() {
    let state = state_for(base_config("http://127.0.0.1:1"));
    let app = init_app!(state);

    // Fill the burst window; rejected requests are never recorded, so the
    // counters are preloaded through the limiter itself.
    for _ in 0..10 {
        state.limiter.record(CLIENT_IP, None, false).await;
    }

    let resp = test::call_service(
        &app,
        proxy_request("getServers", json!({}), None).to_request(),
    )
    .await;
    assert_eq!(resp.status().as_u16(), 429);
    assert_eq!(
        resp.headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok()),
        Some("1")
    );
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["retryAfter"], 1);
}

#[actix_web::test]
async fn test_minute_limit_retry_after_matches_window() {
    let mut config = base_config("http://127.0.0.1:1");
    // Disarm the burst brake so the minute tier is the one that trips.
    config.gateway.rate_limit.burst_per_second = 1_000;
    let state = state_for(config);
    let app = init_app!(state);

    for _ in 0..60 {
        state.limiter.record(CLIENT_IP, None, false).await;
    }

    let resp = test::call_service(
        &app,
        proxy_request("getServers", json!({}), None).to_request(),
    )
    .await;
    assert_eq!(resp.status().as_u16(), 429);

    let retry: u64 = resp
        .headers()
        .get("Retry-After")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap();
    assert!((1..=60).contains(&retry));

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["retryAfter"], retry);
}

#[actix_web::test]
async fn test_search_escalation_demands_captcha() {
    let mut config = base_config("http://127.0.0.1:1");
    config.gateway.rate_limit.search_per_minute = 10;
    let state = state_for(config);
    let app = init_app!(state);

    // 9/10 search budget spent: next search demands a CAPTCHA.
    for _ in 0..9 {
        state.limiter.record(CLIENT_IP, None, true).await;
    }

    let resp = test::call_service(
        &app,
        proxy_request("searchCatalog", json!({"query": "sword"}), None).to_request(),
    )
    .await;
    assert_eq!(resp.status().as_u16(), 403);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["captchaRequired"], true);
}

#[actix_web::test]
async fn test_captcha_pass_does_not_exempt_pow() {
    let mut config = base_config("http://127.0.0.1:1");
    config.gateway.rate_limit.search_per_minute = 10;
    // No CAPTCHA secret configured: the presented token is accepted as-is.
    let state = state_for(config);
    let app = init_app!(state);

    for _ in 0..9 {
        state.limiter.record(CLIENT_IP, None, true).await;
    }

    let req = proxy_request("searchCatalog", json!({"query": "sword"}), None)
        .insert_header(("x-captcha-token", "solved-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    // Past the CAPTCHA gate, straight into the PoW wall.
    assert_eq!(resp.status().as_u16(), 403);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["powRequired"], true);
}

#[actix_web::test]
async fn test_unknown_action_rejected_generically() {
    let state = state_for(base_config("http://127.0.0.1:1"));
    let app = init_app!(state);
    let (challenge, nonce) = solved_challenge(&state);

    let resp = test::call_service(
        &app,
        proxy_request("exfiltrateEverything", json!({}), Some((&challenge, &nonce)))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Unknown action");
    // The identifier must not be echoed back.
    assert!(!body.to_string().contains("exfiltrateEverything"));
}

#[actix_web::test]
async fn test_search_query_reaches_upstream() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/catalog/search"))
        .and(query_param("query", "ancient sword"))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(1)
        .mount(&upstream)
        .await;

    let state = state_for(base_config(&upstream.uri()));
    let app = init_app!(state);
    let (challenge, nonce) = solved_challenge(&state);

    let resp = test::call_service(
        &app,
        proxy_request(
            "searchCatalog",
            json!({"query": "ancient sword", "limit": 20}),
            Some((&challenge, &nonce)),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status().as_u16(), 200);
}

#[actix_web::test]
async fn test_upstream_error_relayed_verbatim() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dictionaries/servers"))
        .respond_with(
            ResponseTemplate::new(404)
                .insert_header("content-type", "application/json")
                .set_body_json(json!({"message": "no such dictionary"})),
        )
        .mount(&upstream)
        .await;

    let state = state_for(base_config(&upstream.uri()));
    let app = init_app!(state);
    let (challenge, nonce) = solved_challenge(&state);

    let resp = test::call_service(
        &app,
        proxy_request("getServers", json!({}), Some((&challenge, &nonce))).to_request(),
    )
    .await;
    assert_eq!(resp.status().as_u16(), 404);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "no such dictionary");
}

#[actix_web::test]
async fn test_signed_envelope_roundtrip() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dictionaries/servers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&upstream)
        .await;

    let mut config = base_config(&upstream.uri());
    config.gateway.signing.secret = Some("shared-secret".to_string());
    let signing = config.gateway.signing.clone();
    let state = state_for(config);
    let app = init_app!(state);
    let (challenge, nonce) = solved_challenge(&state);

    let mut envelope = ProxyEnvelope {
        action: "getServers".to_string(),
        payload: "{}".to_string(),
        signature: String::new(),
        timestamp: chrono::Utc::now().timestamp_millis(),
        nonce: "one-time-nonce".to_string(),
    };
    envelope.signature = EnvelopeVerifier::new(&signing)
        .sign(&envelope, "fp-7")
        .unwrap();

    let req = test::TestRequest::post()
        .uri("/api/proxy")
        .insert_header(("x-forwarded-for", CLIENT_IP))
        .insert_header(("x-client-fp", "fp-7"))
        .insert_header(("x-pow-challenge", challenge))
        .insert_header(("x-pow-nonce", nonce))
        .set_json(json!({
            "action": envelope.action,
            "payload": envelope.payload,
            "signature": envelope.signature,
            "timestamp": envelope.timestamp,
            "nonce": envelope.nonce,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
}

#[actix_web::test]
async fn test_unsigned_envelope_rejected_when_enforced() {
    let mut config = base_config("http://127.0.0.1:1");
    config.gateway.signing.secret = Some("shared-secret".to_string());
    let state = state_for(config);
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/proxy")
        .insert_header(("x-forwarded-for", CLIENT_IP))
        .set_json(json!({
            "action": "getServers",
            "payload": "{}",
            "signature": "deadbeef",
            "timestamp": chrono::Utc::now().timestamp_millis(),
            "nonce": "n",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 403);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid request signature");
}

#[actix_web::test]
async fn test_slowdown_holds_near_limit_response() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dictionaries/servers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&upstream)
        .await;

    let mut config = base_config(&upstream.uri());
    config.gateway.rate_limit.ip_per_minute = 10;
    config.gateway.rate_limit.burst_per_second = 1_000;
    let state = state_for(config);
    let app = init_app!(state);

    // 9/10 = 90% utilization: CAPTCHA demanded and a 1s hold applied.
    for _ in 0..9 {
        state.limiter.record(CLIENT_IP, None, false).await;
    }
    let (challenge, nonce) = solved_challenge(&state);

    let started = std::time::Instant::now();
    let req = proxy_request("getServers", json!({}), Some((&challenge, &nonce)))
        .insert_header(("x-captcha-token", "solved-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let elapsed = started.elapsed();

    assert_eq!(resp.status().as_u16(), 200);
    assert!(
        elapsed.as_millis() >= 900,
        "expected ~1s slowdown, got {:?}",
        elapsed
    );
}
