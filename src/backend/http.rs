// src/backend/http.rs
//! `/api/*` routes served through the HTTP gateway. Queries only route and
//! ask for an upgrade; the work happens in `http_request_update`.

use crate::adapter::gemini_adapter::GeminiEnhancer;
use crate::adapter::pinata_adapter::PinataStore;
use crate::adapter::stripe_adapter::StripeGateway;
use crate::error::VaultError;
use crate::services::ports::{ContentStore, PaymentProvider, TextEnhancer};
use crate::services::{enhance_service, payment_service, vault_service};
use crate::storage;
use crate::utils::guards::check_cycles;
use crate::utils::rate_limit::check_rate;
use crate::utils::time::get_current_time_ns;
use candid::{CandidType, Principal};
use ic_cdk_macros::{query, update};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub type HeaderField = (String, String);

#[derive(CandidType, Deserialize, Clone, Debug)]
pub struct HttpGatewayRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<HeaderField>,
    #[serde(with = "serde_bytes")]
    pub body: Vec<u8>,
    pub certificate_version: Option<u16>,
}

#[derive(CandidType, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct HttpGatewayResponse {
    pub status_code: u16,
    pub headers: Vec<HeaderField>,
    #[serde(with = "serde_bytes")]
    pub body: Vec<u8>,
    pub upgrade: Option<bool>,
}

impl HttpGatewayResponse {
    pub fn json(status_code: u16, body: Value) -> Self {
        Self {
            status_code,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: body.to_string().into_bytes(),
            upgrade: None,
        }
    }

    fn upgrade() -> Self {
        Self {
            status_code: 200,
            headers: Vec::new(),
            body: Vec::new(),
            upgrade: Some(true),
        }
    }

    #[cfg(test)]
    pub fn body_json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Checkout,
    Enhance,
    Ipfs,
}

/// Maps method and url to a route, or to the status to answer with.
pub fn resolve(method: &str, url: &str) -> Result<Route, u16> {
    let path = url.split('?').next().unwrap_or(url).trim_end_matches('/');
    let route = match path {
        "/api/checkout" => Route::Checkout,
        "/api/enhance" => Route::Enhance,
        "/api/ipfs" => Route::Ipfs,
        _ => return Err(404),
    };
    if method.eq_ignore_ascii_case("POST") {
        Ok(route)
    } else {
        Err(405)
    }
}

fn status_response(status: u16) -> HttpGatewayResponse {
    let message = match status {
        404 => "Not found",
        405 => "Method not allowed",
        _ => "Request failed",
    };
    HttpGatewayResponse::json(status, json!({ "error": message }))
}

fn header<'a>(req: &'a HttpGatewayRequest, name: &str) -> Option<&'a str> {
    req.headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// `content` as the route handlers see it; JSON-falsy values count as missing.
fn content_field(body: &Value) -> Option<&Value> {
    match body.get("content") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => None,
        Some(value) => Some(value),
    }
}

fn parse_body(body: &[u8]) -> Result<Value, VaultError> {
    serde_json::from_slice(body)
        .map_err(|e| VaultError::SerializationError(format!("Invalid JSON body: {}", e)))
}

pub async fn handle_enhance<E: TextEnhancer>(enhancer: Result<E, VaultError>, body: &[u8]) -> HttpGatewayResponse {
    let failed = |e: VaultError| {
        HttpGatewayResponse::json(500, json!({ "error": "Failed to enhance content", "message": e.to_string() }))
    };
    let parsed = match parse_body(body) {
        Ok(parsed) => parsed,
        Err(e) => return failed(e),
    };
    let content = match content_field(&parsed) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => return HttpGatewayResponse::json(400, json!({ "error": "Content is required" })),
    };
    let enhancer = match enhancer {
        Ok(enhancer) => enhancer,
        Err(e) => {
            log_error!("Enhance route: {}", e);
            return HttpGatewayResponse::json(500, json!({ "error": "AI service not configured" }));
        }
    };
    match enhance_service::enhance(&enhancer, &content).await {
        Ok(enhanced) => HttpGatewayResponse::json(200, json!({ "success": true, "enhanced": enhanced })),
        Err(e) => failed(e),
    }
}

pub async fn handle_ipfs<S: ContentStore>(store: Result<S, VaultError>, body: &[u8]) -> HttpGatewayResponse {
    let internal = |e: VaultError| {
        HttpGatewayResponse::json(
            500,
            json!({ "error": "Internal server error during IPFS upload", "message": e.to_string() }),
        )
    };
    let parsed = match parse_body(body) {
        Ok(parsed) => parsed,
        Err(e) => return internal(e),
    };
    let content = match content_field(&parsed) {
        Some(content) => content.clone(),
        None => return HttpGatewayResponse::json(400, json!({ "error": "Content is required" })),
    };
    let store = match store {
        Ok(store) => store,
        Err(e) => {
            log_error!("IPFS route: {}", e);
            return HttpGatewayResponse::json(500, json!({ "error": "IPFS service not configured" }));
        }
    };
    match vault_service::pin_content(&store, &content).await {
        Ok(receipt) => HttpGatewayResponse::json(
            200,
            json!({
                "success": true,
                "ipfsHash": receipt.ipfs_hash,
                "pinSize": receipt.pin_size,
                "timestamp": receipt.timestamp,
                "gateway": receipt.gateway,
            }),
        ),
        Err(VaultError::UpstreamRejected { status, details }) => HttpGatewayResponse::json(
            status,
            json!({ "error": "Failed to upload to IPFS", "details": details }),
        ),
        Err(e) => internal(e),
    }
}

pub async fn handle_checkout<P: PaymentProvider>(provider: Result<P, VaultError>, origin: &str) -> HttpGatewayResponse {
    let outcome = match provider {
        Ok(provider) => payment_service::create_checkout(&provider, origin).await,
        Err(e) => Err(e),
    };
    match outcome {
        Ok(session) => HttpGatewayResponse::json(200, json!({ "url": session.url })),
        Err(e) => {
            log_error!("Checkout route: {}", e);
            HttpGatewayResponse::json(500, json!({ "error": "Failed to create checkout session" }))
        }
    }
}

/// Runs a resolved route against the configured providers.
pub async fn dispatch(route: Route, req: &HttpGatewayRequest, caller: Principal, now_ns: u64) -> HttpGatewayResponse {
    if let Err(e) = check_rate(caller, now_ns) {
        return HttpGatewayResponse::json(429, json!({ "error": e.to_string() }));
    }
    let config = storage::config::get_config();
    match route {
        Route::Enhance => handle_enhance(GeminiEnhancer::from_config(&config), &req.body).await,
        Route::Ipfs => handle_ipfs(PinataStore::from_config(&config), &req.body).await,
        Route::Checkout => {
            let origin = header(req, "origin")
                .map(str::to_string)
                .unwrap_or_else(|| config.app_origin.clone());
            handle_checkout(StripeGateway::from_config(&config), &origin).await
        }
    }
}

/// Query-path answer: upgrade known routes, refuse the rest.
pub fn route_query(req: &HttpGatewayRequest) -> HttpGatewayResponse {
    match resolve(&req.method, &req.url) {
        Ok(_) => HttpGatewayResponse::upgrade(),
        Err(status) => status_response(status),
    }
}

#[query]
fn http_request(req: HttpGatewayRequest) -> HttpGatewayResponse {
    route_query(&req)
}

#[update]
async fn http_request_update(req: HttpGatewayRequest) -> HttpGatewayResponse {
    let route = match resolve(&req.method, &req.url) {
        Ok(route) => route,
        Err(status) => return status_response(status),
    };
    if let Err(e) = check_cycles() {
        return HttpGatewayResponse::json(e.status_code(), json!({ "error": e.to_string() }));
    }
    dispatch(route, &req, ic_cdk::caller(), get_current_time_ns()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::subscription::CheckoutSession;
    use crate::services::ports::{CheckoutSpec, PriceSpec};
    use crate::services::vault_service::fakes::FakeStore;
    use futures::executor::block_on;

    struct Canned(Result<String, VaultError>);

    impl TextEnhancer for Canned {
        async fn generate(&self, _prompt: &str) -> Result<String, VaultError> {
            self.0.clone()
        }
    }

    struct Payments(bool);

    impl PaymentProvider for Payments {
        async fn create_price(&self, _spec: &PriceSpec) -> Result<String, VaultError> {
            if self.0 {
                Ok("price_1".into())
            } else {
                Err(VaultError::HttpError("down".into()))
            }
        }

        async fn create_checkout_session(&self, _spec: &CheckoutSpec) -> Result<CheckoutSession, VaultError> {
            Ok(CheckoutSession { id: "cs".into(), url: "https://pay.test/cs".into() })
        }
    }

    fn not_configured<T>(what: &str) -> Result<T, VaultError> {
        Err(VaultError::NotConfigured(what.into()))
    }

    #[test]
    fn resolves_routes_and_statuses() {
        assert_eq!(resolve("POST", "/api/enhance"), Ok(Route::Enhance));
        assert_eq!(resolve("post", "/api/ipfs?x=1"), Ok(Route::Ipfs));
        assert_eq!(resolve("POST", "/api/checkout/"), Ok(Route::Checkout));
        assert_eq!(resolve("GET", "/api/ipfs"), Err(405));
        assert_eq!(resolve("POST", "/api/unknown"), Err(404));
    }

    #[test]
    fn query_requests_upgrade_for_known_routes() {
        let req = HttpGatewayRequest {
            method: "POST".into(),
            url: "/api/enhance".into(),
            headers: vec![],
            body: vec![],
            certificate_version: None,
        };
        assert_eq!(route_query(&req).upgrade, Some(true));
        let missing = HttpGatewayRequest { url: "/nope".into(), ..req };
        assert_eq!(route_query(&missing).status_code, 404);
    }

    #[test]
    fn enhance_route_statuses() {
        let ok = block_on(handle_enhance(Ok(Canned(Ok("\"Better\"".into()))), br#"{"content":"hi"}"#));
        assert_eq!(ok.status_code, 200);
        assert_eq!(ok.body_json(), json!({ "success": true, "enhanced": "Better" }));

        let missing = block_on(handle_enhance(Ok(Canned(Ok("x".into()))), br#"{"content":""}"#));
        assert_eq!(missing.status_code, 400);
        assert_eq!(missing.body_json()["error"], "Content is required");

        let unconfigured = block_on(handle_enhance(not_configured::<Canned>("AI"), br#"{"content":"hi"}"#));
        assert_eq!(unconfigured.status_code, 500);
        assert_eq!(unconfigured.body_json()["error"], "AI service not configured");

        let failing = block_on(handle_enhance(Ok(Canned(Err(VaultError::HttpError("t".into())))), br#"{"content":"hi"}"#));
        assert_eq!(failing.status_code, 500);
        assert_eq!(failing.body_json()["error"], "Failed to enhance content");
    }

    #[test]
    fn missing_content_wins_over_missing_config() {
        let resp = block_on(handle_ipfs(not_configured::<FakeStore>("IPFS"), br#"{}"#));
        assert_eq!(resp.status_code, 400);
    }

    #[test]
    fn ipfs_route_statuses() {
        let ok = block_on(handle_ipfs(Ok(FakeStore::default()), br#"{"content":{"title":"t","type":"0"}}"#));
        assert_eq!(ok.status_code, 200);
        let body = ok.body_json();
        assert_eq!(body["success"], true);
        assert_eq!(body["ipfsHash"], "bafy0");
        assert_eq!(body["gateway"], "https://gw.test/ipfs/bafy0");

        let unconfigured = block_on(handle_ipfs(not_configured::<FakeStore>("IPFS"), br#"{"content":"x"}"#));
        assert_eq!(unconfigured.status_code, 500);
        assert_eq!(unconfigured.body_json()["error"], "IPFS service not configured");

        let rejecting = FakeStore { fail_pin: true, ..Default::default() };
        let rejected = block_on(handle_ipfs(Ok(rejecting), br#"{"content":"x"}"#));
        assert_eq!(rejected.status_code, 401);
        assert_eq!(rejected.body_json()["error"], "Failed to upload to IPFS");
        assert_eq!(rejected.body_json()["details"], "bad jwt");

        let garbage = block_on(handle_ipfs(Ok(FakeStore::default()), b"not json"));
        assert_eq!(garbage.status_code, 500);
        assert_eq!(garbage.body_json()["error"], "Internal server error during IPFS upload");
    }

    #[test]
    fn checkout_route_statuses() {
        let ok = block_on(handle_checkout(Ok(Payments(true)), "http://localhost:3000"));
        assert_eq!(ok.status_code, 200);
        assert_eq!(ok.body_json(), json!({ "url": "https://pay.test/cs" }));

        let failed = block_on(handle_checkout(Ok(Payments(false)), "http://localhost:3000"));
        assert_eq!(failed.status_code, 500);
        assert_eq!(failed.body_json(), json!({ "error": "Failed to create checkout session" }));

        let unconfigured = block_on(handle_checkout(not_configured::<Payments>("Stripe"), "x"));
        assert_eq!(unconfigured.status_code, 500);
    }

    #[test]
    fn dispatch_rate_limits_callers() {
        let req = HttpGatewayRequest {
            method: "POST".into(),
            url: "/api/enhance".into(),
            headers: vec![],
            body: br#"{"content":"hi"}"#.to_vec(),
            certificate_version: None,
        };
        let caller = Principal::from_slice(&[9; 29]);
        let mut last = 0;
        for _ in 0..20 {
            last = block_on(dispatch(Route::Enhance, &req, caller, 0)).status_code;
        }
        assert_eq!(last, 429);
    }

    #[test]
    fn gateway_clients_do_not_throttle_each_other() {
        let req = HttpGatewayRequest {
            method: "POST".into(),
            url: "/api/enhance".into(),
            headers: vec![],
            body: br#"{"content":"hi"}"#.to_vec(),
            certificate_version: None,
        };
        for _ in 0..10 {
            block_on(dispatch(Route::Enhance, &req, Principal::anonymous(), 0));
        }
        let next = block_on(dispatch(Route::Enhance, &req, Principal::anonymous(), 1_000_000_000));
        assert_ne!(next.status_code, 429);
    }
}
