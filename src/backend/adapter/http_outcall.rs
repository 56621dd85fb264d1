// src/backend/adapter/http_outcall.rs
//! Shared plumbing for HTTPS outcalls: request building, cycle budget,
//! status handling and the consensus transform.

use crate::error::VaultError;
use ic_cdk::api::management_canister::http_request::{
    http_request, CanisterHttpRequestArgument, HttpHeader, HttpMethod,
    HttpResponse as CanisterHttpResponse, TransformArgs, TransformContext,
};
use num::ToPrimitive;
use serde::{Deserialize, Serialize};

pub const HTTP_OUTCALL_CYCLES: u128 = 2_000_000_000; // Covers a 13-node subnet at these sizes
pub const DEFAULT_MAX_RESPONSE_BYTES: u64 = 1024 * 64; // 64KiB
pub const TRANSFORM_METHOD: &str = "transform_http_response";

/// How the consensus transform reduces a 2xx body before replicas compare
/// it. Other statuses keep their body so the error details survive.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(tag = "mode", content = "keys", rename_all = "snake_case")]
pub enum BodyFilter {
    #[default]
    Verbatim,
    /// Only these top-level JSON keys survive.
    Keep(Vec<String>),
    /// Only the status matters.
    Discard,
}

#[derive(Clone, Debug)]
pub struct OutcallRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    pub max_response_bytes: u64,
    pub filter: BodyFilter,
}

impl OutcallRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::GET,
            headers: Vec::new(),
            body: None,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            filter: BodyFilter::Verbatim,
        }
    }

    pub fn post(url: impl Into<String>, content_type: &str, body: Vec<u8>) -> Self {
        Self {
            method: HttpMethod::POST,
            body: Some(body),
            ..Self::get(url)
        }
        .header("Content-Type", content_type)
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn max_response_bytes(mut self, bytes: u64) -> Self {
        self.max_response_bytes = bytes;
        self
    }

    pub fn keep_keys(mut self, keys: &[&str]) -> Self {
        self.filter = BodyFilter::Keep(keys.iter().map(|k| k.to_string()).collect());
        self
    }

    pub fn status_only(mut self) -> Self {
        self.filter = BodyFilter::Discard;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutcallResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl OutcallResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Non-2xx becomes `UpstreamRejected` carrying the raw body.
    pub fn ensure_success(self, service: &str) -> Result<Self, VaultError> {
        if self.is_success() {
            Ok(self)
        } else {
            log_warn!("{} returned status {}: {}", service, self.status, self.text());
            Err(VaultError::UpstreamRejected {
                status: self.status,
                details: self.text(),
            })
        }
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self, service: &str) -> Result<T, VaultError> {
        serde_json::from_slice(&self.body).map_err(|e| {
            VaultError::SerializationError(format!("Failed to parse {} response: {}", service, e))
        })
    }
}

/// Performs the outcall. Transport failures map to `HttpError`; any status
/// code is returned as-is.
pub async fn send(request: OutcallRequest) -> Result<OutcallResponse, VaultError> {
    let context = serde_json::to_vec(&request.filter)
        .map_err(|e| VaultError::SerializationError(format!("Failed to encode transform context: {}", e)))?;
    let request_arg = CanisterHttpRequestArgument {
        url: request.url.clone(),
        method: request.method,
        body: request.body,
        max_response_bytes: Some(request.max_response_bytes),
        transform: Some(TransformContext::from_name(TRANSFORM_METHOD.to_string(), context)),
        headers: request
            .headers
            .into_iter()
            .map(|(name, value)| HttpHeader { name, value })
            .collect(),
    };

    match http_request(request_arg, HTTP_OUTCALL_CYCLES).await {
        Ok((response,)) => {
            let status = response.status.0.to_u16().unwrap_or(500);
            log_info!("Outcall {} -> {}", redact_url(&request.url), status);
            Ok(OutcallResponse {
                status,
                body: response.body,
            })
        }
        Err((code, msg)) => {
            log_error!("HTTP outcall to {} failed: {:?} - {}", redact_url(&request.url), code, msg);
            Err(VaultError::HttpError(format!("{:?} - {}", code, msg)))
        }
    }
}

/// Drops the query string, which may carry API keys.
fn redact_url(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

/// Removes headers and applies the request's body filter so every replica
/// sees the same response.
pub fn sanitize_response(response: CanisterHttpResponse, context: &[u8]) -> CanisterHttpResponse {
    let filter: BodyFilter = serde_json::from_slice(context).unwrap_or_default();
    let success = matches!(response.status.0.to_u16(), Some(code) if (200..300).contains(&code));
    let body = match filter {
        _ if !success => response.body,
        BodyFilter::Verbatim => response.body,
        BodyFilter::Discard => Vec::new(),
        BodyFilter::Keep(keys) => match serde_json::from_slice::<serde_json::Value>(&response.body) {
            Ok(serde_json::Value::Object(mut map)) => {
                map.retain(|key, _| keys.contains(key));
                serde_json::to_vec(&serde_json::Value::Object(map)).unwrap_or(response.body)
            }
            _ => response.body,
        },
    };
    CanisterHttpResponse {
        status: response.status,
        headers: Vec::new(),
        body,
    }
}

#[ic_cdk_macros::query]
fn transform_http_response(args: TransformArgs) -> CanisterHttpResponse {
    sanitize_response(args.response, &args.context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use candid::Nat;

    fn response(status: u32, body: &str) -> CanisterHttpResponse {
        CanisterHttpResponse {
            status: Nat::from(status),
            headers: vec![HttpHeader { name: "Date".into(), value: "now".into() }],
            body: body.as_bytes().to_vec(),
        }
    }

    fn keep(keys: &[&str]) -> Vec<u8> {
        serde_json::to_vec(&OutcallRequest::get("https://x.dev").keep_keys(keys).filter).unwrap()
    }

    #[test]
    fn transform_keeps_only_listed_keys() {
        let out = sanitize_response(
            response(200, r#"{"IpfsHash":"bafy","PinSize":10,"Timestamp":"2024-01-01"}"#),
            &keep(&["IpfsHash", "PinSize"]),
        );
        assert!(out.headers.is_empty());
        let json: serde_json::Value = serde_json::from_slice(&out.body).unwrap();
        assert_eq!(json, serde_json::json!({ "IpfsHash": "bafy", "PinSize": 10 }));
    }

    #[test]
    fn replicas_agree_on_first_and_duplicate_pins() {
        let context = keep(&["IpfsHash", "PinSize"]);
        let first = sanitize_response(
            response(200, r#"{"IpfsHash":"bafy","PinSize":10,"Timestamp":"t1"}"#),
            &context,
        );
        let repeat = sanitize_response(
            response(200, r#"{"IpfsHash":"bafy","PinSize":10,"Timestamp":"t2","isDuplicate":true}"#),
            &context,
        );
        assert_eq!(first, repeat);
    }

    #[test]
    fn error_bodies_survive_the_filter() {
        let out = sanitize_response(response(401, r#"{"error":"bad jwt"}"#), &keep(&["IpfsHash"]));
        assert_eq!(out.body, br#"{"error":"bad jwt"}"#.to_vec());
    }

    #[test]
    fn status_only_discards_the_body() {
        let context = serde_json::to_vec(&BodyFilter::Discard).unwrap();
        let a = sanitize_response(response(200, "1234"), &context);
        let b = sanitize_response(response(200, "1235"), &context);
        assert!(a.body.is_empty());
        assert_eq!(a, b);
    }

    #[test]
    fn transform_leaves_non_json_alone() {
        let out = sanitize_response(response(200, "plain text"), &[]);
        assert_eq!(out.body, b"plain text".to_vec());
    }

    #[test]
    fn non_success_becomes_upstream_rejection() {
        let err = OutcallResponse { status: 401, body: b"bad jwt".to_vec() }
            .ensure_success("Pinata")
            .unwrap_err();
        assert_eq!(
            err,
            VaultError::UpstreamRejected { status: 401, details: "bad jwt".into() }
        );
    }

    #[test]
    fn query_string_is_redacted() {
        assert_eq!(redact_url("https://x.dev/a?key=secret"), "https://x.dev/a");
    }
}
