// src/backend/adapter/pinata_adapter.rs
use crate::adapter::http_outcall::{send, OutcallRequest};
use crate::error::VaultError;
use crate::models::config::AppConfig;
use crate::services::ports::{ContentStore, PinResult};
use crate::utils::crypto::idempotency_key;
use crate::utils::time::get_current_time_ms;
use serde::Deserialize;
use serde_json::json;

const PIN_JSON_URL: &str = "https://api.pinata.cloud/pinning/pinJSONToIPFS";
const APP_TAG: &str = "TimeVault";
const MAX_PAYLOAD_RESPONSE_BYTES: u64 = 1024 * 1024 * 2; // 2MiB, the outcall ceiling

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct PinataPinResponse {
    ipfs_hash: String,
    pin_size: u64,
}

/// Replies differ between the first pin and its duplicates; only these
/// keys are stable.
const PIN_RESPONSE_KEYS: &[&str] = &["IpfsHash", "PinSize"];

/// Pins through the Pinata API, reads back through the configured gateway.
pub struct PinataStore {
    jwt: String,
    gateway: String,
}

impl PinataStore {
    pub fn from_config(config: &AppConfig) -> Result<Self, VaultError> {
        let jwt = config
            .pinata_jwt
            .clone()
            .ok_or_else(|| VaultError::NotConfigured("IPFS service not configured".to_string()))?;
        Ok(Self {
            jwt,
            gateway: config.pinata_gateway.clone(),
        })
    }
}

/// Request body for `pinJSONToIPFS`.
pub fn pin_request_body(content: &serde_json::Value, kind: &str, now_ms: u64) -> serde_json::Value {
    json!({
        "pinataContent": content,
        "pinataMetadata": {
            "name": format!("timevault_{}", now_ms),
            "keyvalues": {
                "app": APP_TAG,
                "type": kind,
            }
        },
        "pinataOptions": {
            "cidVersion": 1
        }
    })
}

pub fn gateway_link(gateway: &str, cid: &str) -> String {
    if gateway.ends_with('/') {
        format!("{}{}", gateway, cid)
    } else {
        format!("{}/{}", gateway, cid)
    }
}

impl ContentStore for PinataStore {
    async fn pin_json(&self, content: &serde_json::Value, kind: &str) -> Result<PinResult, VaultError> {
        let now_ms = get_current_time_ms();
        let body = serde_json::to_vec(&pin_request_body(content, kind, now_ms))
            .map_err(|e| VaultError::SerializationError(format!("Failed to serialize pin request: {}", e)))?;

        let request = OutcallRequest::post(PIN_JSON_URL, "application/json", body)
            .header("Authorization", format!("Bearer {}", self.jwt))
            .header("Idempotency-Key", idempotency_key(&["pin", &now_ms.to_string()]))
            .keep_keys(PIN_RESPONSE_KEYS);

        let response = send(request).await?.ensure_success("Pinata")?;
        let pinned: PinataPinResponse = response.json("Pinata")?;
        log_info!("Pinned {} ({} bytes)", pinned.ipfs_hash, pinned.pin_size);
        Ok(PinResult {
            ipfs_hash: pinned.ipfs_hash,
            pin_size: pinned.pin_size,
            timestamp: now_ms.to_string(),
        })
    }

    async fn fetch(&self, cid: &str) -> Result<Vec<u8>, VaultError> {
        let request = OutcallRequest::get(gateway_link(&self.gateway, cid))
            .max_response_bytes(MAX_PAYLOAD_RESPONSE_BYTES);
        let response = send(request).await?.ensure_success("IPFS gateway")?;
        Ok(response.body)
    }

    fn gateway_url(&self, cid: &str) -> String {
        gateway_link(&self.gateway, cid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pin_body_matches_pinata_layout() {
        let body = pin_request_body(&json!({"title": "t"}), "0", 1234);
        assert_eq!(body["pinataContent"]["title"], "t");
        assert_eq!(body["pinataMetadata"]["name"], "timevault_1234");
        assert_eq!(body["pinataMetadata"]["keyvalues"]["app"], "TimeVault");
        assert_eq!(body["pinataMetadata"]["keyvalues"]["type"], "0");
        assert_eq!(body["pinataOptions"]["cidVersion"], 1);
    }

    #[test]
    fn gateway_link_handles_trailing_slash() {
        assert_eq!(
            gateway_link("https://gateway.pinata.cloud/ipfs/", "bafy"),
            "https://gateway.pinata.cloud/ipfs/bafy"
        );
        assert_eq!(gateway_link("https://g.io/ipfs", "bafy"), "https://g.io/ipfs/bafy");
    }

    #[test]
    fn missing_jwt_is_not_configured() {
        let err = PinataStore::from_config(&AppConfig::default()).err().unwrap();
        assert_eq!(err, VaultError::NotConfigured("IPFS service not configured".into()));
    }

    #[test]
    fn parses_filtered_pin_response() {
        let parsed: PinataPinResponse =
            serde_json::from_str(r#"{"IpfsHash":"bafy","PinSize":42}"#).unwrap();
        assert_eq!(parsed.ipfs_hash, "bafy");
        assert_eq!(parsed.pin_size, 42);
    }
}
