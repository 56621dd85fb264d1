// src/backend/adapter/aleo_relay_adapter.rs
use crate::adapter::aleo_program::ProgramCall;
use crate::adapter::http_outcall::{send, OutcallRequest, OutcallResponse};
use crate::error::VaultError;
use crate::models::common::TxId;
use crate::models::config::AppConfig;
use crate::services::ports::ChainGateway;
use crate::utils::crypto::idempotency_key;
use crate::utils::time::get_current_time_ms;
use serde::Deserialize;

const EXECUTE_PATH: &str = "/execute";
const PROBE_MAX_RESPONSE_BYTES: u64 = 256;

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct RelayResponse {
    #[serde(default)]
    event_id: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Executes program calls through the wallet relay; probes the public RPC
/// for availability.
pub struct AleoRelayGateway {
    relay_url: Option<String>,
    rpc_url: String,
    network: String,
}

impl AleoRelayGateway {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            relay_url: config.wallet_relay_url.clone(),
            rpc_url: config.rpc_url.trim_end_matches('/').to_string(),
            network: config.network.clone(),
        }
    }

    fn latest_height_url(&self) -> String {
        format!("{}/{}/block/height/latest", self.rpc_url, self.network)
    }
}

/// Relay reply to a transaction id, or the reason it was refused.
fn interpret_relay_response(response: OutcallResponse) -> Result<TxId, VaultError> {
    let parsed: RelayResponse = serde_json::from_slice(&response.body).unwrap_or_default();
    if let Some(reason) = parsed.error {
        return Err(VaultError::WalletRejected(reason));
    }
    let response = response.ensure_success("Wallet relay")?;
    parsed
        .event_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            VaultError::SerializationError(format!("Wallet relay reply has no eventId: {}", response.text()))
        })
}

impl ChainGateway for AleoRelayGateway {
    async fn execute(&self, signer: &str, call: &ProgramCall) -> Result<TxId, VaultError> {
        let relay_url = self
            .relay_url
            .as_ref()
            .ok_or_else(|| VaultError::NotConfigured("Wallet relay not configured".to_string()))?;
        let body = serde_json::to_vec(&call.to_body(signer))
            .map_err(|e| VaultError::SerializationError(format!("Failed to serialize execution: {}", e)))?;
        let key = idempotency_key(&[
            signer,
            &call.program_id,
            &call.function,
            &call.wire_inputs().join(","),
            &get_current_time_ms().to_string(),
        ]);

        log_info!("Submitting {}/{} for {}", call.program_id, call.function, signer);
        let request = OutcallRequest::post(
            format!("{}{}", relay_url.trim_end_matches('/'), EXECUTE_PATH),
            "application/json",
            body,
        )
        .header("Idempotency-Key", key)
        .keep_keys(&["eventId", "error"]);
        let tx_id = interpret_relay_response(send(request).await?)?;
        log_info!("Transaction submitted: {}", tx_id);
        Ok(tx_id)
    }

    async fn is_reachable(&self) -> bool {
        let request = OutcallRequest::get(self.latest_height_url())
            .max_response_bytes(PROBE_MAX_RESPONSE_BYTES)
            .status_only();
        matches!(send(request).await, Ok(response) if response.is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(status: u16, body: &str) -> OutcallResponse {
        OutcallResponse { status, body: body.as_bytes().to_vec() }
    }

    #[test]
    fn event_id_is_the_transaction() {
        assert_eq!(
            interpret_relay_response(reply(200, r#"{"eventId":"at1abc"}"#)).unwrap(),
            "at1abc"
        );
    }

    #[test]
    fn relay_error_is_a_rejection() {
        assert_eq!(
            interpret_relay_response(reply(400, r#"{"error":"User rejected"}"#)).unwrap_err(),
            VaultError::WalletRejected("User rejected".into())
        );
        assert!(matches!(
            interpret_relay_response(reply(502, "bad gateway")),
            Err(VaultError::UpstreamRejected { status: 502, .. })
        ));
        assert!(matches!(
            interpret_relay_response(reply(200, "{}")),
            Err(VaultError::SerializationError(_))
        ));
    }

    #[test]
    fn probe_url_follows_network() {
        let gateway = AleoRelayGateway::from_config(&AppConfig::default());
        assert_eq!(
            gateway.latest_height_url(),
            "https://api.explorer.provable.com/v2/testnet/block/height/latest"
        );
    }
}
