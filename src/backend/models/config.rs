// src/backend/models/config.rs
use crate::models::init::InitArgs;
use candid::{CandidType, Principal};
use serde::{Deserialize, Serialize};

pub const DEFAULT_VAULT_PROGRAM_ID: &str = "timevault_main_9482.aleo";
pub const DEFAULT_SUBSCRIPTION_PROGRAM_ID: &str = "timevault_subscription_9483.aleo";
pub const DEFAULT_RPC_URL: &str = "https://api.explorer.provable.com/v2";
pub const DEFAULT_NETWORK: &str = "testnet";
pub const DEFAULT_PINATA_GATEWAY: &str = "https://gateway.pinata.cloud/ipfs/";
pub const DEFAULT_APP_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_MODEL_NAME: &str = "gemini-1.5-flash";
pub const DEFAULT_MIN_CYCLES_THRESHOLD: u128 = 10_000_000_000; // 10B cycles

/// Runtime configuration. Secrets never leave the canister; see `PublicConfig`.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub admin_principal: Principal,
    pub min_cycles_threshold: u128,
    pub stripe_secret_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub model_name: Option<String>,
    pub pinata_jwt: Option<String>,
    pub pinata_gateway: String,
    pub vault_program_id: String,
    pub subscription_program_id: String,
    pub rpc_url: String,
    pub network: String,
    pub wallet_relay_url: Option<String>,
    pub app_origin: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            admin_principal: Principal::management_canister(),
            min_cycles_threshold: DEFAULT_MIN_CYCLES_THRESHOLD,
            stripe_secret_key: None,
            gemini_api_key: None,
            model_name: None,
            pinata_jwt: None,
            pinata_gateway: DEFAULT_PINATA_GATEWAY.to_string(),
            vault_program_id: DEFAULT_VAULT_PROGRAM_ID.to_string(),
            subscription_program_id: DEFAULT_SUBSCRIPTION_PROGRAM_ID.to_string(),
            rpc_url: DEFAULT_RPC_URL.to_string(),
            network: DEFAULT_NETWORK.to_string(),
            wallet_relay_url: None,
            app_origin: DEFAULT_APP_ORIGIN.to_string(),
        }
    }
}

/// Blank strings count as unset.
fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl AppConfig {
    /// Overlays the set fields of `args`; unset fields keep their current value.
    pub fn merged(mut self, args: InitArgs) -> Self {
        if let Some(admin) = args.admin_principal {
            self.admin_principal = admin;
        }
        if let Some(threshold) = args.min_cycles_threshold {
            self.min_cycles_threshold = threshold;
        }
        if let Some(key) = non_empty(args.stripe_secret_key) {
            self.stripe_secret_key = Some(key);
        }
        if let Some(key) = non_empty(args.gemini_api_key) {
            self.gemini_api_key = Some(key);
        }
        if let Some(model) = non_empty(args.model_name) {
            self.model_name = Some(model);
        }
        if let Some(jwt) = non_empty(args.pinata_jwt) {
            self.pinata_jwt = Some(jwt);
        }
        if let Some(gateway) = non_empty(args.pinata_gateway) {
            self.pinata_gateway = gateway;
        }
        if let Some(program) = non_empty(args.vault_program_id) {
            self.vault_program_id = program;
        }
        if let Some(program) = non_empty(args.subscription_program_id) {
            self.subscription_program_id = program;
        }
        if let Some(url) = non_empty(args.rpc_url) {
            self.rpc_url = url;
        }
        if let Some(network) = non_empty(args.network) {
            self.network = network;
        }
        if let Some(url) = non_empty(args.wallet_relay_url) {
            self.wallet_relay_url = Some(url);
        }
        if let Some(origin) = non_empty(args.app_origin) {
            self.app_origin = origin;
        }
        self
    }

    /// Model used for enhancement. Anything that is not a Gemini model name
    /// falls back to the default.
    pub fn effective_model(&self) -> String {
        match &self.model_name {
            Some(name) if name.contains("gemini") => name.clone(),
            _ => DEFAULT_MODEL_NAME.to_string(),
        }
    }

    pub fn public_view(&self) -> PublicConfig {
        PublicConfig {
            vault_program_id: self.vault_program_id.clone(),
            subscription_program_id: self.subscription_program_id.clone(),
            rpc_url: self.rpc_url.clone(),
            network: self.network.clone(),
            pinata_gateway: self.pinata_gateway.clone(),
            app_origin: self.app_origin.clone(),
            payments_enabled: self.stripe_secret_key.is_some(),
            enhance_enabled: self.gemini_api_key.is_some(),
            pinning_enabled: self.pinata_jwt.is_some(),
            chain_enabled: self.wallet_relay_url.is_some(),
        }
    }
}

/// What the frontend may see of the configuration.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct PublicConfig {
    pub vault_program_id: String,
    pub subscription_program_id: String,
    pub rpc_url: String,
    pub network: String,
    pub pinata_gateway: String,
    pub app_origin: String,
    pub payments_enabled: bool,
    pub enhance_enabled: bool,
    pub pinning_enabled: bool,
    pub chain_enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_unset_fields() {
        let base = AppConfig {
            pinata_jwt: Some("jwt".into()),
            ..Default::default()
        };
        let merged = base.merged(InitArgs {
            network: Some("mainnet".into()),
            pinata_jwt: Some("   ".into()),
            ..Default::default()
        });
        assert_eq!(merged.network, "mainnet");
        assert_eq!(merged.pinata_jwt.as_deref(), Some("jwt"));
        assert_eq!(merged.vault_program_id, DEFAULT_VAULT_PROGRAM_ID);
    }

    #[test]
    fn non_gemini_model_falls_back() {
        let mut config = AppConfig::default();
        assert_eq!(config.effective_model(), DEFAULT_MODEL_NAME);
        config.model_name = Some("gpt-4".into());
        assert_eq!(config.effective_model(), DEFAULT_MODEL_NAME);
        config.model_name = Some("gemini-2.0-flash".into());
        assert_eq!(config.effective_model(), "gemini-2.0-flash");
    }

    #[test]
    fn public_view_hides_secrets() {
        let config = AppConfig {
            stripe_secret_key: Some("sk_test".into()),
            ..Default::default()
        };
        let view = config.public_view();
        assert!(view.payments_enabled);
        assert!(!view.enhance_enabled);
        assert_eq!(view.network, DEFAULT_NETWORK);
    }
}
