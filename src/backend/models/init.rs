use candid::{CandidType, Principal};
use serde::Deserialize;

/// Install/upgrade arguments. Unset fields keep their current (or default) values.
#[derive(CandidType, Deserialize, Debug, Clone, Default)]
pub struct InitArgs {
    pub admin_principal: Option<Principal>,
    pub min_cycles_threshold: Option<u128>,
    pub stripe_secret_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub model_name: Option<String>,
    pub pinata_jwt: Option<String>,
    pub pinata_gateway: Option<String>,
    pub vault_program_id: Option<String>,
    pub subscription_program_id: Option<String>,
    pub rpc_url: Option<String>,
    pub network: Option<String>,
    pub wallet_relay_url: Option<String>,
    pub app_origin: Option<String>,
}
