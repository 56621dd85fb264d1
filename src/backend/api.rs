// src/backend/api.rs
// Candid endpoints. Each one validates, resolves the caller's session and
// hands off to a service with the canister's adapters plugged in.

use crate::{
    adapter::{
        aleo_relay_adapter::AleoRelayGateway, gemini_adapter::GeminiEnhancer,
        pinata_adapter::PinataStore, presented_wallet::PresentedWallet,
        stripe_adapter::StripeGateway,
    },
    error::VaultError,
    metrics::{self, MetricsReport},
    models::{
        common::{UnlockType, VaultId, VaultType},
        config::PublicConfig,
        init::InitArgs,
        session::WalletSession,
        subscription::{CheckoutSession, Subscription},
        vault::{VaultCategories, VaultView},
    },
    services::{
        enhance_service, payment_service, session_service,
        vault_service::{self, NewVaultData, PinReceipt, UnlockedVault},
    },
    storage,
    utils::{
        cipher::SealedCipher,
        format::is_aleo_address,
        guards::{admin_guard, check_cycles},
        rate_limit::check_rate,
        time::{get_current_time_ms, get_current_time_ns},
    },
};
use candid::{CandidType, Principal};
use ic_cdk_macros::{query, update};
use serde::Deserialize;
use validator::{Validate, ValidationError};

// --- Validation Helpers ---

fn validate_request<T: Validate>(req: &T) -> Result<(), VaultError> {
    req.validate().map_err(|e| VaultError::InvalidInput(e.to_string()))
}

fn validate_aleo_address(address: &str) -> Result<(), ValidationError> {
    if is_aleo_address(address) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_aleo_address"))
    }
}

fn validate_optional_recipient(recipient: &Option<String>) -> Result<(), VaultError> {
    match recipient.as_deref().map(str::trim) {
        Some(r) if !r.is_empty() && !is_aleo_address(r) => Err(VaultError::InvalidInput(format!(
            "Recipient is not an Aleo address: {}",
            r
        ))),
        _ => Ok(()),
    }
}

// --- Caller Helpers ---

/// Sessions are keyed by principal, so anonymous callers get none.
fn authenticated_caller() -> Result<Principal, VaultError> {
    let caller = ic_cdk::caller();
    if caller == Principal::anonymous() {
        Err(VaultError::NotAuthorized("Anonymous principal cannot hold a wallet session.".to_string()))
    } else {
        Ok(caller)
    }
}

fn caller_session(now: u64) -> Result<WalletSession, VaultError> {
    Ok(session_service::current_session(&authenticated_caller()?, now))
}

fn rate_limited_caller() -> Result<Principal, VaultError> {
    let caller = authenticated_caller()?;
    check_rate(caller, get_current_time_ns())?;
    Ok(caller)
}

fn sealed_cipher() -> Result<SealedCipher, VaultError> {
    Ok(SealedCipher::new(storage::config::ensure_master_secret()?))
}

// --- Request Structs ---

#[derive(CandidType, Deserialize, Clone, Debug, Validate)]
pub struct ConnectWalletRequest {
    #[validate(custom(function = "validate_aleo_address"))]
    pub address: String,
    #[validate(length(min = 1, max = 32))]
    pub network: String,
    /// Signature over the auth message; absent when the user declined.
    #[validate(length(max = 2048))]
    pub signature: Option<String>,
}

#[derive(CandidType, Deserialize, Clone, Debug, Validate)]
pub struct CreateVaultRequest {
    #[validate(length(max = 100))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 100000))]
    pub content: String,
    pub recipient: Option<String>,
    #[validate(range(min = 1))]
    pub unlock_time: u64, // ms since epoch
    pub unlock_type: UnlockType,
    pub vault_type: VaultType,
}

#[derive(CandidType, Deserialize, Clone, Debug, Validate)]
pub struct UnlockVaultRequest {
    #[validate(length(min = 1, max = 64))]
    pub vault_id: VaultId,
    pub on_chain_vault_id: Option<u64>,
}

#[derive(CandidType, Deserialize, Clone, Debug, Validate)]
pub struct SetOnChainIdRequest {
    #[validate(length(min = 1, max = 64))]
    pub vault_id: VaultId,
    pub on_chain_vault_id: u64,
}

#[derive(CandidType, Deserialize, Clone, Debug, Validate)]
pub struct EnhanceRequest {
    #[validate(length(min = 1, max = 10000))]
    pub content: String,
}

#[derive(CandidType, Deserialize, Clone, Debug, Validate)]
pub struct PinContentRequest {
    /// JSON text; anything that does not parse is pinned as a string.
    #[validate(length(min = 1, max = 100000))]
    pub content: String,
}

// --- Wallet Session ---

#[update]
async fn connect_wallet(req: ConnectWalletRequest) -> Result<WalletSession, VaultError> {
    validate_request(&req)?;
    let caller = authenticated_caller()?;
    let now = get_current_time_ms();
    let wallet = PresentedWallet {
        address: req.address,
        network: req.network,
        signature: req.signature,
    };
    let session = if wallet.signature.is_some() {
        session_service::connect_for(&caller, &wallet, now).await
    } else {
        session_service::restore_for(&caller, &wallet, now).await
    };
    Ok(session)
}

#[update]
fn disconnect_wallet() -> Result<WalletSession, VaultError> {
    let caller = authenticated_caller()?;
    Ok(session_service::disconnect_for(&caller, get_current_time_ms()))
}

#[query]
fn get_session() -> Result<WalletSession, VaultError> {
    caller_session(get_current_time_ms())
}

// --- Vaults ---

#[update]
async fn create_vault(req: CreateVaultRequest) -> Result<VaultView, VaultError> {
    check_cycles()?;
    validate_request(&req)?;
    validate_optional_recipient(&req.recipient)?;
    rate_limited_caller()?;
    let now = get_current_time_ms();
    let session = caller_session(now)?;
    let config = storage::config::get_config();
    let store = PinataStore::from_config(&config)?;
    let chain = AleoRelayGateway::from_config(&config);
    let cipher = sealed_cipher()?;

    let data = NewVaultData {
        title: req.title,
        content: req.content,
        recipient: req.recipient,
        unlock_time: req.unlock_time,
        unlock_type: req.unlock_type,
        vault_type: req.vault_type,
    };
    vault_service::create_vault(&store, &chain, &cipher, &config, &session, data, now).await
}

#[query]
fn get_vault(vault_id: VaultId) -> Result<VaultView, VaultError> {
    let now = get_current_time_ms();
    vault_service::get_vault(&caller_session(now)?, &vault_id, now)
}

#[query]
fn list_my_vaults() -> Result<VaultCategories, VaultError> {
    let now = get_current_time_ms();
    vault_service::list_my_vaults(&caller_session(now)?, now)
}

#[update]
async fn unlock_vault(req: UnlockVaultRequest) -> Result<UnlockedVault, VaultError> {
    check_cycles()?;
    validate_request(&req)?;
    rate_limited_caller()?;
    let now = get_current_time_ms();
    let session = caller_session(now)?;
    let config = storage::config::get_config();
    let store = PinataStore::from_config(&config)?;
    let chain = AleoRelayGateway::from_config(&config);
    let cipher = sealed_cipher()?;
    vault_service::unlock_vault(
        &store,
        &chain,
        &cipher,
        &config,
        &session,
        &req.vault_id,
        req.on_chain_vault_id,
        now,
    )
    .await
}

#[update]
async fn get_vault_content(vault_id: VaultId) -> Result<String, VaultError> {
    check_cycles()?;
    rate_limited_caller()?;
    let now = get_current_time_ms();
    let session = caller_session(now)?;
    let config = storage::config::get_config();
    let store = PinataStore::from_config(&config)?;
    let cipher = sealed_cipher()?;
    vault_service::get_vault_content(&store, &cipher, &session, &vault_id, now).await
}

#[update]
fn set_on_chain_vault_id(req: SetOnChainIdRequest) -> Result<VaultView, VaultError> {
    validate_request(&req)?;
    let now = get_current_time_ms();
    vault_service::set_on_chain_vault_id(&caller_session(now)?, &req.vault_id, req.on_chain_vault_id, now)
}

// --- Subscription ---

#[update]
async fn create_checkout(origin: Option<String>) -> Result<CheckoutSession, VaultError> {
    check_cycles()?;
    rate_limited_caller()?;
    let config = storage::config::get_config();
    let provider = StripeGateway::from_config(&config)?;
    let origin = origin
        .filter(|o| !o.trim().is_empty())
        .unwrap_or_else(|| config.app_origin.clone());
    payment_service::create_checkout(&provider, &origin).await
}

#[update]
async fn activate_subscription() -> Result<Subscription, VaultError> {
    check_cycles()?;
    rate_limited_caller()?;
    let now = get_current_time_ms();
    let session = caller_session(now)?;
    let config = storage::config::get_config();
    let chain = AleoRelayGateway::from_config(&config);
    payment_service::activate_subscription(&chain, &config, &session, now).await
}

#[query]
fn get_subscription() -> Result<Subscription, VaultError> {
    let now = get_current_time_ms();
    payment_service::get_subscription(&caller_session(now)?, now)
}

// --- Content Helpers ---

#[update]
async fn enhance_content(req: EnhanceRequest) -> Result<String, VaultError> {
    check_cycles()?;
    validate_request(&req)?;
    rate_limited_caller()?;
    let enhancer = GeminiEnhancer::from_config(&storage::config::get_config())?;
    enhance_service::enhance(&enhancer, &req.content).await
}

#[update]
async fn pin_content(req: PinContentRequest) -> Result<PinReceipt, VaultError> {
    check_cycles()?;
    validate_request(&req)?;
    rate_limited_caller()?;
    let store = PinataStore::from_config(&storage::config::get_config())?;
    let content = serde_json::from_str(&req.content)
        .unwrap_or_else(|_| serde_json::Value::String(req.content.clone()));
    vault_service::pin_content(&store, &content).await
}

// --- Configuration & Admin ---

#[query]
fn get_public_config() -> PublicConfig {
    storage::config::get_config().public_view()
}

#[update(guard = "admin_guard")]
fn update_config(args: InitArgs) -> Result<PublicConfig, VaultError> {
    storage::config::init_config(args)?;
    Ok(storage::config::get_config().public_view())
}

#[query(guard = "admin_guard")]
fn get_metrics() -> Result<MetricsReport, VaultError> {
    metrics::get_metrics_report()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "aleo1qnr4dkkvkgfqph0vzc3y6z2eu975wnpz2925ntjccd5cfqxtyu8s7pyjh9";

    #[test]
    fn connect_request_requires_aleo_address() {
        let ok = ConnectWalletRequest { address: ADDR.into(), network: "testnet".into(), signature: None };
        assert!(validate_request(&ok).is_ok());
        let bad = ConnectWalletRequest { address: "0x1234".into(), ..ok };
        assert!(matches!(validate_request(&bad), Err(VaultError::InvalidInput(_))));
    }

    #[test]
    fn create_request_bounds() {
        let req = CreateVaultRequest {
            title: Some("t".repeat(101)),
            content: "hi".into(),
            recipient: None,
            unlock_time: 1,
            unlock_type: UnlockType::DateTime,
            vault_type: VaultType::Message,
        };
        assert!(validate_request(&req).is_err());
        let req = CreateVaultRequest { title: None, content: String::new(), ..req };
        assert!(validate_request(&req).is_err());
        let req = CreateVaultRequest { content: "hi".into(), unlock_time: 0, ..req };
        assert!(validate_request(&req).is_err());
    }

    #[test]
    fn recipient_must_look_like_an_address() {
        assert!(validate_optional_recipient(&None).is_ok());
        assert!(validate_optional_recipient(&Some(" ".into())).is_ok());
        assert!(validate_optional_recipient(&Some(ADDR.into())).is_ok());
        assert!(validate_optional_recipient(&Some("bob".into())).is_err());
    }
}
