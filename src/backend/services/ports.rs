// src/backend/services/ports.rs
//! Seams between the services and the outside world. Canister builds plug in
//! the HTTP-outcall adapters; tests plug in in-memory fakes.
#![allow(async_fn_in_trait)]

use crate::adapter::aleo_program::ProgramCall;
use crate::error::VaultError;
use crate::models::common::{ContentId, TxId};
use crate::models::session::WalletAccount;
use crate::models::subscription::CheckoutSession;

/// Pinning receipt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PinResult {
    pub ipfs_hash: ContentId,
    pub pin_size: u64,
    pub timestamp: String,
}

/// Content-addressed storage for encrypted payloads.
pub trait ContentStore {
    /// Pins a JSON document. `kind` lands in the pin metadata.
    async fn pin_json(&self, content: &serde_json::Value, kind: &str) -> Result<PinResult, VaultError>;
    async fn fetch(&self, cid: &str) -> Result<Vec<u8>, VaultError>;
    fn gateway_url(&self, cid: &str) -> String;
}

/// Submits Aleo program executions for a signer.
pub trait ChainGateway {
    async fn execute(&self, signer: &str, call: &ProgramCall) -> Result<TxId, VaultError>;
    /// Cheap liveness probe for the session availability poll.
    async fn is_reachable(&self) -> bool;
}

/// The user's wallet, as far as the canister can see it.
pub trait WalletProvider {
    async fn connect(&self) -> Result<WalletAccount, VaultError>;
    /// `WalletRejected` when the user declines to sign.
    async fn sign_message(&self, message: &str) -> Result<String, VaultError>;
    fn is_available(&self) -> bool;
}

/// Free-text generation.
pub trait TextEnhancer {
    async fn generate(&self, prompt: &str) -> Result<String, VaultError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PriceSpec {
    pub unit_amount: u64,
    pub currency: String,
    pub interval: String,
    pub product_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckoutSpec {
    pub price_id: String,
    pub quantity: u32,
    pub success_url: String,
    pub cancel_url: String,
    pub metadata: Vec<(String, String)>,
}

pub trait PaymentProvider {
    /// Returns the new price id.
    async fn create_price(&self, spec: &PriceSpec) -> Result<String, VaultError>;
    async fn create_checkout_session(&self, spec: &CheckoutSpec) -> Result<CheckoutSession, VaultError>;
}
