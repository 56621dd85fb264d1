// src/backend/lib.rs

#[macro_use]
pub mod utils;

pub mod adapter;
pub mod api;
pub mod error;
pub mod http;
pub mod metrics;
pub mod models;
pub mod services;
pub mod storage;

use crate::api::*;
use crate::error::VaultError;
use crate::http::{HttpGatewayRequest, HttpGatewayResponse};
use crate::metrics::MetricsReport;
use crate::models::common::VaultId;
use crate::models::config::PublicConfig;
use crate::models::init::InitArgs;
use crate::models::session::WalletSession;
use crate::models::subscription::{CheckoutSession, Subscription};
use crate::models::vault::{VaultCategories, VaultView};
use crate::services::vault_service::{PinReceipt, UnlockedVault};
use ic_cdk::api::management_canister::http_request::{
    HttpResponse as CanisterHttpResponse, TransformArgs,
};

fn apply_init_args(args: Option<InitArgs>) {
    let args = args.unwrap_or_default();
    if let Err(e) = storage::config::init_config(args) {
        log_error!("Failed to apply init args: {}", e);
    }
    services::scheduler::start();
}

#[ic_cdk::init]
fn init(args: Option<InitArgs>) {
    apply_init_args(args);
    log_info!("TimeVault backend canister initialized.");
}

#[ic_cdk::post_upgrade]
fn post_upgrade(args: Option<InitArgs>) {
    apply_init_args(args);
    log_info!("TimeVault backend canister upgraded.");
}

// Export Candid interface
ic_cdk::export_candid!();
