// src/backend/metrics.rs
use crate::error::VaultError;
use crate::models::common::TimestampMs;
use crate::storage::config::get_config;
use crate::storage::metrics::{get_metrics, update_metrics};
use crate::storage::sessions::{is_wallet_available, last_availability_check};
use crate::storage::vaults::count_vaults;
use candid::CandidType;
use serde::{Deserialize, Serialize};

/// Operational counters. Stored in a stable cell, reported to the admin.
#[derive(CandidType, Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct VaultMetrics {
    pub vaults_created: u64,
    pub vaults_unlocked: u64,
    pub unlock_rejected_locked: u64,
    pub content_unavailable_after_unlock: u64,
    pub pins_total: u64,
    pub pinned_bytes_total: u64,
    pub enhancements_total: u64,
    pub checkouts_total: u64,
    pub subscriptions_activated: u64,
    pub upstream_failures_total: u64,
    pub availability_checks_total: u64,
}

/// Snapshot returned by `get_metrics`.
#[derive(CandidType, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct MetricsReport {
    pub counters: VaultMetrics,
    pub stored_vaults: u64,
    pub wallet_available: bool,
    pub last_availability_check: Option<TimestampMs>,
    pub network: String,
    pub cycle_balance: u128,
}

fn bump<F>(update_fn: F)
where
    F: FnOnce(&mut VaultMetrics),
{
    // Counters never fail a user flow.
    if let Err(e) = update_metrics(update_fn) {
        log_warn!("Metrics update failed: {}", e);
    }
}

pub fn record_vault_created() {
    bump(|m| m.vaults_created = m.vaults_created.saturating_add(1));
}

pub fn record_vault_unlocked() {
    bump(|m| m.vaults_unlocked = m.vaults_unlocked.saturating_add(1));
}

pub fn record_unlock_rejected_locked() {
    bump(|m| m.unlock_rejected_locked = m.unlock_rejected_locked.saturating_add(1));
}

pub fn record_content_unavailable() {
    bump(|m| {
        m.content_unavailable_after_unlock = m.content_unavailable_after_unlock.saturating_add(1)
    });
}

pub fn record_pin(size: u64) {
    bump(|m| {
        m.pins_total = m.pins_total.saturating_add(1);
        m.pinned_bytes_total = m.pinned_bytes_total.saturating_add(size);
    });
}

pub fn record_enhancement() {
    bump(|m| m.enhancements_total = m.enhancements_total.saturating_add(1));
}

pub fn record_checkout() {
    bump(|m| m.checkouts_total = m.checkouts_total.saturating_add(1));
}

pub fn record_subscription_activated() {
    bump(|m| m.subscriptions_activated = m.subscriptions_activated.saturating_add(1));
}

pub fn record_upstream_failure() {
    bump(|m| m.upstream_failures_total = m.upstream_failures_total.saturating_add(1));
}

pub fn record_availability_check() {
    bump(|m| m.availability_checks_total = m.availability_checks_total.saturating_add(1));
}

pub fn get_metrics_report() -> Result<MetricsReport, VaultError> {
    Ok(MetricsReport {
        counters: get_metrics(),
        stored_vaults: count_vaults(),
        wallet_available: is_wallet_available(),
        last_availability_check: last_availability_check(),
        network: get_config().network,
        cycle_balance: cycle_balance(),
    })
}

#[cfg(target_arch = "wasm32")]
fn cycle_balance() -> u128 {
    ic_cdk::api::canister_balance128()
}

#[cfg(not(target_arch = "wasm32"))]
fn cycle_balance() -> u128 {
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        record_vault_created();
        record_vault_created();
        record_pin(120);
        record_pin(30);
        let report = get_metrics_report().unwrap();
        assert_eq!(report.counters.vaults_created, 2);
        assert_eq!(report.counters.pins_total, 2);
        assert_eq!(report.counters.pinned_bytes_total, 150);
        assert_eq!(report.stored_vaults, 0);
    }
}
