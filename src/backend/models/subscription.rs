use crate::models::common::{SubscriptionTier, TimestampMs, TxId};
use candid::CandidType;
use serde::{Deserialize, Serialize};

pub const SUBSCRIPTION_PERIOD_MS: u64 = 30 * 24 * 60 * 60 * 1_000;

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct Subscription {
    pub tier: SubscriptionTier,
    pub start_time: TimestampMs,
    pub end_time: TimestampMs,
    pub vaults_used: u32,
    pub is_active: bool,
    pub tx_id: Option<TxId>,
}

impl Subscription {
    pub fn pro(now: TimestampMs, tx_id: TxId, vaults_used: u32) -> Self {
        Self {
            tier: SubscriptionTier::Pro,
            start_time: now,
            end_time: now.saturating_add(SUBSCRIPTION_PERIOD_MS),
            vaults_used,
            is_active: true,
            tx_id: Some(tx_id),
        }
    }

    /// Paid tiers lapse back to free once `end_time` passes.
    pub fn as_of(mut self, now: TimestampMs) -> Self {
        if self.tier != SubscriptionTier::Free && now > self.end_time {
            self.is_active = false;
        }
        self
    }
}

/// Response of the checkout route: where to send the browser.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}
