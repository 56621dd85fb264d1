// src/backend/storage/subscriptions.rs
use crate::error::VaultError;
use crate::models::common::Address;
use crate::models::subscription::Subscription;
use crate::storage::memory::{get_subscriptions_memory, Memory};
use crate::storage::storable::{Cbor, StorableString};
use ic_stable_structures::StableBTreeMap;
use std::cell::RefCell;

type StorableSubscription = Cbor<Subscription>;

thread_local! {
    /// Wallet address -> subscription
    static SUBSCRIPTIONS: RefCell<StableBTreeMap<StorableString, StorableSubscription, Memory>> = RefCell::new(
        StableBTreeMap::init(get_subscriptions_memory())
    );
}

/// Free-tier default when the address never subscribed.
pub fn get_subscription(address: &Address) -> Subscription {
    SUBSCRIPTIONS
        .with(|map| map.borrow().get(&Cbor(address.clone())).map(|c| c.0))
        .unwrap_or_else(|| Subscription {
            is_active: true,
            ..Default::default()
        })
}

pub fn put_subscription(address: &Address, subscription: Subscription) {
    SUBSCRIPTIONS.with(|map| map.borrow_mut().insert(Cbor(address.clone()), Cbor(subscription)));
}

/// Counts a created vault against the address's subscription.
pub fn increment_vaults_used(address: &Address) -> Result<u32, VaultError> {
    let mut subscription = get_subscription(address);
    subscription.vaults_used = subscription.vaults_used.saturating_add(1);
    let used = subscription.vaults_used;
    put_subscription(address, subscription);
    Ok(used)
}
