// src/backend/storage/sessions.rs
use crate::models::common::TimestampMs;
use crate::models::session::WalletSession;
use crate::storage::memory::{get_sessions_memory, Memory};
use crate::storage::storable::{Cbor, StorableString};
use candid::Principal;
use ic_stable_structures::StableBTreeMap;
use std::cell::{Cell, RefCell};

type StorableSession = Cbor<WalletSession>;

thread_local! {
    /// Caller principal (text) -> last session value
    static SESSIONS: RefCell<StableBTreeMap<StorableString, StorableSession, Memory>> = RefCell::new(
        StableBTreeMap::init(get_sessions_memory())
    );

    // Heap only: re-learned by the first availability poll after an upgrade.
    static WALLET_AVAILABLE: Cell<bool> = Cell::new(false);
    static LAST_AVAILABILITY_CHECK: Cell<Option<TimestampMs>> = Cell::new(None);
}

fn create_session_key(caller: &Principal) -> StorableString {
    Cbor(caller.to_text())
}

pub fn get_session(caller: &Principal) -> Option<WalletSession> {
    SESSIONS.with(|map| map.borrow().get(&create_session_key(caller)).map(|c| c.0))
}

pub fn put_session(caller: &Principal, session: WalletSession) {
    SESSIONS.with(|map| {
        map.borrow_mut()
            .insert(create_session_key(caller), Cbor(session))
    });
}

pub fn remove_session(caller: &Principal) -> Option<WalletSession> {
    SESSIONS.with(|map| map.borrow_mut().remove(&create_session_key(caller)).map(|c| c.0))
}

pub fn is_wallet_available() -> bool {
    WALLET_AVAILABLE.with(|flag| flag.get())
}

pub fn set_wallet_available(available: bool, checked_at: TimestampMs) {
    WALLET_AVAILABLE.with(|flag| flag.set(available));
    LAST_AVAILABILITY_CHECK.with(|at| at.set(Some(checked_at)));
}

pub fn last_availability_check() -> Option<TimestampMs> {
    LAST_AVAILABILITY_CHECK.with(|at| at.get())
}
