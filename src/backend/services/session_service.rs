// src/backend/services/session_service.rs
//! Drives the wallet session transitions. The pure flows take the current
//! session value and return the next one; the `*_for` helpers load and store
//! it per caller.

use crate::metrics;
use crate::models::common::TimestampMs;
use crate::models::session::{generate_auth_message, AuthToken, WalletSession};
use crate::services::ports::{ChainGateway, WalletProvider};
use crate::storage;
use crate::utils::format::format_address;
use candid::Principal;

/// Connecting -> wallet connect -> ownership signature.
///
/// Ends `ConnectedVerified` with a fresh token, `ConnectedUnverified` if the
/// signature was refused, or `Disconnected` with the error if connecting failed.
pub async fn connect<W: WalletProvider>(wallet: &W, current: &WalletSession, now: TimestampMs) -> WalletSession {
    let connecting = current.begin_connect();
    if !wallet.is_available() {
        log_warn!("Connect attempted without a wallet");
        return connecting.connection_failed("No Aleo wallet detected".to_string());
    }
    let account = match wallet.connect().await {
        Ok(account) => account,
        Err(e) => {
            log_warn!("Wallet connect failed: {}", e);
            return connecting.connection_failed(e.to_string());
        }
    };

    let message = generate_auth_message(&account.address, now);
    match wallet.sign_message(&message).await {
        Ok(signature) => {
            let token = AuthToken::issue(account.address.clone(), signature, now);
            log_info!("Wallet {} verified", format_address(&account.address));
            connecting.connected_verified(account, token)
        }
        Err(e) => {
            log_info!("Wallet {} connected without verification: {}", format_address(&account.address), e);
            connecting.connected_unverified(account)
        }
    }
}

/// Resumes from a cached token when it is unexpired and the wallet still
/// exposes the same address; otherwise connects without verification.
pub async fn restore<W: WalletProvider>(wallet: &W, cached: &WalletSession, now: TimestampMs) -> WalletSession {
    let account = match wallet.connect().await {
        Ok(account) => account,
        Err(e) => return cached.disconnect().connection_failed(e.to_string()),
    };
    let reusable = cached
        .auth
        .as_ref()
        .filter(|token| !token.is_expired(now) && token.address == account.address)
        .cloned();
    match reusable {
        Some(token) => cached.connected_verified(account, token),
        None => cached.connected_unverified(account),
    }
}

/// Stored session for `caller` as of `now`. A lapsed token is dropped and the
/// downgrade persisted.
pub fn current_session(caller: &Principal, now: TimestampMs) -> WalletSession {
    let stored = storage::sessions::get_session(caller).unwrap_or_default();
    let current = stored.as_of(now);
    if current != stored {
        storage::sessions::put_session(caller, current.clone());
    }
    current.with_wallet_available(storage::sessions::is_wallet_available())
}

pub async fn connect_for<W: WalletProvider>(caller: &Principal, wallet: &W, now: TimestampMs) -> WalletSession {
    let current = current_session(caller, now);
    let next = connect(wallet, &current, now).await;
    storage::sessions::put_session(caller, next.clone());
    next
}

pub async fn restore_for<W: WalletProvider>(caller: &Principal, wallet: &W, now: TimestampMs) -> WalletSession {
    let current = current_session(caller, now);
    let next = restore(wallet, &current, now).await;
    storage::sessions::put_session(caller, next.clone());
    next
}

pub fn disconnect_for(caller: &Principal, now: TimestampMs) -> WalletSession {
    let next = current_session(caller, now).disconnect();
    storage::sessions::remove_session(caller);
    next
}

/// One availability check. Runs from the scheduler, never from a user call.
pub async fn poll_availability<C: ChainGateway>(chain: &C, now: TimestampMs) -> bool {
    let available = chain.is_reachable().await;
    if available != storage::sessions::is_wallet_available() {
        log_info!("Chain availability changed: {}", available);
    }
    storage::sessions::set_wallet_available(available, now);
    metrics::record_availability_check();
    available
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VaultError;
    use crate::models::session::{SessionState, WalletAccount, AUTH_SESSION_TTL_MS};
    use crate::services::vault_service::fakes::FakeChain;
    use futures::executor::block_on;

    struct FakeWallet {
        address: Option<&'static str>,
        signs: bool,
    }

    impl WalletProvider for FakeWallet {
        async fn connect(&self) -> Result<WalletAccount, VaultError> {
            self.address
                .map(|a| WalletAccount { address: a.to_string(), network: "testnet".into() })
                .ok_or_else(|| VaultError::WalletRejected("No wallet found".into()))
        }

        async fn sign_message(&self, message: &str) -> Result<String, VaultError> {
            if self.signs {
                Ok(format!("sig:{}", message.len()))
            } else {
                Err(VaultError::WalletRejected("declined".into()))
            }
        }

        fn is_available(&self) -> bool {
            self.address.is_some()
        }
    }

    fn caller() -> Principal {
        Principal::from_slice(&[4; 29])
    }

    #[test]
    fn signed_connect_is_verified_for_a_day() {
        let wallet = FakeWallet { address: Some("aleo1me"), signs: true };
        let session = block_on(connect(&wallet, &WalletSession::disconnected(), 1_000));
        assert_eq!(session.state, SessionState::ConnectedVerified);
        let token = session.auth.clone().unwrap();
        assert_eq!(token.expires_at, 1_000 + AUTH_SESSION_TTL_MS);
        assert!(token.signature.starts_with("sig:"));
    }

    #[test]
    fn refused_signature_is_unverified() {
        let wallet = FakeWallet { address: Some("aleo1me"), signs: false };
        let session = block_on(connect(&wallet, &WalletSession::disconnected(), 0));
        assert_eq!(session.state, SessionState::ConnectedUnverified);
        assert_eq!(session.address(), Some("aleo1me"));
    }

    #[test]
    fn missing_wallet_ends_disconnected_with_error() {
        let wallet = FakeWallet { address: None, signs: true };
        let session = block_on(connect(&wallet, &WalletSession::disconnected(), 0));
        assert_eq!(session.state, SessionState::Disconnected);
        assert_eq!(session.error.as_deref(), Some("No Aleo wallet detected"));
    }

    #[test]
    fn restore_reuses_matching_unexpired_token() {
        let signer = FakeWallet { address: Some("aleo1me"), signs: true };
        let verified = block_on(connect(&signer, &WalletSession::disconnected(), 0));

        let silent = FakeWallet { address: Some("aleo1me"), signs: false };
        let restored = block_on(restore(&silent, &verified, 10));
        assert!(restored.is_verified());

        let expired = block_on(restore(&silent, &verified, AUTH_SESSION_TTL_MS + 1));
        assert_eq!(expired.state, SessionState::ConnectedUnverified);

        let other = FakeWallet { address: Some("aleo1other"), signs: false };
        assert!(!block_on(restore(&other, &verified, 10)).is_verified());
    }

    #[test]
    fn stored_session_lifecycle() {
        let wallet = FakeWallet { address: Some("aleo1me"), signs: true };
        let session = block_on(connect_for(&caller(), &wallet, 0));
        assert!(session.is_verified());
        assert!(current_session(&caller(), 5).is_verified());

        let lapsed = current_session(&caller(), AUTH_SESSION_TTL_MS + 1);
        assert_eq!(lapsed.state, SessionState::ConnectedUnverified);
        assert!(storage::sessions::get_session(&caller()).unwrap().auth.is_none());

        let gone = disconnect_for(&caller(), 0);
        assert_eq!(gone.state, SessionState::Disconnected);
        assert_eq!(current_session(&caller(), 0).state, SessionState::Disconnected);
    }

    #[test]
    fn poll_updates_availability() {
        let chain = FakeChain { reachable: true, ..Default::default() };
        assert!(block_on(poll_availability(&chain, 42)));
        assert!(current_session(&caller(), 0).wallet_available);
        assert_eq!(storage::sessions::last_availability_check(), Some(42));
    }
}
