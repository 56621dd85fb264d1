// src/backend/models/session.rs
//! Wallet session values. Every transition returns a new `WalletSession`;
//! nothing here mutates shared state.

use crate::models::common::{Address, TimestampMs};
use candid::CandidType;
use serde::{Deserialize, Serialize};

pub const AUTH_SESSION_TTL_MS: u64 = 24 * 60 * 60 * 1_000;

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Copy, Default)]
pub enum SessionState {
    #[default]
    Disconnected,
    Connecting,
    ConnectedUnverified,
    ConnectedVerified,
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct WalletAccount {
    pub address: Address,
    pub network: String,
}

/// Proof of wallet ownership: the signed auth message, valid for a day.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct AuthToken {
    pub address: Address,
    pub signature: String,
    pub issued_at: TimestampMs,
    pub expires_at: TimestampMs,
}

impl AuthToken {
    pub fn issue(address: Address, signature: String, now: TimestampMs) -> Self {
        Self {
            address,
            signature,
            issued_at: now,
            expires_at: now.saturating_add(AUTH_SESSION_TTL_MS),
        }
    }

    pub fn is_expired(&self, now: TimestampMs) -> bool {
        now > self.expires_at
    }
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct WalletSession {
    pub state: SessionState,
    pub account: Option<WalletAccount>,
    pub auth: Option<AuthToken>,
    pub error: Option<String>,
    pub wallet_available: bool,
}

impl WalletSession {
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn begin_connect(&self) -> Self {
        Self {
            state: SessionState::Connecting,
            error: None,
            ..self.clone()
        }
    }

    /// Connect failed: back to disconnected, keeping the error for display.
    pub fn connection_failed(&self, error: String) -> Self {
        Self {
            state: SessionState::Disconnected,
            account: None,
            auth: None,
            error: Some(error),
            wallet_available: self.wallet_available,
        }
    }

    pub fn connected_verified(&self, account: WalletAccount, auth: AuthToken) -> Self {
        Self {
            state: SessionState::ConnectedVerified,
            account: Some(account),
            auth: Some(auth),
            error: None,
            wallet_available: self.wallet_available,
        }
    }

    pub fn connected_unverified(&self, account: WalletAccount) -> Self {
        Self {
            state: SessionState::ConnectedUnverified,
            account: Some(account),
            auth: None,
            error: None,
            wallet_available: self.wallet_available,
        }
    }

    /// Always lands in `Disconnected` and drops the cached token.
    pub fn disconnect(&self) -> Self {
        Self {
            wallet_available: self.wallet_available,
            ..Self::default()
        }
    }

    pub fn with_wallet_available(&self, available: bool) -> Self {
        Self {
            wallet_available: available,
            ..self.clone()
        }
    }

    /// A verified session whose token lapsed keeps the connection but loses
    /// the verification.
    pub fn as_of(&self, now: TimestampMs) -> Self {
        match (&self.state, &self.auth) {
            (SessionState::ConnectedVerified, Some(token)) if token.is_expired(now) => Self {
                state: SessionState::ConnectedUnverified,
                auth: None,
                ..self.clone()
            },
            _ => self.clone(),
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(
            self.state,
            SessionState::ConnectedUnverified | SessionState::ConnectedVerified
        )
    }

    #[cfg(test)]
    pub fn is_verified(&self) -> bool {
        self.state == SessionState::ConnectedVerified
    }

    pub fn address(&self) -> Option<&str> {
        if self.is_connected() {
            self.account.as_ref().map(|a| a.address.as_str())
        } else {
            None
        }
    }
}

/// The message the wallet is asked to sign on connect.
pub fn generate_auth_message(address: &str, now: TimestampMs) -> String {
    format!(
        "TimeVault Authentication\n\nAddress: {}\nTimestamp: {}\n\nSign this message to verify ownership of your wallet.",
        address, now
    )
}
