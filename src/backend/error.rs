// src/backend/error.rs
use candid::CandidType;
use serde::Deserialize;
use thiserror::Error;

#[derive(CandidType, Deserialize, Error, Debug, Clone, PartialEq, Eq)]
pub enum VaultError {
    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    #[error("Vault not found: {0}")]
    VaultNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A required secret or endpoint is missing from the canister config.
    #[error("Service not configured: {0}")]
    NotConfigured(String),

    #[error("Vault is still locked until {unlock_time} (ms)")]
    NotYetUnlockable { unlock_time: u64 },

    #[error("Wallet not connected")]
    WalletNotConnected,

    #[error("Wallet rejected the request: {0}")]
    WalletRejected(String),

    #[error("HTTP outcall failed: {0}")]
    HttpError(String),

    /// The provider answered with a non-2xx status.
    #[error("Upstream provider returned {status}: {details}")]
    UpstreamRejected { status: u16, details: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Decryption failed")]
    DecryptionFailed,

    #[error("Vault content unavailable: {0}")]
    ContentUnavailable(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("Canister cycle balance too low for operation")]
    CycleLow,

    #[error("Internal canister error: {0}")]
    InternalError(String),
}

impl VaultError {
    /// HTTP status used when the error surfaces through one of the `/api/*` routes.
    pub fn status_code(&self) -> u16 {
        match self {
            VaultError::InvalidInput(_) => 400,
            VaultError::NotAuthorized(_) | VaultError::WalletNotConnected => 403,
            VaultError::VaultNotFound(_) => 404,
            VaultError::NotYetUnlockable { .. } => 409,
            VaultError::RateLimitExceeded(_) => 429,
            VaultError::UpstreamRejected { status, .. } => *status,
            VaultError::CycleLow => 503,
            _ => 500,
        }
    }
}
