// src/backend/services/vault_service.rs
//! Vault lifecycle: create (encrypt, pin, register on-chain, persist) and
//! unlock (register on-chain, mark opened, fetch, decrypt).
//!
//! Nothing is rolled back. A pin or transaction that succeeded before a
//! later step failed stays where it is; the record is written last on
//! create and first-after-the-transaction on unlock.

use crate::adapter::aleo_program::{CreateVaultCall, UnlockVaultCall};
use crate::error::VaultError;
use crate::metrics;
use crate::models::common::{Address, TimestampMs, UnlockType, VaultId, VaultType, WireTag};
use crate::models::config::AppConfig;
use crate::models::payload::VaultPayload;
use crate::models::session::WalletSession;
use crate::models::vault::{Vault, VaultCategories, VaultStatus, VaultView, DEFAULT_VAULT_TITLE};
use crate::services::ports::{ChainGateway, ContentStore};
use crate::storage;
use crate::utils::cipher::{derive_vault_key, open_payload, seal_payload, CipherScheme, SealedCipher};
use crate::utils::crypto::generate_vault_id;
use crate::utils::format::format_address;
use candid::CandidType;
use serde::{Deserialize, Serialize};

/// Scheme used for every newly created vault.
pub const NEW_VAULT_SCHEME: CipherScheme = CipherScheme::SealedV1;

/// Service-level input for `create_vault`, already shape-validated by the API.
#[derive(Clone, Debug)]
pub struct NewVaultData {
    pub title: Option<String>,
    pub content: String,
    pub recipient: Option<Address>,
    pub unlock_time: TimestampMs,
    pub unlock_type: UnlockType,
    pub vault_type: VaultType,
}

#[derive(CandidType, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct UnlockedVault {
    pub vault: VaultView,
    pub content: String,
}

/// Receipt for a raw pin through the content store.
#[derive(CandidType, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PinReceipt {
    pub ipfs_hash: String,
    pub pin_size: u64,
    pub timestamp: String,
    pub gateway: String,
}

fn session_address(session: &WalletSession) -> Result<Address, VaultError> {
    session
        .address()
        .map(str::to_string)
        .ok_or(VaultError::WalletNotConnected)
}

fn load_for_party(vault_id: &VaultId, address: &str) -> Result<Vault, VaultError> {
    let vault = storage::vaults::get_vault(vault_id)
        .ok_or_else(|| VaultError::VaultNotFound(vault_id.clone()))?;
    if !vault.is_party(address) {
        return Err(VaultError::NotAuthorized(format!(
            "{} is neither owner nor recipient of vault {}",
            format_address(address),
            vault_id
        )));
    }
    Ok(vault)
}

/// Creates a vault for the session's wallet.
///
/// # Returns
/// * `Result<VaultView, VaultError>` - The stored record with its status at `now`.
pub async fn create_vault<S: ContentStore, C: ChainGateway>(
    store: &S,
    chain: &C,
    cipher: &SealedCipher,
    config: &AppConfig,
    session: &WalletSession,
    data: NewVaultData,
    now: TimestampMs,
) -> Result<VaultView, VaultError> {
    let owner = session_address(session)?;
    if data.content.trim().is_empty() {
        return Err(VaultError::InvalidInput("Content is required".to_string()));
    }
    let recipient = data
        .recipient
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| owner.clone());
    let title = data
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_VAULT_TITLE.to_string());

    // 1. Id and ciphertext
    let vault_id = generate_vault_id()?;
    let secret = derive_vault_key(&owner, &vault_id);
    let ciphertext = seal_payload(NEW_VAULT_SCHEME, cipher, &data.content, &secret)?;

    // 2. Pin the payload
    let kind = data.vault_type.tag().to_string();
    let payload = VaultPayload {
        title: title.clone(),
        content: ciphertext,
        kind: kind.clone(),
        recipient: recipient.clone(),
        vault_id: vault_id.clone(),
        created_at: now,
        scheme: NEW_VAULT_SCHEME,
    };
    let payload_json = serde_json::to_value(&payload)
        .map_err(|e| VaultError::SerializationError(format!("Failed to serialize vault payload: {}", e)))?;
    let pinned = store.pin_json(&payload_json, &kind).await.map_err(|e| {
        metrics::record_upstream_failure();
        e
    })?;
    metrics::record_pin(pinned.pin_size);

    // 3. Register on-chain
    let call = CreateVaultCall {
        recipient: &recipient,
        ipfs_hash: &pinned.ipfs_hash,
        unlock_time_ms: data.unlock_time,
        unlock_type: data.unlock_type,
        vault_type: data.vault_type,
        created_at_ms: now,
    }
    .build(&config.vault_program_id)?;
    let tx_id = chain.execute(&owner, &call).await.map_err(|e| {
        log_warn!("Vault {} pinned as {} but not registered: {}", vault_id, pinned.ipfs_hash, e);
        e
    })?;

    // 4. Persist
    let vault = Vault {
        id: vault_id,
        owner: owner.clone(),
        recipient,
        ipfs_hash: pinned.ipfs_hash,
        unlock_time: data.unlock_time,
        unlock_type: data.unlock_type,
        vault_type: data.vault_type,
        is_unlocked: false,
        created_at: now,
        title,
        tx_id: Some(tx_id),
        unlock_tx_id: None,
        on_chain_vault_id: None,
        cipher_scheme: NEW_VAULT_SCHEME,
    };
    storage::vaults::insert_vault(&vault)?;
    storage::subscriptions::increment_vaults_used(&owner)?;
    metrics::record_vault_created();
    log_info!("Vault {} created by {}", vault.id, format_address(&owner));

    Ok(VaultView::at(vault, now))
}

/// Fetches and decrypts a vault's payload. The record's scheme decides the
/// cipher; a payload tagged with any other scheme is refused.
async fn read_content<S: ContentStore>(
    store: &S,
    cipher: &SealedCipher,
    vault: &Vault,
) -> Result<String, VaultError> {
    let bytes = store.fetch(&vault.ipfs_hash).await?;
    let payload: VaultPayload = serde_json::from_slice(&bytes)
        .map_err(|e| VaultError::SerializationError(format!("Malformed vault payload: {}", e)))?;
    if payload.scheme != vault.cipher_scheme {
        log_warn!(
            "Vault {} payload tagged {:?}, record says {:?}",
            vault.id,
            payload.scheme,
            vault.cipher_scheme
        );
        return Err(VaultError::DecryptionFailed);
    }
    let secret = derive_vault_key(&vault.owner, &vault.id);
    open_payload(vault.cipher_scheme, cipher, &payload.content, &secret)
}

/// Unlocks a vault for its owner or recipient.
///
/// A `Locked` vault is refused before anything is submitted. An already
/// opened vault returns its content without a new transaction.
#[allow(clippy::too_many_arguments)]
pub async fn unlock_vault<S: ContentStore, C: ChainGateway>(
    store: &S,
    chain: &C,
    cipher: &SealedCipher,
    config: &AppConfig,
    session: &WalletSession,
    vault_id: &VaultId,
    on_chain_vault_id: Option<u64>,
    now: TimestampMs,
) -> Result<UnlockedVault, VaultError> {
    let caller = session_address(session)?;
    let vault = load_for_party(vault_id, &caller)?;

    match vault.status(now) {
        VaultStatus::Locked => {
            metrics::record_unlock_rejected_locked();
            return Err(VaultError::NotYetUnlockable {
                unlock_time: vault.unlock_time,
            });
        }
        VaultStatus::Opened => {
            let content = read_content(store, cipher, &vault)
                .await
                .map_err(|e| VaultError::ContentUnavailable(e.to_string()))?;
            return Ok(UnlockedVault {
                vault: VaultView::at(vault, now),
                content,
            });
        }
        VaultStatus::Unlockable => {}
    }

    let chain_id = on_chain_vault_id
        .or(vault.on_chain_vault_id)
        .ok_or_else(|| {
            VaultError::InvalidInput("On-chain vault id unknown for this vault".to_string())
        })?;

    // 1. Submit the unlock transaction; a failure leaves the record untouched
    let call = UnlockVaultCall {
        on_chain_vault_id: chain_id,
        now_ms: now,
    }
    .build(&config.vault_program_id);
    let unlock_tx = chain.execute(&caller, &call).await?;

    // 2. Mark opened
    if vault.on_chain_vault_id.is_none() {
        storage::vaults::set_on_chain_vault_id(vault_id, chain_id)?;
    }
    let vault = storage::vaults::mark_unlocked(vault_id, Some(unlock_tx))?;
    metrics::record_vault_unlocked();
    log_info!("Vault {} opened by {}", vault_id, format_address(&caller));

    // 3. Fetch and decrypt; the record stays opened either way
    match read_content(store, cipher, &vault).await {
        Ok(content) => Ok(UnlockedVault {
            vault: VaultView::at(vault, now),
            content,
        }),
        Err(e) => {
            metrics::record_content_unavailable();
            log_error!("Vault {} opened but content unavailable: {}", vault_id, e);
            Err(VaultError::ContentUnavailable(e.to_string()))
        }
    }
}

/// Decrypted content of an opened vault.
pub async fn get_vault_content<S: ContentStore>(
    store: &S,
    cipher: &SealedCipher,
    session: &WalletSession,
    vault_id: &VaultId,
    now: TimestampMs,
) -> Result<String, VaultError> {
    let caller = session_address(session)?;
    let vault = load_for_party(vault_id, &caller)?;
    match vault.status(now) {
        VaultStatus::Opened => read_content(store, cipher, &vault)
            .await
            .map_err(|e| VaultError::ContentUnavailable(e.to_string())),
        VaultStatus::Locked => Err(VaultError::NotYetUnlockable {
            unlock_time: vault.unlock_time,
        }),
        VaultStatus::Unlockable => Err(VaultError::InvalidInput(
            "Vault must be unlocked before its content can be read".to_string(),
        )),
    }
}

pub fn get_vault(session: &WalletSession, vault_id: &VaultId, now: TimestampMs) -> Result<VaultView, VaultError> {
    let caller = session_address(session)?;
    Ok(VaultView::at(load_for_party(vault_id, &caller)?, now))
}

/// Vaults the session's wallet created or receives, newest first.
pub fn list_my_vaults(session: &WalletSession, now: TimestampMs) -> Result<VaultCategories, VaultError> {
    let caller = session_address(session)?;
    Ok(VaultCategories::from_vaults(
        storage::vaults::list_vaults_for_address(&caller),
        now,
    ))
}

/// Records the program-assigned vault index. Owner only.
pub fn set_on_chain_vault_id(
    session: &WalletSession,
    vault_id: &VaultId,
    on_chain_vault_id: u64,
    now: TimestampMs,
) -> Result<VaultView, VaultError> {
    let caller = session_address(session)?;
    let vault = load_for_party(vault_id, &caller)?;
    if vault.owner != caller {
        return Err(VaultError::NotAuthorized(
            "Only the vault owner can set the on-chain id".to_string(),
        ));
    }
    let updated = storage::vaults::set_on_chain_vault_id(vault_id, on_chain_vault_id)?;
    Ok(VaultView::at(updated, now))
}

/// Pins arbitrary JSON content (the `/api/ipfs` pass-through).
pub async fn pin_content<S: ContentStore>(store: &S, content: &serde_json::Value) -> Result<PinReceipt, VaultError> {
    let kind = content
        .get("type")
        .and_then(|t| match t {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .unwrap_or_else(|| "unknown".to_string());
    let pinned = store.pin_json(content, &kind).await.map_err(|e| {
        metrics::record_upstream_failure();
        e
    })?;
    metrics::record_pin(pinned.pin_size);
    Ok(PinReceipt {
        gateway: store.gateway_url(&pinned.ipfs_hash),
        ipfs_hash: pinned.ipfs_hash,
        pin_size: pinned.pin_size,
        timestamp: pinned.timestamp,
    })
}

#[cfg(test)]
pub(crate) mod fakes {
    use crate::adapter::aleo_program::ProgramCall;
    use crate::error::VaultError;
    use crate::models::common::TxId;
    use crate::services::ports::{ChainGateway, ContentStore, PinResult};
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    pub struct FakeStore {
        pub pinned: RefCell<HashMap<String, Vec<u8>>>,
        pub fail_pin: bool,
        pub fail_fetch: bool,
    }

    impl ContentStore for FakeStore {
        async fn pin_json(&self, content: &serde_json::Value, _kind: &str) -> Result<PinResult, VaultError> {
            if self.fail_pin {
                return Err(VaultError::UpstreamRejected { status: 401, details: "bad jwt".into() });
            }
            let bytes = serde_json::to_vec(content).unwrap();
            let cid = format!("bafy{}", self.pinned.borrow().len());
            let size = bytes.len() as u64;
            self.pinned.borrow_mut().insert(cid.clone(), bytes);
            Ok(PinResult { ipfs_hash: cid, pin_size: size, timestamp: "t".into() })
        }

        async fn fetch(&self, cid: &str) -> Result<Vec<u8>, VaultError> {
            if self.fail_fetch {
                return Err(VaultError::HttpError("gateway timeout".into()));
            }
            self.pinned
                .borrow()
                .get(cid)
                .cloned()
                .ok_or_else(|| VaultError::UpstreamRejected { status: 404, details: cid.into() })
        }

        fn gateway_url(&self, cid: &str) -> String {
            format!("https://gw.test/ipfs/{}", cid)
        }
    }

    #[derive(Default)]
    pub struct FakeChain {
        pub calls: RefCell<Vec<(String, ProgramCall)>>,
        pub reject: bool,
        pub reachable: bool,
    }

    impl ChainGateway for FakeChain {
        async fn execute(&self, signer: &str, call: &ProgramCall) -> Result<TxId, VaultError> {
            if self.reject {
                return Err(VaultError::WalletRejected("User rejected".into()));
            }
            self.calls.borrow_mut().push((signer.to_string(), call.clone()));
            Ok(format!("at1tx{}", self.calls.borrow().len()))
        }

        async fn is_reachable(&self) -> bool {
            self.reachable
        }
    }
}
