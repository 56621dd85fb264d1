// src/backend/models/vault.rs
use crate::models::common::{Address, ContentId, TimestampMs, TxId, UnlockType, VaultId, VaultType};
use crate::utils::cipher::CipherScheme;
use candid::CandidType;
use serde::{Deserialize, Serialize};

pub const DEFAULT_VAULT_TITLE: &str = "Untitled Vault";

/// A stored, time-locked, encrypted message record.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Vault {
    pub id: VaultId,
    pub owner: Address,
    pub recipient: Address,
    pub ipfs_hash: ContentId,
    /// Never changes after creation.
    pub unlock_time: TimestampMs,
    pub unlock_type: UnlockType,
    pub vault_type: VaultType,
    /// Only ever moves from false to true.
    pub is_unlocked: bool,
    pub created_at: TimestampMs,
    pub title: String,
    pub tx_id: Option<TxId>,
    pub unlock_tx_id: Option<TxId>,
    pub on_chain_vault_id: Option<u64>,
    #[serde(default)]
    pub cipher_scheme: CipherScheme,
}

/// Derived, never stored.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Copy)]
pub enum VaultStatus {
    Locked,
    Unlockable,
    Opened,
}

/// Status as of `now`. Opened wins over time; the boundary `now == unlock_time`
/// is already unlockable.
pub fn status_at(is_unlocked: bool, unlock_time: TimestampMs, now: TimestampMs) -> VaultStatus {
    if is_unlocked {
        VaultStatus::Opened
    } else if now >= unlock_time {
        VaultStatus::Unlockable
    } else {
        VaultStatus::Locked
    }
}

impl Vault {
    pub fn status(&self, now: TimestampMs) -> VaultStatus {
        status_at(self.is_unlocked, self.unlock_time, now)
    }

    pub fn is_party(&self, address: &str) -> bool {
        self.owner == address || self.recipient == address
    }

    /// Applies the unlock action. Returns false if the vault was already opened.
    pub fn mark_unlocked(&mut self, unlock_tx: Option<TxId>) -> bool {
        let changed = !self.is_unlocked;
        self.is_unlocked = true;
        if self.tx_id.is_none() {
            self.tx_id = unlock_tx.clone();
        }
        if unlock_tx.is_some() {
            self.unlock_tx_id = unlock_tx;
        }
        changed
    }
}

/// What the dashboard shows per vault.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct VaultView {
    pub vault: Vault,
    pub status: VaultStatus,
}

impl VaultView {
    pub fn at(vault: Vault, now: TimestampMs) -> Self {
        let status = vault.status(now);
        Self { vault, status }
    }
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct VaultCategories {
    pub all: Vec<VaultView>,
    pub locked: u32,
    pub unlockable: u32,
    pub opened: u32,
}

impl VaultCategories {
    /// Buckets vaults by status at `now`, newest first.
    pub fn from_vaults(mut vaults: Vec<Vault>, now: TimestampMs) -> Self {
        vaults.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let mut categories = VaultCategories::default();
        for vault in vaults {
            let view = VaultView::at(vault, now);
            match view.status {
                VaultStatus::Locked => categories.locked += 1,
                VaultStatus::Unlockable => categories.unlockable += 1,
                VaultStatus::Opened => categories.opened += 1,
            }
            categories.all.push(view);
        }
        categories
    }
}

#[cfg(test)]
pub(crate) fn sample_vault(id: &str, unlock_time: TimestampMs) -> Vault {
    Vault {
        id: id.to_string(),
        owner: "aleo1owner".to_string(),
        recipient: "aleo1recipient".to_string(),
        ipfs_hash: "bafkreitest".to_string(),
        unlock_time,
        unlock_type: UnlockType::DateTime,
        vault_type: VaultType::Message,
        is_unlocked: false,
        created_at: 0,
        title: DEFAULT_VAULT_TITLE.to_string(),
        tx_id: Some("at1create".to_string()),
        unlock_tx_id: None,
        on_chain_vault_id: Some(1),
        cipher_scheme: CipherScheme::SealedV1,
    }
}
