// src/backend/storage/vaults.rs
use crate::error::VaultError;
use crate::models::common::{Address, TxId, VaultId};
use crate::models::vault::Vault;
use crate::storage::memory::{
    get_owner_index_memory, get_recipient_index_memory, get_vaults_memory, Memory,
};
use crate::storage::storable::{Cbor, StorableString};
use ic_stable_structures::StableBTreeMap;
use std::cell::RefCell;

type StorableVault = Cbor<Vault>;
// Key: (address, vault_id); value unused
type AddressIndexKey = Cbor<(Address, VaultId)>;
type AddressIndexMap = StableBTreeMap<AddressIndexKey, (), Memory>;

thread_local! {
    /// Primary store: VaultId -> Vault
    static VAULTS: RefCell<StableBTreeMap<StorableString, StorableVault, Memory>> = RefCell::new(
        StableBTreeMap::init(get_vaults_memory())
    );

    /// Secondary index: (owner, vault_id)
    static OWNER_INDEX: RefCell<AddressIndexMap> = RefCell::new(
        StableBTreeMap::init(get_owner_index_memory())
    );

    /// Secondary index: (recipient, vault_id)
    static RECIPIENT_INDEX: RefCell<AddressIndexMap> = RefCell::new(
        StableBTreeMap::init(get_recipient_index_memory())
    );
}

fn create_index_key(address: &str, vault_id: &str) -> AddressIndexKey {
    Cbor((address.to_string(), vault_id.to_string()))
}

/// Inserts or replaces a vault record and indexes it under both parties.
pub fn insert_vault(vault: &Vault) -> Result<(), VaultError> {
    let key = Cbor(vault.id.clone());
    VAULTS.with(|map| map.borrow_mut().insert(key, Cbor(vault.clone())));
    OWNER_INDEX.with(|index| {
        index
            .borrow_mut()
            .insert(create_index_key(&vault.owner, &vault.id), ())
    });
    RECIPIENT_INDEX.with(|index| {
        index
            .borrow_mut()
            .insert(create_index_key(&vault.recipient, &vault.id), ())
    });
    Ok(())
}

pub fn get_vault(vault_id: &VaultId) -> Option<Vault> {
    let key = Cbor(vault_id.clone());
    VAULTS.with(|map| map.borrow().get(&key).map(|c| c.0))
}

fn ids_for(index: &'static std::thread::LocalKey<RefCell<AddressIndexMap>>, address: &str) -> Vec<VaultId> {
    // Keys order as tuples: every (address, id) sorts at or after (address, "").
    let start = create_index_key(address, "");
    index.with(|map| {
        map.borrow()
            .range(start..)
            .map(|(key, _)| key.0)
            .take_while(|(addr, _)| addr == address)
            .map(|(_, id)| id)
            .collect()
    })
}

/// Vault ids created by `owner`.
pub fn get_vault_ids_by_owner(owner: &str) -> Vec<VaultId> {
    ids_for(&OWNER_INDEX, owner)
}

/// Vault ids addressed to `recipient`.
pub fn get_vault_ids_by_recipient(recipient: &str) -> Vec<VaultId> {
    ids_for(&RECIPIENT_INDEX, recipient)
}

/// Every vault where `address` is owner or recipient, each once.
pub fn list_vaults_for_address(address: &str) -> Vec<Vault> {
    let mut ids = get_vault_ids_by_owner(address);
    for id in get_vault_ids_by_recipient(address) {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids.iter().filter_map(get_vault).collect()
}

/// Flips `is_unlocked` (never back). Returns the updated record.
pub fn mark_unlocked(vault_id: &VaultId, unlock_tx: Option<TxId>) -> Result<Vault, VaultError> {
    let mut vault = get_vault(vault_id).ok_or_else(|| VaultError::VaultNotFound(vault_id.clone()))?;
    vault.mark_unlocked(unlock_tx);
    insert_vault(&vault)?;
    Ok(vault)
}

pub fn set_on_chain_vault_id(vault_id: &VaultId, on_chain_id: u64) -> Result<Vault, VaultError> {
    let mut vault = get_vault(vault_id).ok_or_else(|| VaultError::VaultNotFound(vault_id.clone()))?;
    vault.on_chain_vault_id = Some(on_chain_id);
    insert_vault(&vault)?;
    Ok(vault)
}

pub fn count_vaults() -> u64 {
    VAULTS.with(|map| map.borrow().len())
}
