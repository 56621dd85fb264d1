// src/backend/storage/memory.rs
use ic_stable_structures::memory_manager::{MemoryId, MemoryManager, VirtualMemory};
use ic_stable_structures::DefaultMemoryImpl;
use std::cell::RefCell;

// Define Memory IDs for stable structures
// Choose non-overlapping IDs
const VAULTS_MEM_ID: MemoryId = MemoryId::new(1);
const OWNER_INDEX_MEM_ID: MemoryId = MemoryId::new(2);
const RECIPIENT_INDEX_MEM_ID: MemoryId = MemoryId::new(3);
const SESSIONS_MEM_ID: MemoryId = MemoryId::new(4);
const SUBSCRIPTIONS_MEM_ID: MemoryId = MemoryId::new(5);
const METRICS_MEM_ID: MemoryId = MemoryId::new(8);
// Reserve IDs 9-19 for future use
const APP_CONFIG_MEM_ID: MemoryId = MemoryId::new(25);
const MASTER_SECRET_MEM_ID: MemoryId = MemoryId::new(26);

// Define memory type alias
pub type Memory = VirtualMemory<DefaultMemoryImpl>;

thread_local! {
    // Memory manager
    static MEMORY_MANAGER: RefCell<MemoryManager<DefaultMemoryImpl>> = RefCell::new(
        MemoryManager::init(DefaultMemoryImpl::default())
    );
}

/// Get memory instance for a specific MemoryId.
pub fn get_memory(id: MemoryId) -> Memory {
    MEMORY_MANAGER.with(|m| m.borrow().get(id))
}

pub fn get_vaults_memory() -> Memory {
    get_memory(VAULTS_MEM_ID)
}

pub fn get_owner_index_memory() -> Memory {
    get_memory(OWNER_INDEX_MEM_ID)
}

pub fn get_recipient_index_memory() -> Memory {
    get_memory(RECIPIENT_INDEX_MEM_ID)
}

pub fn get_sessions_memory() -> Memory {
    get_memory(SESSIONS_MEM_ID)
}

pub fn get_subscriptions_memory() -> Memory {
    get_memory(SUBSCRIPTIONS_MEM_ID)
}

pub fn get_metrics_memory() -> Memory {
    get_memory(METRICS_MEM_ID)
}

pub fn get_app_config_memory() -> Memory {
    get_memory(APP_CONFIG_MEM_ID)
}

pub fn get_master_secret_memory() -> Memory {
    get_memory(MASTER_SECRET_MEM_ID)
}
