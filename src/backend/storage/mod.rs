// src/backend/storage/mod.rs
// Stable memory layout and typed accessors, one module per collection.

pub mod config;
pub mod memory;
pub mod metrics;
pub mod sessions;
pub mod storable;
pub mod subscriptions;
pub mod vaults;

pub use memory::Memory;
pub use storable::{Cbor, StorableString};
