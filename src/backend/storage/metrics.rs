// src/backend/storage/metrics.rs
use crate::error::VaultError;
use crate::metrics::VaultMetrics;
use crate::storage::memory::{get_metrics_memory, Memory};
use crate::storage::storable::Cbor;
use ic_stable_structures::StableCell;
use std::cell::RefCell;

type StorableVaultMetrics = Cbor<VaultMetrics>;

thread_local! {
    /// Global counters
    static METRICS_CELL: RefCell<StableCell<StorableVaultMetrics, Memory>> = RefCell::new(
        StableCell::init(get_metrics_memory(), Cbor(VaultMetrics::default()))
            .expect("Failed to initialize metrics stable cell")
    );
}

pub fn get_metrics() -> VaultMetrics {
    METRICS_CELL.with(|cell| cell.borrow().get().0.clone())
}

/// Applies `update_fn` to a copy of the counters and stores the result.
pub fn update_metrics<F>(update_fn: F) -> Result<(), VaultError>
where
    F: FnOnce(&mut VaultMetrics),
{
    METRICS_CELL.with(|cell| {
        let mut metrics = cell.borrow().get().0.clone();
        update_fn(&mut metrics);
        cell.borrow_mut()
            .set(Cbor(metrics))
            .map_err(|e| VaultError::StorageError(format!("Failed to update metrics: {:?}", e)))?;
        Ok(())
    })
}
