// src/backend/storage/config.rs
use crate::error::VaultError;
use crate::models::config::AppConfig;
use crate::models::init::InitArgs;
use crate::storage::memory::{get_app_config_memory, get_master_secret_memory, Memory};
use crate::storage::storable::Cbor;
use crate::utils::rng::fill_random;
use candid::Principal;
use ic_stable_structures::StableCell;
use std::cell::RefCell;

thread_local! {
    /// Stable cell for the application configuration
    static APP_CONFIG: RefCell<StableCell<Cbor<AppConfig>, Memory>> = RefCell::new(
        StableCell::init(get_app_config_memory(), Cbor(AppConfig::default()))
            .expect("Failed to initialize app config stable cell")
    );

    /// Stable cell for the sealed-payload master secret, generated once
    static MASTER_SECRET: RefCell<StableCell<Cbor<Option<Vec<u8>>>, Memory>> = RefCell::new(
        StableCell::init(get_master_secret_memory(), Cbor(None))
            .expect("Failed to initialize master secret stable cell")
    );
}

/// Applies install/upgrade arguments on top of the stored configuration.
pub fn init_config(args: InitArgs) -> Result<(), VaultError> {
    let merged = get_config().merged(args);
    set_config(merged.clone())?;
    log_info!(
        "Configuration initialized: Admin={}, Network={}, Threshold={}",
        merged.admin_principal,
        merged.network,
        merged.min_cycles_threshold
    );
    Ok(())
}

pub fn get_config() -> AppConfig {
    APP_CONFIG.with(|cell| cell.borrow().get().0.clone())
}

pub fn set_config(config: AppConfig) -> Result<(), VaultError> {
    APP_CONFIG.with(|cell| {
        cell.borrow_mut()
            .set(Cbor(config))
            .map(|_| ())
            .map_err(|e| VaultError::StorageError(format!("Failed to store config: {:?}", e)))
    })
}

/// Get the configured Admin Principal.
pub fn get_admin_principal() -> Principal {
    APP_CONFIG.with(|cell| cell.borrow().get().0.admin_principal)
}

/// Get the configured Minimum Cycles Threshold.
pub fn get_min_cycles_threshold() -> u128 {
    APP_CONFIG.with(|cell| cell.borrow().get().0.min_cycles_threshold)
}

pub fn get_master_secret() -> Option<[u8; 32]> {
    MASTER_SECRET.with(|cell| {
        cell.borrow()
            .get()
            .0
            .as_ref()
            .and_then(|bytes| bytes.as_slice().try_into().ok())
    })
}

/// Returns the master secret, generating and storing it on first use.
/// Needs a seeded RNG.
pub fn ensure_master_secret() -> Result<[u8; 32], VaultError> {
    if let Some(secret) = get_master_secret() {
        return Ok(secret);
    }
    let mut secret = [0u8; 32];
    fill_random(&mut secret)?;
    MASTER_SECRET.with(|cell| {
        cell.borrow_mut()
            .set(Cbor(Some(secret.to_vec())))
            .map_err(|e| VaultError::StorageError(format!("Failed to store master secret: {:?}", e)))
    })?;
    log_info!("Master secret generated.");
    Ok(secret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::DEFAULT_RPC_URL;
    use crate::utils::rng::seed_internal_rng;

    #[test]
    fn init_overlays_arguments() {
        let admin = Principal::from_slice(&[7; 29]);
        init_config(InitArgs {
            admin_principal: Some(admin),
            min_cycles_threshold: Some(5),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(get_admin_principal(), admin);
        assert_eq!(get_min_cycles_threshold(), 5);
        assert_eq!(get_config().rpc_url, DEFAULT_RPC_URL);
    }

    #[test]
    fn master_secret_is_generated_once() {
        seed_internal_rng([3; 32]);
        assert!(get_master_secret().is_none());
        let first = ensure_master_secret().unwrap();
        let second = ensure_master_secret().unwrap();
        assert_eq!(first, second);
        assert_eq!(get_master_secret(), Some(first));
    }
}
