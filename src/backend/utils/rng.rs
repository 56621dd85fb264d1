// src/backend/utils/rng.rs

use crate::error::VaultError;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::cell::RefCell;

thread_local! {
    // Seeded once per canister lifetime; used for vault ids, salts and nonces.
    static INTERNAL_RNG: RefCell<Option<ChaCha20Rng>> = RefCell::new(None);
}

/// Seeds the internal RNG from the management canister's `raw_rand`.
/// Called from a zero-delay timer after init and post_upgrade, since
/// inter-canister calls cannot be awaited inside those hooks.
pub async fn initialize_internal_rng() -> Result<(), VaultError> {
    let (bytes,) = ic_cdk::api::management_canister::main::raw_rand()
        .await
        .map_err(|(code, msg)| {
            VaultError::InternalError(format!("raw_rand failed: {:?} - {}", code, msg))
        })?;
    let seed: [u8; 32] = bytes
        .get(..32)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| {
            VaultError::InternalError("raw_rand returned insufficient bytes for seed".to_string())
        })?;
    seed_internal_rng(seed);
    log_info!("Internal RNG initialized successfully.");
    Ok(())
}

pub fn seed_internal_rng(seed: [u8; 32]) {
    INTERNAL_RNG.with(|rng| {
        *rng.borrow_mut() = Some(ChaCha20Rng::from_seed(seed));
    });
}

pub fn is_initialized() -> bool {
    INTERNAL_RNG.with(|rng| rng.borrow().is_some())
}

/// Borrows the initialized internal RNG.
pub fn with_internal_rng<F, R>(f: F) -> Result<R, VaultError>
where
    F: FnOnce(&mut ChaCha20Rng) -> R,
{
    INTERNAL_RNG.with(|rng| {
        let mut borrowed = rng.borrow_mut();
        let instance = borrowed
            .as_mut()
            .ok_or_else(|| VaultError::InternalError("Internal RNG accessed before initialization".to_string()))?;
        Ok(f(instance))
    })
}

pub fn fill_random(buf: &mut [u8]) -> Result<(), VaultError> {
    with_internal_rng(|rng| rng.fill_bytes(buf))
}

#[cfg(target_arch = "wasm32")]
fn canister_getrandom(buf: &mut [u8]) -> Result<(), getrandom::Error> {
    fill_random(buf).map_err(|_| getrandom::Error::UNSUPPORTED)
}

#[cfg(target_arch = "wasm32")]
getrandom::register_custom_getrandom!(canister_getrandom);
