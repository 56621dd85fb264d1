use crate::error::VaultError;
use crate::storage::config::{get_admin_principal, get_min_cycles_threshold};

/// Checks if the canister has sufficient cycles.
///
/// # Errors
///
/// Returns `VaultError::CycleLow` if the balance is below the configured threshold.
pub fn check_cycles() -> Result<(), VaultError> {
    let balance = ic_cdk::api::canister_balance128();
    let threshold = get_min_cycles_threshold();
    if balance < threshold {
        log_warn!(
            "Cycle balance low: {} cycles, threshold: {}",
            balance,
            threshold
        );
        Err(VaultError::CycleLow)
    } else {
        Ok(())
    }
}

/// Named guard for admin-only endpoints.
pub fn admin_guard() -> Result<(), String> {
    if ic_cdk::caller() == get_admin_principal() {
        Ok(())
    } else {
        Err(VaultError::NotAuthorized("Caller is not the canister admin.".to_string()).to_string())
    }
}
