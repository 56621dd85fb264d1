// src/backend/utils/crypto.rs

use crate::error::VaultError;
use crate::utils::rng::fill_random;
use sha2::{Digest, Sha256};

/// Generates a fresh vault id in UUID v4 text form.
pub fn generate_vault_id() -> Result<String, VaultError> {
    let mut bytes = [0u8; 16];
    fill_random(&mut bytes)?;
    Ok(uuid::Builder::from_random_bytes(bytes)
        .into_uuid()
        .hyphenated()
        .to_string())
}

/// Stable key for non-idempotent outcalls. Every replica issues the same
/// POST, so the provider must see one logical request.
pub fn idempotency_key(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(&hasher.finalize()[..16])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::rng::seed_internal_rng;

    #[test]
    fn vault_ids_are_v4_uuids() {
        seed_internal_rng([1u8; 32]);
        let id = generate_vault_id().unwrap();
        assert_eq!(id.len(), 36);
        assert_eq!(&id[14..15], "4");
        assert_ne!(id, generate_vault_id().unwrap());
    }

    #[test]
    fn idempotency_key_separates_parts() {
        assert_ne!(idempotency_key(&["ab", "c"]), idempotency_key(&["a", "bc"]));
        assert_eq!(idempotency_key(&["x"]).len(), 32);
    }
}
