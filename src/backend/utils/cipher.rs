//! Payload ciphers.
//!
//! Two schemes live here:
//! - `xor-v0`: byte-wise XOR with a repeating key built from
//!   `owner + "_timevault_" + vault_id`. Deterministic, unsalted and
//!   unauthenticated: anyone who knows the owner address and vault id can
//!   read the payload. Kept so payloads pinned by earlier clients stay
//!   readable.
//! - `sealed-v1`: ChaCha20-Poly1305 with a random salt and nonce, keyed from
//!   a canister-held master secret. Used for every new vault.

use crate::error::VaultError;
use crate::utils::rng::fill_random;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use candid::CandidType;
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

pub const KEY_SEPARATOR: &str = "_timevault_";

const LEGACY_KEY_LEN: usize = 32;
const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const SEALED_DOMAIN: &[u8] = b"timevault/sealed-v1";

#[derive(CandidType, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CipherScheme {
    #[default]
    #[serde(rename = "xor-v0")]
    XorV0,
    #[serde(rename = "sealed-v1")]
    SealedV1,
}

/// The per-vault key string. Public information once a vault is listed.
pub fn derive_vault_key(owner: &str, vault_id: &str) -> String {
    format!("{}{}{}", owner, KEY_SEPARATOR, vault_id)
}

fn legacy_key_bytes(secret: &str) -> Vec<u8> {
    let mut key: String = secret.chars().take(LEGACY_KEY_LEN).collect();
    while key.chars().count() < LEGACY_KEY_LEN {
        key.push('0');
    }
    key.into_bytes()
}

fn xor_with(data: &[u8], key: &[u8]) -> Vec<u8> {
    data.iter()
        .zip(key.iter().cycle())
        .map(|(byte, k)| byte ^ k)
        .collect()
}

/// `xor-v0` encrypt. Returns base64.
pub fn encrypt(plaintext: &str, secret: &str) -> String {
    let key = legacy_key_bytes(secret);
    BASE64.encode(xor_with(plaintext.as_bytes(), &key))
}

/// `xor-v0` decrypt. A wrong key yields garbage text, not an error; only
/// malformed base64 fails.
pub fn decrypt(ciphertext: &str, secret: &str) -> Result<String, VaultError> {
    let bytes = BASE64
        .decode(ciphertext.trim())
        .map_err(|_| VaultError::DecryptionFailed)?;
    let key = legacy_key_bytes(secret);
    Ok(String::from_utf8_lossy(&xor_with(&bytes, &key)).into_owned())
}

/// `sealed-v1` cipher bound to the canister master secret.
pub struct SealedCipher {
    master: Zeroizing<[u8; 32]>,
}

impl SealedCipher {
    pub fn new(master: [u8; 32]) -> Self {
        Self { master: Zeroizing::new(master) }
    }

    fn derive_key(&self, salt: &[u8], secret: &str) -> Zeroizing<[u8; 32]> {
        let mut hasher = Sha256::new();
        hasher.update(SEALED_DOMAIN);
        hasher.update(&self.master[..]);
        hasher.update(salt);
        hasher.update(secret.as_bytes());
        let mut key = Zeroizing::new([0u8; 32]);
        key.copy_from_slice(&hasher.finalize());
        key
    }

    /// Returns base64 of `salt || nonce || ciphertext+tag`.
    pub fn seal(&self, plaintext: &str, secret: &str) -> Result<String, VaultError> {
        let mut salt = [0u8; SALT_LEN];
        let mut nonce = [0u8; NONCE_LEN];
        fill_random(&mut salt)?;
        fill_random(&mut nonce)?;

        let key = self.derive_key(&salt, secret);
        let cipher = ChaCha20Poly1305::new(Key::from_slice(&key[..]));
        let sealed = cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|_| VaultError::InternalError("AEAD encryption failed".to_string()))?;

        let mut out = Vec::with_capacity(SALT_LEN + NONCE_LEN + sealed.len());
        out.extend_from_slice(&salt);
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&sealed);
        Ok(BASE64.encode(out))
    }

    pub fn open(&self, sealed_b64: &str, secret: &str) -> Result<String, VaultError> {
        let data = BASE64
            .decode(sealed_b64.trim())
            .map_err(|_| VaultError::DecryptionFailed)?;
        if data.len() < SALT_LEN + NONCE_LEN {
            return Err(VaultError::DecryptionFailed);
        }
        let (salt, rest) = data.split_at(SALT_LEN);
        let (nonce, sealed) = rest.split_at(NONCE_LEN);

        let key = self.derive_key(salt, secret);
        let cipher = ChaCha20Poly1305::new(Key::from_slice(&key[..]));
        let plaintext = Zeroizing::new(
            cipher
                .decrypt(Nonce::from_slice(nonce), sealed)
                .map_err(|_| VaultError::DecryptionFailed)?,
        );
        String::from_utf8(plaintext.to_vec()).map_err(|_| VaultError::DecryptionFailed)
    }
}

/// Dispatches on the scheme tag carried by a payload.
pub fn seal_payload(
    scheme: CipherScheme,
    sealed: &SealedCipher,
    plaintext: &str,
    secret: &str,
) -> Result<String, VaultError> {
    match scheme {
        CipherScheme::XorV0 => Ok(encrypt(plaintext, secret)),
        CipherScheme::SealedV1 => sealed.seal(plaintext, secret),
    }
}

pub fn open_payload(
    scheme: CipherScheme,
    sealed: &SealedCipher,
    ciphertext: &str,
    secret: &str,
) -> Result<String, VaultError> {
    match scheme {
        CipherScheme::XorV0 => decrypt(ciphertext, secret),
        CipherScheme::SealedV1 => sealed.open(ciphertext, secret),
    }
}
