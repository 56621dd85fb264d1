// src/backend/models/payload.rs
//! JSON document pinned to IPFS for each vault. Field names follow the
//! camelCase layout existing clients already pinned.

use crate::models::common::{Address, TimestampMs, VaultId};
use crate::utils::cipher::CipherScheme;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VaultPayload {
    pub title: String,
    /// Base64 ciphertext.
    pub content: String,
    /// Vault type tag as text, the way the create form submitted it.
    #[serde(rename = "type")]
    pub kind: String,
    pub recipient: Address,
    pub vault_id: VaultId,
    pub created_at: TimestampMs,
    /// Absent on payloads written before the sealed scheme existed.
    #[serde(default)]
    pub scheme: CipherScheme,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_payload_defaults_to_xor() {
        let raw = r#"{"title":"t","content":"AAEC","type":"0","recipient":"aleo1r","vaultId":"v","createdAt":5}"#;
        let payload: VaultPayload = serde_json::from_str(raw).unwrap();
        assert_eq!(payload.scheme, CipherScheme::XorV0);
        assert_eq!(payload.vault_id, "v");
        assert_eq!(payload.kind, "0");
    }

    #[test]
    fn writes_camel_case_with_scheme() {
        let payload = VaultPayload {
            title: "t".into(),
            content: "c".into(),
            kind: "2".into(),
            recipient: "aleo1r".into(),
            vault_id: "v".into(),
            created_at: 7,
            scheme: CipherScheme::SealedV1,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["vaultId"], "v");
        assert_eq!(json["createdAt"], 7);
        assert_eq!(json["type"], "2");
        assert_eq!(json["scheme"], "sealed-v1");
    }
}
