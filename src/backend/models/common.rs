// src/backend/models/common.rs
use crate::error::VaultError;
use candid::CandidType;
use serde::{Deserialize, Serialize};

pub type VaultId = String;       // UUID v4 text, generated at creation
pub type Address = String;       // Aleo account address (aleo1...)
pub type TxId = String;          // Opaque id returned by the wallet relay
pub type ContentId = String;     // IPFS CID of the pinned payload

pub type TimestampMs = u64; // Milliseconds since epoch
pub type TimestampNs = u64; // Nanoseconds since epoch

/// How the unlock condition is phrased. Only the date is enforced; the other
/// kinds are recorded and passed on-chain as tags.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Copy, Default)]
pub enum UnlockType {
    #[default]
    DateTime,
    AgeBased,
    Inactivity,
    Custom,
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Copy, Default)]
pub enum VaultType {
    #[default]
    Message,
    File,
    Note,
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Copy, Default)]
pub enum SubscriptionTier {
    #[default]
    Free,
    Pro,
}

/// Small integer tags used on-chain and in stored records.
pub trait WireTag: Copy + 'static {
    const ALL: &'static [Self];
    const NAME: &'static str;

    fn tag(self) -> u8;

    fn from_tag(tag: u8) -> Result<Self, VaultError> {
        Self::ALL
            .iter()
            .copied()
            .find(|variant| variant.tag() == tag)
            .ok_or_else(|| VaultError::InvalidInput(format!("Unknown {} tag: {}", Self::NAME, tag)))
    }
}

impl WireTag for UnlockType {
    const ALL: &'static [Self] = &[
        UnlockType::DateTime,
        UnlockType::AgeBased,
        UnlockType::Inactivity,
        UnlockType::Custom,
    ];
    const NAME: &'static str = "unlock type";

    fn tag(self) -> u8 {
        match self {
            UnlockType::DateTime => 0,
            UnlockType::AgeBased => 1,
            UnlockType::Inactivity => 2,
            UnlockType::Custom => 3,
        }
    }
}

impl WireTag for VaultType {
    const ALL: &'static [Self] = &[VaultType::Message, VaultType::File, VaultType::Note];
    const NAME: &'static str = "vault type";

    fn tag(self) -> u8 {
        match self {
            VaultType::Message => 0,
            VaultType::File => 1,
            VaultType::Note => 2,
        }
    }
}

impl WireTag for SubscriptionTier {
    const ALL: &'static [Self] = &[SubscriptionTier::Free, SubscriptionTier::Pro];
    const NAME: &'static str = "subscription tier";

    fn tag(self) -> u8 {
        match self {
            SubscriptionTier::Free => 0,
            SubscriptionTier::Pro => 1,
        }
    }
}
