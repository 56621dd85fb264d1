// src/backend/adapter/aleo_program.rs
//! Typed builders for the TimeVault Aleo program calls. Argument order here
//! must match the deployed program signatures.

use crate::error::VaultError;
use crate::models::aleo_value::{encode_cid, AleoValue};
use crate::models::common::{Address, SubscriptionTier, UnlockType, VaultType, WireTag};
use crate::utils::time::ms_to_secs;
use serde::Serialize;

pub const CREATE_VAULT_FN: &str = "create_vault";
pub const UNLOCK_VAULT_FN: &str = "unlock_vault";
pub const SUBSCRIBE_FN: &str = "subscribe";

/// Flat fee, in credits, attached to every execution.
pub const DEFAULT_FEE_CREDITS: f64 = 3.5;

/// One program execution, ready for the relay.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgramCall {
    pub program_id: String,
    pub function: String,
    pub inputs: Vec<AleoValue>,
    pub fee: f64,
}

/// Relay wire form: every input rendered as an Aleo literal.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteBody<'a> {
    pub program_id: &'a str,
    pub function_id: &'a str,
    pub fee: f64,
    pub inputs: Vec<String>,
    pub signer: &'a str,
}

impl ProgramCall {
    fn new(program_id: &str, function: &str, inputs: Vec<AleoValue>) -> Self {
        Self {
            program_id: program_id.to_string(),
            function: function.to_string(),
            inputs,
            fee: DEFAULT_FEE_CREDITS,
        }
    }

    pub fn wire_inputs(&self) -> Vec<String> {
        self.inputs.iter().map(ToString::to_string).collect()
    }

    pub fn to_body<'a>(&'a self, signer: &'a str) -> ExecuteBody<'a> {
        ExecuteBody {
            program_id: &self.program_id,
            function_id: &self.function,
            fee: self.fee,
            inputs: self.wire_inputs(),
            signer,
        }
    }
}

pub struct CreateVaultCall<'a> {
    pub recipient: &'a Address,
    pub ipfs_hash: &'a str,
    pub unlock_time_ms: u64,
    pub unlock_type: UnlockType,
    pub vault_type: VaultType,
    pub created_at_ms: u64,
}

impl CreateVaultCall<'_> {
    pub fn build(&self, program_id: &str) -> Result<ProgramCall, VaultError> {
        let (part1, part2) = encode_cid(self.ipfs_hash)?;
        Ok(ProgramCall::new(
            program_id,
            CREATE_VAULT_FN,
            vec![
                AleoValue::Address(self.recipient.clone()),
                part1,
                part2,
                AleoValue::U64(ms_to_secs(self.unlock_time_ms)),
                AleoValue::U8(self.unlock_type.tag()),
                AleoValue::U8(self.vault_type.tag()),
                AleoValue::U64(ms_to_secs(self.created_at_ms)),
            ],
        ))
    }
}

pub struct UnlockVaultCall {
    pub on_chain_vault_id: u64,
    pub now_ms: u64,
}

impl UnlockVaultCall {
    pub fn build(&self, program_id: &str) -> ProgramCall {
        ProgramCall::new(
            program_id,
            UNLOCK_VAULT_FN,
            vec![
                AleoValue::U64(self.on_chain_vault_id),
                AleoValue::U64(ms_to_secs(self.now_ms)),
            ],
        )
    }
}

pub struct SubscribeCall {
    pub tier: SubscriptionTier,
    pub now_ms: u64,
}

impl SubscribeCall {
    pub fn build(&self, program_id: &str) -> ProgramCall {
        ProgramCall::new(
            program_id,
            SUBSCRIBE_FN,
            vec![
                AleoValue::U8(self.tier.tag()),
                AleoValue::U64(ms_to_secs(self.now_ms)),
            ],
        )
    }
}
