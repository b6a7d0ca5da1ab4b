mod codec;

use crate::{errors::SerializationResult, hashing};
use bitscript_hashes::Hash;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Represents the ID of a transaction
pub type TransactionId = Hash;

/// Sequence value that disables lock-time and relative lock-time checks for an input
pub const SEQUENCE_FINAL: u32 = 0xffff_ffff;

/// When set, the sequence number carries no relative lock-time (BIP68)
pub const SEQUENCE_LOCKTIME_DISABLE_FLAG: u32 = 1 << 31;

/// When set, the relative lock-time is measured in 512 second units instead of blocks
pub const SEQUENCE_LOCKTIME_TYPE_FLAG: u32 = 1 << 22;

/// Bits of the sequence number holding the relative lock-time value
pub const SEQUENCE_LOCKTIME_MASK: u32 = 0x0000_ffff;

/// Represents a transaction outpoint
#[derive(Eq, Hash, PartialEq, Debug, Copy, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionOutpoint {
    pub transaction_id: TransactionId,
    pub index: u32,
}

impl TransactionOutpoint {
    pub fn new(transaction_id: TransactionId, index: u32) -> Self {
        Self { transaction_id, index }
    }
}

impl Display for TransactionOutpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.transaction_id, self.index)
    }
}

/// Represents a transaction input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInput {
    pub previous_outpoint: TransactionOutpoint,
    #[serde(with = "hex::serde")]
    pub signature_script: Vec<u8>,
    pub sequence: u32,
}

impl TransactionInput {
    pub fn new(previous_outpoint: TransactionOutpoint, signature_script: Vec<u8>, sequence: u32) -> Self {
        Self { previous_outpoint, signature_script, sequence }
    }
}

/// Represents a transaction output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionOutput {
    pub value: u64,
    #[serde(with = "hex::serde")]
    pub script_public_key: Vec<u8>,
}

impl TransactionOutput {
    pub fn new(value: u64, script_public_key: Vec<u8>) -> Self {
        Self { value, script_public_key }
    }
}

/// Represents a legacy (non-witness) transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub version: i32,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub lock_time: u32,
}

impl Transaction {
    pub fn new(version: i32, inputs: Vec<TransactionInput>, outputs: Vec<TransactionOutput>, lock_time: u32) -> Self {
        Self { version, inputs, outputs, lock_time }
    }

    /// Double SHA-256 of the wire encoding, in internal byte order
    pub fn id(&self) -> TransactionId {
        hashing::tx::id(self)
    }

    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].previous_outpoint == TransactionOutpoint::new(Hash::default(), u32::MAX)
    }

    /// Legacy wire encoding
    pub fn serialize(&self) -> Vec<u8> {
        codec::serialize(self)
    }

    pub fn deserialize(bytes: &[u8]) -> SerializationResult<Self> {
        codec::deserialize(bytes)
    }
}
