use crate::{
    opcodes::codes::{OpCheckSig, OpData20, OpDup, OpEqual, OpEqualVerify, OpHash160},
    script::Script,
    script_builder::{ScriptBuilder, ScriptBuilderResult},
};
use bitscript_hashes::hash160;
use std::iter::once;

mod multisig;

pub use multisig::{Error as MultisigCreateError, multisig_redeem_script};

/// Creates a script paying to a public key directly, as early coinbases did
pub fn pay_to_pubkey(pub_key: &[u8]) -> ScriptBuilderResult<Script> {
    Ok(ScriptBuilder::new().add_data(pub_key)?.add_op(OpCheckSig)?.build())
}

/// Creates a script paying to the hash160 of a public key
pub fn pay_to_pubkey_hash(pub_key_hash: &[u8; 20]) -> Script {
    Script::new(
        [OpDup, OpHash160, OpData20].into_iter().chain(pub_key_hash.iter().copied()).chain([OpEqualVerify, OpCheckSig]).collect(),
    )
}

/// Takes a redeem script and returns the pay-to-script-hash script committing to it
pub fn pay_to_script_hash(redeem_script: &Script) -> Script {
    let script_hash = hash160(redeem_script.as_bytes());
    Script::new([OpHash160, OpData20].into_iter().chain(script_hash).chain(once(OpEqual)).collect())
}

/// Signature script spending a pay-to-pubkey-hash output
pub fn pay_to_pubkey_hash_signature_script(signature: &[u8], pub_key: &[u8]) -> ScriptBuilderResult<Vec<u8>> {
    Ok(ScriptBuilder::new().add_data(signature)?.add_data(pub_key)?.drain())
}

/// Appends the push of the redeem script to the pushes satisfying it
pub fn pay_to_script_hash_signature_script(redeem_script: &Script, signature: Vec<u8>) -> ScriptBuilderResult<Vec<u8>> {
    let redeem_script_as_data = ScriptBuilder::new().add_data(redeem_script.as_bytes())?.drain();
    Ok(Vec::from_iter(signature.into_iter().chain(redeem_script_as_data)))
}

pub mod test_helpers {
    use super::*;
    use crate::opcodes::codes::OpTrue;
    use bitscript_consensus_core::tx::{SEQUENCE_FINAL, Transaction, TransactionId, TransactionInput, TransactionOutpoint, TransactionOutput};

    /// Returns a P2SH script paying to an anyone-can-spend redeem script, and
    /// that redeem script.
    pub fn op_true_script() -> (Script, Script) {
        let redeem_script = Script::new(vec![OpTrue]);
        let script_public_key = pay_to_script_hash(&redeem_script);
        (script_public_key, redeem_script)
    }

    /// Builds the classic pair of test transactions: a coinbase-like
    /// transaction crediting `script_public_key`, and a transaction whose only
    /// input spends that output with `signature_script`. Returns the spender.
    pub fn create_spending_transaction(signature_script: Vec<u8>, script_public_key: &Script) -> Transaction {
        let crediting = Transaction::new(
            1,
            vec![TransactionInput::new(TransactionOutpoint::new(TransactionId::default(), u32::MAX), vec![0, 0], SEQUENCE_FINAL)],
            vec![TransactionOutput::new(0, script_public_key.as_bytes().to_vec())],
            0,
        );

        Transaction::new(
            1,
            vec![TransactionInput::new(TransactionOutpoint::new(crediting.id(), 0), signature_script, SEQUENCE_FINAL)],
            vec![TransactionOutput::new(0, vec![])],
            0,
        )
    }
}
