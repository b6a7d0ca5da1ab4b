use bitscript_hashes::{Hash, Hasher, TransactionHash};

use super::{
    HasherExtensions,
    sighash_type::SigHashType,
    tx::{write_outpoint, write_output},
};
use crate::tx::Transaction;

/// Returned instead of a digest when the signed input or its SIGHASH_SINGLE
/// output does not exist. Signatures over this value are valid consensus-wise.
pub const SIG_HASH_ONE: Hash = Hash::from_u64_word(1);

/// Value of the blanked outputs preceding the signed one under SIGHASH_SINGLE
const NULL_OUTPUT_VALUE: u64 = u64::MAX;

/// Calculates the legacy (pre-segwit) signature hash of `input_index`.
///
/// `script_code` is written in place of the signed input's signature script.
/// Callers are expected to have already removed the signature itself and any
/// OP_CODESEPARATOR from it.
pub fn calc_legacy_signature_hash(tx: &Transaction, input_index: usize, script_code: &[u8], hash_type: SigHashType) -> Hash {
    if input_index >= tx.inputs.len() {
        return SIG_HASH_ONE;
    }
    if hash_type.is_sighash_single() && input_index >= tx.outputs.len() {
        return SIG_HASH_ONE;
    }

    let mut hasher = TransactionHash::new();
    hasher.write_i32(tx.version);

    if hash_type.is_sighash_anyone_can_pay() {
        let input = &tx.inputs[input_index];
        hasher.write_len(1);
        write_outpoint(&mut hasher, &input.previous_outpoint);
        hasher.write_var_bytes(script_code).write_u32(input.sequence);
    } else {
        hasher.write_len(tx.inputs.len());
        for (i, input) in tx.inputs.iter().enumerate() {
            write_outpoint(&mut hasher, &input.previous_outpoint);
            if i == input_index {
                hasher.write_var_bytes(script_code).write_u32(input.sequence);
            } else {
                // Other inputs are free to change their sequence under NONE and SINGLE
                let sequence = if hash_type.is_sighash_none() || hash_type.is_sighash_single() { 0 } else { input.sequence };
                hasher.write_var_bytes(&[]).write_u32(sequence);
            }
        }
    }

    if hash_type.is_sighash_none() {
        hasher.write_len(0);
    } else if hash_type.is_sighash_single() {
        hasher.write_len(input_index + 1);
        for _ in 0..input_index {
            hasher.write_u64(NULL_OUTPUT_VALUE).write_var_bytes(&[]);
        }
        write_output(&mut hasher, &tx.outputs[input_index]);
    } else {
        hasher.write_len(tx.outputs.len());
        for output in tx.outputs.iter() {
            write_output(&mut hasher, output);
        }
    }

    hasher.write_u32(tx.lock_time).write_u32(hash_type.to_u8() as u32);
    hasher.finalize()
}
