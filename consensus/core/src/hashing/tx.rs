use super::HasherExtensions;
use crate::tx::{Transaction, TransactionId, TransactionInput, TransactionOutpoint, TransactionOutput};
use bitscript_hashes::{Hasher, HasherBase, TransactionHash};

/// Not intended for direct use by clients. Instead use `tx.id()`
pub fn id(tx: &Transaction) -> TransactionId {
    let mut hasher = TransactionHash::new();
    write_transaction(&mut hasher, tx);
    hasher.finalize()
}

/// Write the legacy wire encoding of the transaction into the provided hasher
pub(crate) fn write_transaction<T: HasherBase>(hasher: &mut T, tx: &Transaction) {
    hasher.write_i32(tx.version).write_len(tx.inputs.len());
    for input in tx.inputs.iter() {
        write_input(hasher, input);
    }

    hasher.write_len(tx.outputs.len());
    for output in tx.outputs.iter() {
        write_output(hasher, output);
    }

    hasher.write_u32(tx.lock_time);
}

#[inline(always)]
fn write_input<T: HasherBase>(hasher: &mut T, input: &TransactionInput) {
    write_outpoint(hasher, &input.previous_outpoint);
    hasher.write_var_bytes(&input.signature_script).write_u32(input.sequence);
}

#[inline(always)]
pub(crate) fn write_outpoint<T: HasherBase>(hasher: &mut T, outpoint: &TransactionOutpoint) {
    hasher.update(outpoint.transaction_id).write_u32(outpoint.index);
}

#[inline(always)]
pub(crate) fn write_output<T: HasherBase>(hasher: &mut T, output: &TransactionOutput) {
    hasher.write_u64(output.value).write_var_bytes(&output.script_public_key);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tx::{TransactionInput, TransactionOutpoint, TransactionOutput};
    use bitscript_hashes::Hash;
    use std::str::FromStr;

    #[test]
    fn test_id_is_double_sha_of_serialization() {
        let tx = Transaction::new(
            1,
            vec![TransactionInput::new(
                TransactionOutpoint::new(Hash::from_u64_word(7), 3),
                vec![0x51],
                crate::tx::SEQUENCE_FINAL,
            )],
            vec![TransactionOutput::new(50_000, vec![0x76, 0xa9])],
            0,
        );
        let expected = bitscript_hashes::sha256d(&tx.serialize());
        assert_eq!(id(&tx).as_bytes(), expected);
        assert_eq!(tx.id(), id(&tx));
    }

    #[test]
    fn test_genesis_coinbase_id() {
        // The mainnet genesis coinbase transaction
        let raw = "01000000010000000000000000000000000000000000000000000000000000000000000000ffffffff4d04ffff001d0104455468652054696d65732030332f4a616e2f32303039204368616e63656c6c6f72206f6e206272696e6b206f66207365636f6e64206261696c6f757420666f722062616e6b73ffffffff0100f2052a01000000434104678afdb0fe5548271967f1a67130b7105cd6a828e03909a67962e0ea1f61deb649f6bc3f4cef38c4f35504e51ec112de5c384df7ba0b8d578a4c702b6bf11d5fac00000000";
        let tx = Transaction::deserialize(&hex::decode(raw).unwrap()).unwrap();
        // Transaction ids are displayed byte-reversed by convention
        let mut displayed = tx.id().as_bytes();
        displayed.reverse();
        assert_eq!(
            Hash::from_bytes(displayed),
            Hash::from_str("4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b").unwrap()
        );
    }
}
