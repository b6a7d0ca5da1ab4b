use crate::opcodes::codes::OpCheckMultiSig;
use crate::script::Script;
use crate::script_builder::{ScriptBuilder, ScriptBuilderError};
use bitscript_consensus_core::config::constants::consensus::MAX_PUB_KEYS_PER_MULTISIG;
use thiserror::Error;

#[derive(Error, PartialEq, Eq, Debug, Clone)]
pub enum Error {
    #[error("too many required signatures")]
    ErrTooManyRequiredSigs,
    #[error(transparent)]
    ScriptBuilderError(#[from] ScriptBuilderError),
    #[error("provided public keys should not be empty")]
    EmptyKeys,
    #[error("{0} public keys exceed the multisig maximum of {MAX_PUB_KEYS_PER_MULTISIG}")]
    TooManyKeys(usize),
}

/// Generates a `required`-of-n bare multisig redeem script.
///
/// Keys are taken in the given order; signatures spending the script must be
/// supplied in that same order.
///
/// # Errors
///
/// * No public keys, or more than [`MAX_PUB_KEYS_PER_MULTISIG`].
/// * `required` larger than the number of keys.
pub fn multisig_redeem_script<K: AsRef<[u8]>>(pub_keys: &[K], required: usize) -> Result<Script, Error> {
    if pub_keys.is_empty() {
        return Err(Error::EmptyKeys);
    }
    if pub_keys.len() > MAX_PUB_KEYS_PER_MULTISIG {
        return Err(Error::TooManyKeys(pub_keys.len()));
    }
    if pub_keys.len() < required {
        return Err(Error::ErrTooManyRequiredSigs);
    }

    let mut builder = ScriptBuilder::new();
    builder.add_i64(required as i64)?;
    for pub_key in pub_keys {
        builder.add_data(pub_key.as_ref())?;
    }
    builder.add_i64(pub_keys.len() as i64)?;
    builder.add_op(OpCheckMultiSig)?;
    Ok(builder.build())
}
