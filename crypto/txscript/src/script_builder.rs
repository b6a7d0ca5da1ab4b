use crate::{
    number::ScriptNum,
    opcodes::codes::*,
    script::{OP_1_NEGATE_VAL, OP_SMALL_INT_MAX_VAL, Script, data_push_opcode},
};
use bitscript_consensus_core::config::constants::consensus::{MAX_SCRIPT_ELEMENT_SIZE, MAX_SCRIPT_SIZE};
use std::iter::once;
use thiserror::Error;

/// Initial capacity of the backing buffer, enough for every standard script
const DEFAULT_SCRIPT_ALLOC: usize = 512;

#[derive(Error, PartialEq, Eq, Debug, Clone, Copy)]
pub enum ScriptBuilderError {
    #[error("adding opcode {0} would exceed the maximum allowed script length of {MAX_SCRIPT_SIZE}")]
    OpCodeRejected(u8),

    #[error("adding {0} opcodes would exceed the maximum allowed script length of {MAX_SCRIPT_SIZE}")]
    OpCodesRejected(usize),

    #[error("adding {0} bytes of data would exceed the maximum allowed script length of {MAX_SCRIPT_SIZE}")]
    DataRejected(usize),

    #[error("adding a data element of {0} bytes exceed the maximum allowed script element size of {MAX_SCRIPT_ELEMENT_SIZE}")]
    ElementExceedsMaxSize(usize),

    #[error("adding integer {0} would exceed the maximum allowed script length of {MAX_SCRIPT_SIZE}")]
    IntegerRejected(i64),
}
pub type ScriptBuilderResult<T> = std::result::Result<T, ScriptBuilderError>;

/// ScriptBuilder builds scripts out of opcodes, integers and data, always
/// picking the minimal push encoding. It does not check that the script makes
/// sense, only that every push stays within the engine's size limits.
///
/// A 2-of-3 multisig redeem script:
///
/// ```
/// use bitscript_txscript::opcodes::codes::*;
/// use bitscript_txscript::script_builder::{ScriptBuilderResult, ScriptBuilder};
/// fn build_multisig_script(pub_key1: &[u8], pub_key2: &[u8], pub_key3: &[u8]) -> ScriptBuilderResult<Vec<u8>> {
///     Ok(ScriptBuilder::new()
///         .add_op(Op2)?
///         .add_data(pub_key1)?.add_data(pub_key2)?.add_data(pub_key3)?
///         .add_op(Op3)?
///         .add_op(OpCheckMultiSig)?
///         .drain())
/// }
/// ```
pub struct ScriptBuilder {
    script: Vec<u8>,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self { script: Vec::with_capacity(DEFAULT_SCRIPT_ALLOC) }
    }

    pub fn script(&self) -> &[u8] {
        &self.script
    }

    pub fn drain(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.script)
    }

    /// Takes the built bytes as a parsed [`Script`]
    pub fn build(&mut self) -> Script {
        Script::new(self.drain())
    }

    pub fn add_op(&mut self, opcode: u8) -> ScriptBuilderResult<&mut Self> {
        if self.script.len() >= MAX_SCRIPT_SIZE {
            return Err(ScriptBuilderError::OpCodeRejected(opcode));
        }

        self.script.push(opcode);
        Ok(self)
    }

    pub fn add_ops(&mut self, opcodes: &[u8]) -> ScriptBuilderResult<&mut Self> {
        if self.script.len() + opcodes.len() > MAX_SCRIPT_SIZE {
            return Err(ScriptBuilderError::OpCodesRejected(opcodes.len()));
        }

        self.script.extend_from_slice(opcodes);
        Ok(self)
    }

    /// Returns the number of bytes the canonical encoding of the data will take.
    pub fn canonical_data_size(data: &[u8]) -> usize {
        let data_len = data.len();

        // Single small numbers are pushed with a one byte opcode
        if data_len == 0 || (data_len == 1 && (data[0] <= OP_SMALL_INT_MAX_VAL || data[0] == OP_1_NEGATE_VAL)) {
            return 1;
        }

        data_len
            + match data_push_opcode(data_len) {
                OpPushData1 => 2,
                OpPushData2 => 3,
                OpPushData4 => 5,
                _ => 1,
            }
    }

    /// Appends the minimal push of `data` without checking any limit
    fn add_raw_data(&mut self, data: &[u8]) -> &mut Self {
        let data_len = data.len();

        if data_len == 0 || (data_len == 1 && data[0] == 0) {
            self.script.push(Op0);
            return self;
        } else if data_len == 1 && data[0] <= OP_SMALL_INT_MAX_VAL {
            self.script.push((Op1 - 1) + data[0]);
            return self;
        } else if data_len == 1 && data[0] == OP_1_NEGATE_VAL {
            self.script.push(Op1Negate);
            return self;
        }

        match data_push_opcode(data_len) {
            OpPushData1 => self.script.extend(once(OpPushData1).chain(once(data_len as u8))),
            OpPushData2 => self.script.extend(once(OpPushData2).chain((data_len as u16).to_le_bytes())),
            OpPushData4 => self.script.extend(once(OpPushData4).chain((data_len as u32).to_le_bytes())),
            opcode => self.script.push(opcode),
        }
        self.script.extend(data);
        self
    }

    /// Skips the element size check, for scripts that are meant to fail
    #[cfg(test)]
    pub fn add_data_unchecked(&mut self, data: &[u8]) -> &mut Self {
        self.add_raw_data(data)
    }

    /// Pushes `data` with the canonical opcode for its length.
    ///
    /// Pushes larger than [`MAX_SCRIPT_ELEMENT_SIZE`] are rejected since the
    /// engine would never execute them, as is anything that would grow the
    /// script past [`MAX_SCRIPT_SIZE`].
    pub fn add_data(&mut self, data: &[u8]) -> ScriptBuilderResult<&mut Self> {
        let data_size = Self::canonical_data_size(data);

        if self.script.len() + data_size > MAX_SCRIPT_SIZE {
            return Err(ScriptBuilderError::DataRejected(data_size));
        }

        let data_len = data.len();
        if data_len > MAX_SCRIPT_ELEMENT_SIZE {
            return Err(ScriptBuilderError::ElementExceedsMaxSize(data_len));
        }

        Ok(self.add_raw_data(data))
    }

    pub fn add_i64(&mut self, val: i64) -> ScriptBuilderResult<&mut Self> {
        if self.script.len() + 1 > MAX_SCRIPT_SIZE {
            return Err(ScriptBuilderError::IntegerRejected(val));
        }

        if val == 0 {
            self.script.push(Op0);
            return Ok(self);
        }
        if val == -1 || (1..=16).contains(&val) {
            self.script.push(((Op1 as i64 - 1) + val) as u8);
            return Ok(self);
        }

        self.add_data(&ScriptNum::new(val).to_bytes())
    }

    /// Pushes an absolute lock time operand for OP_CHECKLOCKTIMEVERIFY
    pub fn add_lock_time(&mut self, lock_time: u32) -> ScriptBuilderResult<&mut Self> {
        self.add_i64(lock_time as i64)
    }

    /// Pushes a relative lock time operand for OP_CHECKSEQUENCEVERIFY
    pub fn add_sequence(&mut self, sequence: u32) -> ScriptBuilderResult<&mut Self> {
        self.add_i64(sequence as i64)
    }
}

impl Default for ScriptBuilder {
    fn default() -> Self {
        Self::new()
    }
}
