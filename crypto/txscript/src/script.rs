use crate::{
    number::ScriptNum,
    opcodes::{self, codes},
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};
use thiserror::Error;

/// First value in the range formed by the "small integer" Op# opcodes
pub const OP_SMALL_INT_MIN_VAL: u8 = 1;
/// Last value in the range formed by the "small integer" Op# opcodes
pub const OP_SMALL_INT_MAX_VAL: u8 = 16;
/// Minus 1 value
pub const OP_1_NEGATE_VAL: u8 = 0x81;

/// One decoded instruction of a script
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Operation {
    code: u8,
    data: Vec<u8>,
    offset: usize,
    valid: bool,
}

impl Operation {
    /// A non-push operation
    pub fn new(code: u8) -> Self {
        Self { code, data: vec![], offset: 0, valid: true }
    }

    /// A data push using the shortest data-carrying opcode for `data`
    pub fn push(data: Vec<u8>) -> Self {
        Self { code: data_push_opcode(data.len()), data, offset: 0, valid: true }
    }

    /// A push of `data` with an explicit push opcode. Returns `None` when the
    /// opcode cannot carry that many bytes.
    pub fn push_with(code: u8, data: Vec<u8>) -> Option<Self> {
        let fits = match code {
            codes::OpFalse => data.is_empty(),
            codes::OpData1..=codes::OpData75 => data.len() == code as usize,
            codes::OpPushData1 => data.len() <= u8::MAX as usize,
            codes::OpPushData2 => data.len() <= u16::MAX as usize,
            codes::OpPushData4 => data.len() <= u32::MAX as usize,
            _ => false,
        };
        fits.then_some(Self { code, data, offset: 0, valid: true })
    }

    pub fn code(&self) -> u8 {
        self.code
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Byte offset of the opcode within its script
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// False for a push whose declared length runs past the end of the script
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn is_push(&self) -> bool {
        opcodes::is_push(self.code)
    }

    pub fn is_counted(&self) -> bool {
        opcodes::is_counted(self.code)
    }

    pub fn is_disabled(&self) -> bool {
        opcodes::is_disabled(self.code)
    }

    pub fn is_conditional(&self) -> bool {
        opcodes::is_conditional(self.code)
    }

    pub fn is_always_illegal(&self) -> bool {
        opcodes::is_always_illegal(self.code)
    }

    pub fn is_oversized(&self, max_element_size: usize) -> bool {
        self.data.len() > max_element_size
    }

    /// Checks that a data push uses the shortest possible encoding
    pub fn check_minimal_data_push(&self) -> Result<(), String> {
        let data_len = self.data.len();
        let opcode = self.code;

        if data_len == 0 {
            if opcode != codes::OpFalse {
                return Err(format!("zero length data push is encoded with opcode {} instead of OP_0", opcodes::name(opcode)));
            }
        } else if data_len == 1 && (OP_SMALL_INT_MIN_VAL..=OP_SMALL_INT_MAX_VAL).contains(&self.data[0]) {
            if opcode != codes::OpTrue + self.data[0] - 1 {
                return Err(format!(
                    "data push of the value {} encoded with opcode {} instead of OP_{}",
                    self.data[0],
                    opcodes::name(opcode),
                    self.data[0]
                ));
            }
        } else if data_len == 1 && self.data[0] == OP_1_NEGATE_VAL {
            if opcode != codes::Op1Negate {
                return Err(format!("data push of the value -1 encoded with opcode {} instead of OP_1NEGATE", opcodes::name(opcode)));
            }
        } else if opcode != data_push_opcode(data_len) {
            return Err(format!(
                "data push of {} bytes encoded with opcode {} instead of {}",
                data_len,
                opcodes::name(opcode),
                opcodes::name(data_push_opcode(data_len))
            ));
        }
        Ok(())
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.push(self.code);
        if self.valid {
            match self.code {
                codes::OpPushData1 => out.push(self.data.len() as u8),
                codes::OpPushData2 => out.extend_from_slice(&(self.data.len() as u16).to_le_bytes()),
                codes::OpPushData4 => out.extend_from_slice(&(self.data.len() as u32).to_le_bytes()),
                _ => {}
            }
        }
        // Invalid operations carry the raw remainder of their script
        out.extend_from_slice(&self.data);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len() + 5);
        self.write_to(&mut out);
        out
    }

    /// For an invalid operation, the number of bytes its opcode requires after
    /// itself and the number actually remaining
    pub(crate) fn truncation(&self) -> (usize, usize) {
        let remaining = self.data.len();
        let prefix = length_prefix_size(self.code);
        if remaining < prefix {
            return (prefix, remaining);
        }
        let declared = match prefix {
            0 => self.code as usize,
            _ => read_length_prefix(&self.data[..prefix]),
        };
        (prefix + declared, remaining)
    }

    /// Decodes the operation starting at `offset`; the second value is the
    /// offset following it.
    fn decode(bytes: &[u8], offset: usize) -> (Self, usize) {
        let code = bytes[offset];
        let start = offset + 1;
        let prefix = length_prefix_size(code);

        let invalid = || (Self { code, data: bytes[start..].to_vec(), offset, valid: false }, bytes.len());
        if bytes.len() - start < prefix {
            return invalid();
        }
        let declared = match prefix {
            0 if code <= codes::OpData75 => code as usize,
            0 => 0,
            _ => read_length_prefix(&bytes[start..start + prefix]),
        };
        let data_start = start + prefix;
        if bytes.len() - data_start < declared {
            return invalid();
        }
        let end = data_start + declared;
        (Self { code, data: bytes[data_start..end].to_vec(), offset, valid: true }, end)
    }
}

fn length_prefix_size(code: u8) -> usize {
    match code {
        codes::OpPushData1 => 1,
        codes::OpPushData2 => 2,
        codes::OpPushData4 => 4,
        _ => 0,
    }
}

/// Little endian length of a PUSHDATA prefix
fn read_length_prefix(prefix: &[u8]) -> usize {
    prefix.iter().rev().fold(0usize, |acc, b| (acc << 8) | *b as usize)
}

/// The data-carrying opcode a minimal push of `len` bytes uses, ignoring the
/// small integer forms.
pub fn data_push_opcode(len: usize) -> u8 {
    match len {
        0 => codes::OpFalse,
        1..=75 => len as u8,
        76..=0xff => codes::OpPushData1,
        0x100..=0xffff => codes::OpPushData2,
        _ => codes::OpPushData4,
    }
}

/// A parsed script. The raw bytes are retained as given.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Script {
    bytes: Vec<u8>,
    operations: Vec<Operation>,
    valid: bool,
}

impl Script {
    pub fn new(bytes: Vec<u8>) -> Self {
        let mut operations = Vec::new();
        let mut offset = 0;
        let mut valid = true;
        while offset < bytes.len() {
            let (op, next) = Operation::decode(&bytes, offset);
            valid &= op.valid;
            operations.push(op);
            offset = next;
        }
        Self { bytes, operations, valid }
    }

    pub fn from_operations(operations: impl IntoIterator<Item = Operation>) -> Self {
        let mut bytes = Vec::new();
        for op in operations {
            op.write_to(&mut bytes);
        }
        Self::new(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Script size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// False when the last push is truncated
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn is_push_only(&self) -> bool {
        self.operations.iter().all(|op| op.valid && op.is_push())
    }

    /// OP_HASH160 <20 bytes> OP_EQUAL
    pub fn is_pay_to_script_hash(&self) -> bool {
        self.bytes.len() == 23
            && self.bytes[0] == codes::OpHash160
            && self.bytes[1] == codes::OpData20
            && self.bytes[22] == codes::OpEqual
    }

    /// Index of the operation that starts at byte `offset`
    pub fn operation_index(&self, offset: usize) -> Option<usize> {
        self.operations.binary_search_by_key(&offset, |op| op.offset).ok()
    }

    /// The script made of the operations from `index` onward
    pub fn subscript_from(&self, index: usize) -> Script {
        match self.operations.get(index) {
            Some(op) => Script::new(self.bytes[op.offset..].to_vec()),
            None => Script::default(),
        }
    }

    /// Removes every opcode-aligned occurrence of the canonical push of `data`
    pub fn find_and_delete(&self, data: &[u8]) -> Script {
        if data.is_empty() {
            return self.clone();
        }
        let pattern = Operation::push(data.to_vec()).to_bytes();

        let mut result = Vec::with_capacity(self.bytes.len());
        let mut found = false;
        let mut copied_to = 0;
        let mut cursor = 0;
        loop {
            result.extend_from_slice(&self.bytes[copied_to..cursor]);
            while self.bytes[cursor..].starts_with(&pattern) {
                cursor += pattern.len();
                found = true;
            }
            copied_to = cursor;
            if cursor >= self.bytes.len() {
                break;
            }
            let (op, next) = Operation::decode(&self.bytes, cursor);
            if !op.valid {
                break;
            }
            cursor = next;
        }

        if !found {
            return self.clone();
        }
        result.extend_from_slice(&self.bytes[copied_to..]);
        Script::new(result)
    }

    pub fn strip_code_separators(&self) -> Script {
        if !self.operations.iter().any(|op| op.code == codes::OpCodeSeparator) {
            return self.clone();
        }
        Script::from_operations(self.operations.iter().filter(|op| op.code != codes::OpCodeSeparator).cloned())
    }
}

impl Default for Script {
    fn default() -> Self {
        Self::new(vec![])
    }
}

impl From<Vec<u8>> for Script {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl AsRef<[u8]> for Script {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if !self.valid {
            return write!(f, "0x{:02x}{}", self.code, hex::encode(&self.data));
        }
        match self.code {
            codes::OpFalse => write!(f, "0"),
            codes::OpData1..=codes::OpData75 => write!(f, "[{}]", hex::encode(&self.data)),
            codes::OpPushData1 | codes::OpPushData2 | codes::OpPushData4 => {
                if self.code == data_push_opcode(self.data.len()) {
                    write!(f, "[{}]", hex::encode(&self.data))
                } else {
                    let width = match self.code {
                        codes::OpPushData1 => 1,
                        codes::OpPushData2 => 2,
                        _ => 4,
                    };
                    write!(f, "[{}.{}]", width, hex::encode(&self.data))
                }
            }
            code => write!(f, "{}", opcodes::name(code)),
        }
    }
}

impl Display for Script {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, op) in self.operations.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{op}")?;
        }
        Ok(())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptTextError {
    #[error("unknown opcode name '{0}'")]
    UnknownOpcode(String),

    #[error("invalid hex in '{0}'")]
    InvalidHex(String),

    #[error("push of {1} bytes does not fit in a {0} byte length prefix")]
    InvalidPushWidth(String, usize),
}

impl FromStr for Script {
    type Err = ScriptTextError;

    /// Parses the mnemonic form, e.g. `"DUP HASH160 [89ab...] EQUALVERIFY CHECKSIG"`.
    ///
    /// Besides what [`Display`] produces this accepts `OP_` prefixed and lower
    /// case names, `'text'` pushes, and `0x..` tokens which are copied raw.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = Vec::new();
        for token in s.split_whitespace() {
            if let Ok(number) = token.parse::<i64>() {
                match number {
                    -1 => bytes.push(codes::Op1Negate),
                    0 => bytes.push(codes::OpFalse),
                    1..=16 => bytes.push(codes::OpTrue + number as u8 - 1),
                    _ => Operation::push(ScriptNum::new(number).to_bytes()).write_to(&mut bytes),
                }
            } else if let Some(raw) = token.strip_prefix("0x") {
                bytes.extend(hex::decode(raw).map_err(|_| ScriptTextError::InvalidHex(token.to_string()))?);
            } else if let Some(inner) = token.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
                let op = match inner.split_once('.') {
                    Some((width, data)) => {
                        let data = hex::decode(data).map_err(|_| ScriptTextError::InvalidHex(token.to_string()))?;
                        let len = data.len();
                        let code = match width {
                            "1" => codes::OpPushData1,
                            "2" => codes::OpPushData2,
                            "4" => codes::OpPushData4,
                            _ => return Err(ScriptTextError::InvalidPushWidth(width.to_string(), len)),
                        };
                        Operation::push_with(code, data).ok_or(ScriptTextError::InvalidPushWidth(width.to_string(), len))?
                    }
                    None => Operation::push(hex::decode(inner).map_err(|_| ScriptTextError::InvalidHex(token.to_string()))?),
                };
                op.write_to(&mut bytes);
            } else if let Some(text) = token.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')) {
                Operation::push(text.as_bytes().to_vec()).write_to(&mut bytes);
            } else {
                bytes.push(opcodes::from_name(token).ok_or_else(|| ScriptTextError::UnknownOpcode(token.to_string()))?);
            }
        }
        Ok(Script::new(bytes))
    }
}

impl Serialize for Script {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(&self.bytes))
    }
}

impl<'de> Deserialize<'de> for Script {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map(Script::new).map_err(serde::de::Error::custom)
    }
}
