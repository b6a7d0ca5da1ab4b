use crate::TxScriptError;
use std::fmt::Display;

/// A number as seen by arithmetic opcodes.
///
/// Encoded little-endian with the sign in the most significant bit of the last
/// byte. Operands are bounded in length (4 bytes, 5 for lock times), results of
/// arithmetic are not, so a result may be unusable as a further operand.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct ScriptNum(i64);

impl ScriptNum {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> i64 {
        self.0
    }

    /// Decodes a stack item into a number.
    ///
    /// Fails when the item is longer than `max_size` bytes, or when
    /// `require_minimal` is set and the item carries redundant bytes.
    pub fn from_bytes(bytes: &[u8], max_size: usize, require_minimal: bool) -> Result<Self, TxScriptError> {
        if bytes.len() > max_size {
            return Err(TxScriptError::NumberTooBig(format!(
                "numeric value encoded as {:x?} is {} bytes which exceeds the max allowed of {}",
                bytes,
                bytes.len(),
                max_size
            )));
        }
        if require_minimal {
            check_minimal_data_encoding(bytes)?;
        }
        if bytes.is_empty() {
            return Ok(Self(0));
        }
        if bytes.len() > size_of::<i64>() {
            return Err(TxScriptError::NumberTooBig(format!("numeric value encoded as {bytes:x?} is longer than 8 bytes")));
        }

        let msb = bytes[bytes.len() - 1];
        let sign = 1 - 2 * ((msb >> 7) as i64);
        let first_byte = (msb & 0x7f) as i64;
        let magnitude = bytes[..bytes.len() - 1].iter().rev().map(|v| *v as i64).fold(first_byte, |accum, item| (accum << 8) + item);
        Ok(Self(magnitude * sign))
    }

    /// Minimal encoding of the number
    pub fn to_bytes(self) -> Vec<u8> {
        if self.0 == 0 {
            return vec![];
        }

        let negative = self.0 < 0;
        let mut magnitude = self.0.unsigned_abs();
        let mut bytes = Vec::with_capacity(9);
        while magnitude > 0 {
            bytes.push((magnitude & 0xff) as u8);
            magnitude >>= 8;
        }

        // The sign lives in the top bit of the last byte; add a byte when that bit is taken
        let last = bytes.len() - 1;
        if bytes[last] & 0x80 != 0 {
            bytes.push(if negative { 0x80 } else { 0x00 });
        } else if negative {
            bytes[last] |= 0x80;
        }
        bytes
    }

    /// Saturating conversion used for stack positions and counts
    pub fn to_i32(self) -> i32 {
        self.0.clamp(i32::MIN as i64, i32::MAX as i64) as i32
    }
}

impl From<i64> for ScriptNum {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<ScriptNum> for i64 {
    fn from(value: ScriptNum) -> Self {
        value.0
    }
}

impl Display for ScriptNum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub(crate) fn check_minimal_data_encoding(v: &[u8]) -> Result<(), TxScriptError> {
    if v.is_empty() {
        return Ok(());
    }

    // If the most significant byte, excluding the sign bit, is zero then the
    // encoding is not minimal. This also rejects negative zero, [0x80].
    if v[v.len() - 1] & 0x7f == 0 {
        // Unless the previous byte has its top bit set and would otherwise be
        // read as the sign, e.g. +-255 encode as 0xff00 and 0xff80.
        if v.len() == 1 || v[v.len() - 2] & 0x80 == 0 {
            return Err(TxScriptError::NotMinimalData(format!("numeric value encoded as {v:x?} is not minimally encoded")));
        }
    }

    Ok(())
}

/// Canonical truthiness of a stack item: false iff every byte is zero, where
/// the last byte may also be a lone sign bit (negative zero).
#[inline]
pub fn stack_bool(item: &[u8]) -> bool {
    match item.split_last() {
        None => false,
        Some((last, rest)) => *last & 0x7f != 0 || rest.iter().any(|&b| b != 0),
    }
}

/// Encoding pushed by comparison and signature opcodes
#[inline]
pub fn bool_bytes(value: bool) -> Vec<u8> {
    match value {
        true => vec![1],
        false => vec![],
    }
}
