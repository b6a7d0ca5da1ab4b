//! Legacy wire codec.
//!
//! Encoding reuses the hashing writers through [`WireWriter`], so the bytes on
//! the wire and the bytes hashed into the transaction id cannot drift apart.

use super::{Transaction, TransactionInput, TransactionOutpoint, TransactionOutput};
use crate::{
    errors::{SerializationError, SerializationResult},
    hashing::tx::write_transaction,
};
use bitscript_hashes::{HASH_SIZE, Hash, HasherBase};

#[derive(Default)]
struct WireWriter(Vec<u8>);

impl HasherBase for WireWriter {
    fn update<A: AsRef<[u8]>>(&mut self, data: A) -> &mut Self {
        self.0.extend_from_slice(data.as_ref());
        self
    }
}

pub(super) fn serialize(tx: &Transaction) -> Vec<u8> {
    let mut writer = WireWriter::default();
    write_transaction(&mut writer, tx);
    writer.0
}

pub(super) fn deserialize(bytes: &[u8]) -> SerializationResult<Transaction> {
    let mut reader = WireReader::new(bytes);
    let tx = reader.read_transaction()?;
    match reader.remaining() {
        0 => Ok(tx),
        n => Err(SerializationError::TrailingBytes(n)),
    }
}

struct WireReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> WireReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    fn take(&mut self, len: usize) -> SerializationResult<&'a [u8]> {
        if len > self.remaining() {
            return Err(SerializationError::UnexpectedEof { offset: self.offset, needed: len - self.remaining() });
        }
        let slice = &self.bytes[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    fn read_array<const N: usize>(&mut self) -> SerializationResult<[u8; N]> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.take(N)?);
        Ok(array)
    }

    fn read_u32(&mut self) -> SerializationResult<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    fn read_var_int(&mut self) -> SerializationResult<u64> {
        let [prefix] = self.read_array::<1>()?;
        let (value, min) = match prefix {
            0xfd => (u16::from_le_bytes(self.read_array()?) as u64, 0xfd),
            0xfe => (u32::from_le_bytes(self.read_array()?) as u64, 0x10000),
            0xff => (u64::from_le_bytes(self.read_array()?), 0x1_0000_0000),
            n => return Ok(n as u64),
        };
        if value < min {
            return Err(SerializationError::NonCanonicalCompactSize(value));
        }
        Ok(value)
    }

    /// Reads a length prefix, rejecting lengths that could not possibly fit
    fn read_len(&mut self) -> SerializationResult<usize> {
        let len = self.read_var_int()?;
        if len > self.remaining() as u64 {
            return Err(SerializationError::LengthTooLarge(len));
        }
        Ok(len as usize)
    }

    fn read_var_bytes(&mut self) -> SerializationResult<Vec<u8>> {
        let len = self.read_len()?;
        Ok(self.take(len)?.to_vec())
    }

    fn read_transaction(&mut self) -> SerializationResult<Transaction> {
        let version = i32::from_le_bytes(self.read_array()?);
        let inputs = (0..self.read_len()?).map(|_| self.read_input()).collect::<SerializationResult<Vec<_>>>()?;
        let outputs = (0..self.read_len()?).map(|_| self.read_output()).collect::<SerializationResult<Vec<_>>>()?;
        let lock_time = self.read_u32()?;
        Ok(Transaction { version, inputs, outputs, lock_time })
    }

    fn read_input(&mut self) -> SerializationResult<TransactionInput> {
        let transaction_id = Hash::from_bytes(self.read_array::<HASH_SIZE>()?);
        let index = self.read_u32()?;
        let signature_script = self.read_var_bytes()?;
        let sequence = self.read_u32()?;
        Ok(TransactionInput { previous_outpoint: TransactionOutpoint { transaction_id, index }, signature_script, sequence })
    }

    fn read_output(&mut self) -> SerializationResult<TransactionOutput> {
        let value = u64::from_le_bytes(self.read_array()?);
        let script_public_key = self.read_var_bytes()?;
        Ok(TransactionOutput { value, script_public_key })
    }
}
