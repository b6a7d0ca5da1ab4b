use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SerializationError {
    #[error("unexpected end of data: needed {needed} more bytes at offset {offset}")]
    UnexpectedEof { offset: usize, needed: usize },

    #[error("compact size {0} is not canonically encoded")]
    NonCanonicalCompactSize(u64),

    #[error("declared length {0} exceeds the remaining data")]
    LengthTooLarge(u64),

    #[error("{0} trailing bytes after the transaction")]
    TrailingBytes(usize),
}

pub type SerializationResult<T> = std::result::Result<T, SerializationError>;
