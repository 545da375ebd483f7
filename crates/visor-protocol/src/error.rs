use crate::commands::CommandTag;

/// A command stream could not be decoded. Offsets are byte positions of the
/// offending record from the start of the stream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("unknown command tag {value} at offset {offset}")]
    UnknownTag { offset: usize, value: u32 },

    #[error("partial tag at offset {offset}: only {remaining} bytes left in stream")]
    TruncatedTag { offset: usize, remaining: usize },

    #[error("truncated {tag:?} record at offset {offset}: payload needs {needed} bytes, {available} available")]
    Truncated {
        offset: usize,
        tag: CommandTag,
        needed: usize,
        available: usize,
    },

    #[error("invalid index type {value} in record at offset {offset}")]
    InvalidIndexType { offset: usize, value: u32 },
}

impl DecodeError {
    /// Byte offset of the record that failed to decode.
    pub fn offset(&self) -> usize {
        match self {
            DecodeError::UnknownTag { offset, .. }
            | DecodeError::TruncatedTag { offset, .. }
            | DecodeError::Truncated { offset, .. }
            | DecodeError::InvalidIndexType { offset, .. } => *offset,
        }
    }
}
