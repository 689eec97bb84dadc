use crate::reader::CborReaderState;
use thiserror::Error;

/// Failure surfaced by the reader, the writer or any hand-written codec
/// built on top of them.
///
/// Decoders never panic and never rewind: on any non-success outcome the
/// caller is expected to discard the partially built value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("unexpected cbor type: expected {expected}, found {found:?}")]
    TypeMismatch {
        expected: &'static str,
        found: CborReaderState,
    },

    #[error("input ended before the current data item was complete")]
    TruncatedInput,

    #[error("break byte found outside of an indefinite-length container")]
    UnexpectedBreak,

    #[error("indefinite-length container was not terminated where expected")]
    IndefiniteLengthMismatch,

    #[error("integer does not fit the requested width")]
    IntegerOverflow,

    #[error("invalid cbor array size: expected {expected}, found {found}")]
    InvalidArraySize { expected: u64, found: u64 },

    #[error("invalid hash size: expected {expected} bytes, found {found}")]
    InvalidHashSize { expected: usize, found: usize },

    #[error("{0}")]
    Message(String),
}

impl Error {
    /// Generic decoding failure with a human-readable description.
    pub fn message(msg: impl Into<String>) -> Self {
        Error::Message(msg.into())
    }
}
