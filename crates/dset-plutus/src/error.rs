//! Plutus data error types.

/// Errors that can occur while encoding, decoding or converting Plutus data.
#[derive(Debug, thiserror::Error)]
pub enum PlutusError {
    /// The CBOR input ended before a complete item was read.
    #[error("unexpected end of CBOR input")]
    UnexpectedEof,

    /// The CBOR input is structurally invalid.
    #[error("invalid CBOR: {0}")]
    InvalidCbor(String),

    /// Nesting exceeded the reader's depth limit.
    #[error("CBOR nesting deeper than {0} levels")]
    TooDeep(usize),

    /// Extra bytes followed a complete item.
    #[error("trailing {0} bytes after CBOR item")]
    TrailingBytes(usize),

    /// A constructor had a different index than the schema expects.
    #[error("unexpected constructor index: expected {expected}, got {actual}")]
    UnexpectedConstructor {
        /// Index the schema expects.
        expected: u64,
        /// Index found in the data.
        actual: u64,
    },

    /// A constructor had a different number of fields than the schema expects.
    #[error("unexpected field count for constructor {index}: expected {expected}, got {actual}")]
    UnexpectedArity {
        /// Constructor index.
        index: u64,
        /// Field count the schema expects.
        expected: usize,
        /// Field count found in the data.
        actual: usize,
    },

    /// The data did not have the shape the schema expects.
    #[error("schema mismatch: expected {expected}, got {actual}")]
    SchemaMismatch {
        /// Human-readable description of the expected shape.
        expected: &'static str,
        /// Human-readable description of the actual shape.
        actual: &'static str,
    },

    /// An integer did not fit the target type.
    #[error("integer out of range: {0}")]
    IntegerOutOfRange(String),

    /// Hex decoding failed.
    #[error(transparent)]
    Hex(#[from] hex::FromHexError),
}
