/// Unified error type for all primitives operations.
///
/// Covers errors from hash parsing and text encodings.
#[derive(Debug, thiserror::Error)]
pub enum PrimitivesError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid hash: {0}")]
    InvalidHash(String),

    #[error("invalid bech32: {0}")]
    InvalidBech32(String),

    #[error("invalid length: expected {expected}, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("{0}")]
    Other(String),
}

impl From<hex::FromHexError> for PrimitivesError {
    fn from(e: hex::FromHexError) -> Self {
        PrimitivesError::InvalidHex(e.to_string())
    }
}
