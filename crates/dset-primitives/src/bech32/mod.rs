//! Bech32 encoding and decoding.
//!
//! Ledger addresses are rendered as bech32 strings with a human-readable
//! part of `addr` (mainnet) or `addr_test` (test networks). Address
//! payloads exceed the 90-character limit of BIP-173; the `bech32` crate's
//! 1023-character code length covers them.

use ::bech32::{Bech32, Hrp};

use crate::PrimitivesError;

/// Encode bytes as a bech32 string under the given human-readable part.
///
/// # Arguments
/// * `hrp` - Human-readable prefix, e.g. `addr_test`.
/// * `data` - The payload bytes.
///
/// # Returns
/// The lowercase bech32 string, or an error if the prefix is invalid.
pub fn encode(hrp: &str, data: &[u8]) -> Result<String, PrimitivesError> {
    let hrp = Hrp::parse(hrp).map_err(|e| PrimitivesError::InvalidBech32(e.to_string()))?;
    ::bech32::encode::<Bech32>(hrp, data).map_err(|e| PrimitivesError::InvalidBech32(e.to_string()))
}

/// Decode a bech32 string, verifying its checksum.
///
/// # Returns
/// The lowercase human-readable part and the payload bytes.
pub fn decode(s: &str) -> Result<(String, Vec<u8>), PrimitivesError> {
    let (hrp, data) =
        ::bech32::decode(s).map_err(|e| PrimitivesError::InvalidBech32(e.to_string()))?;
    Ok((hrp.as_str().to_ascii_lowercase(), data))
}
