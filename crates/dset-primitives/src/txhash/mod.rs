//! Transaction hash type.
//!
//! Provides `TxHash`, the 32-byte Blake2b-256 digest of a transaction
//! body. Unlike some ledgers, the hex form is the bytes in their natural
//! order, with no reversal.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::hash::blake2b_256;
use crate::PrimitivesError;

/// Size of a TxHash in bytes.
pub const HASH_SIZE: usize = 32;

/// A 32-byte transaction identifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct TxHash([u8; HASH_SIZE]);

impl TxHash {
    /// Create a TxHash from a raw 32-byte array.
    pub fn new(bytes: [u8; HASH_SIZE]) -> Self {
        TxHash(bytes)
    }

    /// Create a TxHash from a byte slice.
    ///
    /// # Returns
    /// `Ok(TxHash)` if the slice is 32 bytes, or an error otherwise.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != HASH_SIZE {
            return Err(PrimitivesError::InvalidHash(format!(
                "invalid hash length of {}, want {}",
                bytes.len(),
                HASH_SIZE
            )));
        }
        let mut arr = [0u8; HASH_SIZE];
        arr.copy_from_slice(bytes);
        Ok(TxHash(arr))
    }

    /// Parse a TxHash from a 64-character hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        if hex_str.len() != HASH_SIZE * 2 {
            return Err(PrimitivesError::InvalidHash(format!(
                "hash string must be {} characters, got {}",
                HASH_SIZE * 2,
                hex_str.len()
            )));
        }
        let decoded = hex::decode(hex_str)?;
        Self::from_bytes(&decoded)
    }

    /// Hash arbitrary bytes (a serialized transaction body) into a TxHash.
    pub fn digest(data: &[u8]) -> Self {
        TxHash(blake2b_256(data))
    }

    /// Access the internal byte array.
    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    /// Return the hash as lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for TxHash {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TxHash::from_hex(s)
    }
}

impl From<[u8; HASH_SIZE]> for TxHash {
    fn from(bytes: [u8; HASH_SIZE]) -> Self {
        TxHash(bytes)
    }
}

/// Serialize as a hex string in JSON.
impl Serialize for TxHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Deserialize from a hex string in JSON.
impl<'de> Deserialize<'de> for TxHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        TxHash::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
