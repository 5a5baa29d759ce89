//! Node identifiers derived from output references.
//!
//! A node's identifier is the Blake2b-256 digest of the Plutus-data CBOR
//! encoding of the output reference it was derived from. The same 32
//! bytes serve as the node token's asset name and the datum's `id` field,
//! so the encoding has to agree with the validator byte for byte.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use dset_ledger::{AssetName, OutputReference, PolicyId, Unit};
use dset_plutus::{FromPlutusData, PlutusData, PlutusError, ToPlutusData};
use dset_primitives::hash::{blake2b_256, BLAKE2B_256_SIZE};

use crate::error::SetError;

/// A 32-byte set node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId([u8; BLAKE2B_256_SIZE]);

impl NodeId {
    /// Wrap raw identifier bytes.
    pub fn new(bytes: [u8; BLAKE2B_256_SIZE]) -> Self {
        Self(bytes)
    }

    /// Derive the identifier of the node minted against `out_ref`.
    pub fn derive(out_ref: &OutputReference) -> Self {
        let id = Self(blake2b_256(&out_ref.to_cbor()));
        tracing::debug!(out_ref = %out_ref, id = %id, "derived node identifier");
        id
    }

    /// Create from a byte slice, which must be exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SetError> {
        let arr: [u8; BLAKE2B_256_SIZE] = bytes.try_into().map_err(|_| {
            SetError::InvalidDatum(format!(
                "node identifier must be {BLAKE2B_256_SIZE} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    /// Parse from 64 hex characters.
    pub fn from_hex(hex_str: &str) -> Result<Self, SetError> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| SetError::InvalidDatum(format!("node identifier hex: {e}")))?;
        Self::from_slice(&bytes)
    }

    /// Access the raw bytes.
    pub fn as_bytes(&self) -> &[u8; BLAKE2B_256_SIZE] {
        &self.0
    }

    /// Lowercase hex encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The asset name of this node's token.
    pub fn asset_name(&self) -> AssetName {
        AssetName::from(self.0)
    }

    /// The unit of this node's token under `policy_id`.
    pub fn unit(&self, policy_id: PolicyId) -> Unit {
        Unit::new(policy_id, self.asset_name())
    }
}

/// Derive the identifier of the node minted against `out_ref`.
pub fn derive_node_id(out_ref: &OutputReference) -> NodeId {
    NodeId::derive(out_ref)
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for NodeId {
    type Err = SetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl ToPlutusData for NodeId {
    fn to_plutus_data(&self) -> PlutusData {
        PlutusData::bytes(self.0.to_vec())
    }
}

impl FromPlutusData for NodeId {
    fn from_plutus_data(data: &PlutusData) -> Result<Self, PlutusError> {
        let bytes = data.as_bytes()?;
        let arr: [u8; BLAKE2B_256_SIZE] =
            bytes.try_into().map_err(|_| PlutusError::SchemaMismatch {
                expected: "32-byte node identifier",
                actual: "bytes of another length",
            })?;
        Ok(Self(arr))
    }
}
