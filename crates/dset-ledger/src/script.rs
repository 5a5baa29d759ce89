//! Plutus scripts and their hashes.

use dset_primitives::hash::{tagged_blake2b_224, BLAKE2B_224_SIZE};

use crate::address::{Address, Credential, Network};
use crate::error::LedgerError;
use crate::types::PolicyId;

/// Plutus language version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum PlutusVersion {
    /// Plutus V1.
    V1,
    /// Plutus V2.
    #[default]
    V2,
    /// Plutus V3.
    V3,
}

impl PlutusVersion {
    /// The byte prefixed to the script before hashing.
    pub fn tag(&self) -> u8 {
        match self {
            PlutusVersion::V1 => 1,
            PlutusVersion::V2 => 2,
            PlutusVersion::V3 => 3,
        }
    }

    /// Parse the `plutusVersion` field of a blueprint (`v1`, `v2`, `v3`).
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "v1" | "plutusv1" => Some(PlutusVersion::V1),
            "v2" | "plutusv2" => Some(PlutusVersion::V2),
            "v3" | "plutusv3" => Some(PlutusVersion::V3),
            _ => None,
        }
    }
}

/// A compiled Plutus script.
///
/// `bytes` is the CBOR-wrapped flat encoding exactly as it is hashed and
/// attached to transactions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlutusScript {
    /// Language version.
    pub version: PlutusVersion,
    /// Serialized script.
    pub bytes: Vec<u8>,
}

impl PlutusScript {
    /// Wrap serialized script bytes.
    pub fn new(version: PlutusVersion, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            version,
            bytes: bytes.into(),
        }
    }

    /// Parse a hex-encoded script.
    pub fn from_hex(version: PlutusVersion, hex_str: &str) -> Result<Self, LedgerError> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| LedgerError::InvalidValue(format!("script hex: {e}")))?;
        Ok(Self::new(version, bytes))
    }

    /// Hex encoding of the script bytes.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// The script hash: Blake2b-224 over the version tag and the bytes.
    pub fn hash(&self) -> [u8; BLAKE2B_224_SIZE] {
        tagged_blake2b_224(self.version.tag(), &self.bytes)
    }

    /// The minting policy id this script defines.
    pub fn policy_id(&self) -> PolicyId {
        PolicyId::new(self.hash())
    }

    /// The script as a payment credential.
    pub fn credential(&self) -> Credential {
        Credential::Script(self.hash())
    }

    /// The enterprise address locked by this script.
    pub fn address(&self, network: Network) -> Address {
        Address::enterprise(network, self.credential())
    }
}
