//! Core ledger identifiers: output references, policies, asset names, units.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use dset_plutus::{FromPlutusData, PlutusData, PlutusError, ToPlutusData};
use dset_primitives::hash::BLAKE2B_224_SIZE;
use dset_primitives::TxHash;

use crate::error::LedgerError;
use crate::transaction::TxOutput;
use crate::value::Value;

/// Maximum length of an asset name in bytes.
pub const MAX_ASSET_NAME_LEN: usize = 32;

// -----------------------------------------------------------------------
// OutputReference
// -----------------------------------------------------------------------

/// Identifies a transaction output by (transaction hash, output index).
///
/// Ordering is lexicographic on the hash bytes, then the index, which is
/// the order the ledger sorts transaction inputs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputReference {
    /// Hash of the transaction that created the output.
    pub tx_hash: TxHash,
    /// Position of the output within that transaction.
    pub output_index: u32,
}

impl OutputReference {
    /// Create a new output reference.
    pub fn new(tx_hash: TxHash, output_index: u32) -> Self {
        Self {
            tx_hash,
            output_index,
        }
    }
}

impl fmt::Display for OutputReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.tx_hash, self.output_index)
    }
}

/// `Constr 0 [Constr 0 [bytes tx_hash], int output_index]`, the layout of
/// the on-chain standard library's `OutputReference`.
impl ToPlutusData for OutputReference {
    fn to_plutus_data(&self) -> PlutusData {
        PlutusData::constr(
            0,
            vec![
                PlutusData::constr(0, vec![PlutusData::bytes(self.tx_hash.as_bytes().to_vec())]),
                PlutusData::integer(self.output_index),
            ],
        )
    }
}

impl FromPlutusData for OutputReference {
    fn from_plutus_data(data: &PlutusData) -> Result<Self, PlutusError> {
        let fields = data.as_constr()?.expect(0, 2)?;
        let id_fields = fields[0].as_constr()?.expect(0, 1)?;
        let hash_bytes = id_fields[0].as_bytes()?;
        let tx_hash = TxHash::from_bytes(hash_bytes).map_err(|_| PlutusError::SchemaMismatch {
            expected: "32-byte transaction hash",
            actual: "bytes of another length",
        })?;
        let index = fields[1].as_integer()?;
        let output_index =
            u32::try_from(index).map_err(|_| PlutusError::IntegerOutOfRange(index.to_string()))?;
        Ok(Self::new(tx_hash, output_index))
    }
}

// -----------------------------------------------------------------------
// PolicyId
// -----------------------------------------------------------------------

/// A minting policy identifier: the Blake2b-224 hash of the policy script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PolicyId([u8; BLAKE2B_224_SIZE]);

impl PolicyId {
    /// Wrap a raw 28-byte script hash.
    pub fn new(bytes: [u8; BLAKE2B_224_SIZE]) -> Self {
        Self(bytes)
    }

    /// Parse from 56 hex characters.
    pub fn from_hex(hex_str: &str) -> Result<Self, LedgerError> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| LedgerError::InvalidValue(format!("policy id: {e}")))?;
        let arr: [u8; BLAKE2B_224_SIZE] = bytes.as_slice().try_into().map_err(|_| {
            LedgerError::InvalidValue(format!(
                "policy id must be {BLAKE2B_224_SIZE} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    /// Access the raw bytes.
    pub fn as_bytes(&self) -> &[u8; BLAKE2B_224_SIZE] {
        &self.0
    }
}

impl fmt::Display for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

// -----------------------------------------------------------------------
// AssetName
// -----------------------------------------------------------------------

/// A token name within a policy, at most 32 bytes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AssetName(Vec<u8>);

impl AssetName {
    /// Create an asset name, rejecting names longer than 32 bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, LedgerError> {
        let bytes = bytes.into();
        if bytes.len() > MAX_ASSET_NAME_LEN {
            return Err(LedgerError::InvalidValue(format!(
                "asset name is {} bytes, maximum is {MAX_ASSET_NAME_LEN}",
                bytes.len()
            )));
        }
        Ok(Self(bytes))
    }

    /// Parse from hex.
    pub fn from_hex(hex_str: &str) -> Result<Self, LedgerError> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| LedgerError::InvalidValue(format!("asset name: {e}")))?;
        Self::new(bytes)
    }

    /// Access the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; MAX_ASSET_NAME_LEN]> for AssetName {
    fn from(bytes: [u8; MAX_ASSET_NAME_LEN]) -> Self {
        Self(bytes.to_vec())
    }
}

impl fmt::Display for AssetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

// -----------------------------------------------------------------------
// Unit
// -----------------------------------------------------------------------

/// A fully-qualified asset: policy id plus asset name.
///
/// The text form is the policy id hex immediately followed by the asset
/// name hex.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Unit {
    /// The minting policy.
    pub policy_id: PolicyId,
    /// The asset name under that policy.
    pub asset_name: AssetName,
}

impl Unit {
    /// Combine a policy id and asset name.
    pub fn new(policy_id: PolicyId, asset_name: AssetName) -> Self {
        Self {
            policy_id,
            asset_name,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.policy_id, self.asset_name)
    }
}

impl FromStr for Unit {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let split = BLAKE2B_224_SIZE * 2;
        if s.len() < split || !s.is_char_boundary(split) {
            return Err(LedgerError::InvalidValue(format!("unit too short: {s:?}")));
        }
        let (policy, name) = s.split_at(split);
        Ok(Self::new(PolicyId::from_hex(policy)?, AssetName::from_hex(name)?))
    }
}

// -----------------------------------------------------------------------
// Utxo
// -----------------------------------------------------------------------

/// An unspent transaction output together with its reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utxo {
    /// Where the output lives.
    pub out_ref: OutputReference,
    /// The output itself.
    pub output: TxOutput,
}

impl Utxo {
    /// The value held by the output.
    pub fn value(&self) -> &Value {
        &self.output.value
    }

    /// The inline datum, if any.
    pub fn datum(&self) -> Option<&PlutusData> {
        self.output.datum.as_ref()
    }

    /// Whether the output holds at least one of `unit`.
    pub fn holds(&self, unit: &Unit) -> bool {
        self.output.value.quantity_of(unit) > 0
    }
}
