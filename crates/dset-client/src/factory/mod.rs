//! Transaction factories for set operations.
//!
//! Each factory is a pure function from a config struct to an unbalanced
//! [`dset_ledger::TxBuilder`]. Balancing, signing and submission happen in
//! [`crate::SetClient`].

pub mod continuation;
pub mod genesis;
pub mod split;

pub use continuation::{build_continue_tx, ContinueConfig};
pub use genesis::{build_genesis_tx, GenesisConfig};
pub use split::{build_split_tx, SplitConfig};

use dset_ledger::{PolicyId, Utxo, Value};
use dset_plutus::FromPlutusData;

use crate::error::SetError;
use crate::node_id::NodeId;
use crate::schema::SetNode;

/// The value a node output carries: exactly one of its token. The
/// builder tops up the lovelace.
pub(crate) fn node_value(policy_id: PolicyId, id: &NodeId) -> Value {
    Value::default().with_asset(&id.unit(policy_id), 1)
}

/// Decode the datum of a node output.
pub fn decode_node(utxo: &Utxo) -> Result<SetNode, SetError> {
    let datum = utxo
        .datum()
        .ok_or_else(|| SetError::InvalidDatum(format!("output {} has no datum", utxo.out_ref)))?;
    SetNode::from_plutus_data(datum)
        .map_err(|e| SetError::InvalidDatum(format!("output {}: {e}", utxo.out_ref)))
}
