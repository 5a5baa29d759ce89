//! Continue: respend a node in place with an empty-root datum.

use dset_ledger::{Address, PlutusScript, PolicyId, TxBuilder, Utxo};
use dset_plutus::ToPlutusData;

use crate::error::SetError;
use crate::node_id::NodeId;
use crate::schema::{SetAction, SetNode, SpendRedeemer};

use super::node_value;

/// Configuration for continuing a node.
pub struct ContinueConfig {
    /// The output currently holding the node's token.
    pub node: Utxo,
    /// The node's identifier.
    pub id: NodeId,
    /// The set's validator.
    pub script: PlutusScript,
    /// The set's script address.
    pub script_address: Address,
    /// The set's policy.
    pub policy_id: PolicyId,
    /// Validity upper bound, POSIX milliseconds.
    pub valid_to: u64,
}

/// Build a continue transaction.
///
/// # Transaction structure
/// - Input: the node output, spend redeemer `wrapper: Unit`
/// - Output 0: the same token at the script address, datum reset to an
///   empty root (`id` kept, no successor, head, no values, no requirement)
pub fn build_continue_tx(config: &ContinueConfig) -> Result<TxBuilder, SetError> {
    if !config.node.holds(&config.id.unit(config.policy_id)) {
        return Err(SetError::InvalidDatum(format!(
            "output {} does not hold the token of {}",
            config.node.out_ref, config.id
        )));
    }
    let redeemer = SpendRedeemer {
        wrapper: SetAction::Unit,
    };
    let datum = SetNode::root(config.id, Vec::new());

    Ok(TxBuilder::new()
        .valid_to(config.valid_to)
        .attach_script(config.script.clone())
        .collect_from([config.node.clone()], Some(redeemer.to_plutus_data()))
        .pay_to_address_with_data(
            config.script_address,
            datum.to_plutus_data(),
            node_value(config.policy_id, &config.id),
        ))
}
