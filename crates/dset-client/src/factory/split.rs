//! Split: consume one node and produce two linked nodes.

use dset_ledger::{Address, MultiAsset, PlutusScript, PolicyId, TxBuilder, Utxo};
use dset_plutus::ToPlutusData;

use crate::error::SetError;
use crate::node_id::NodeId;
use crate::schema::{MintRedeemer, SetAction, SetNode, SpendRedeemer};

use super::{decode_node, node_value};

/// Configuration for splitting a node.
pub struct SplitConfig {
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

/// Build a split transaction, returning it with the new node's identifier.
///
/// # Transaction structure
/// - Input: the node output, spend redeemer `wrapper: BinarySplit(oref)`
/// - Mint: one token for the new identifier, redeemer `BinarySplit(oref)`
/// - Output 0: the original token, datum pointing at the new node
/// - Output 1: the new token, non-head datum
///
/// Both redeemers name the consumed output's reference, from which the
/// new identifier is derived.
pub fn build_split_tx(config: &SplitConfig) -> Result<(TxBuilder, NodeId), SetError> {
    let current = decode_node(&config.node)?;
    if current.id != config.id {
        return Err(SetError::InvalidDatum(format!(
            "output {} carries node {}, expected {}",
            config.node.out_ref, current.id, config.id
        )));
    }

    let consuming = config.node.out_ref;
    let new_id = NodeId::derive(&consuming);
    let action = SetAction::BinarySplit { consuming };
    let spend_redeemer = SpendRedeemer {
        wrapper: action.clone(),
    };
    let mint_redeemer: MintRedeemer = action;
    let (retained, created) = current.split(new_id);

    let builder = TxBuilder::new()
        .valid_to(config.valid_to)
        .attach_script(config.script.clone())
        .collect_from([config.node.clone()], Some(spend_redeemer.to_plutus_data()))
        .mint_assets(
            MultiAsset::singleton(&new_id.unit(config.policy_id), 1),
            mint_redeemer.to_plutus_data(),
        )
        .pay_to_address_with_data(
            config.script_address,
            retained.to_plutus_data(),
            node_value(config.policy_id, &config.id),
        )
        .pay_to_address_with_data(
            config.script_address,
            created.to_plutus_data(),
            node_value(config.policy_id, &new_id),
        );
    Ok((builder, new_id))
}
