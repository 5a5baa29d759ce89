//! Genesis: mint the root token and lock it with a root datum.

use dset_ledger::{Address, MultiAsset, PlutusScript, TxBuilder, Utxo};
use dset_plutus::ToPlutusData;

use crate::error::SetError;
use crate::node_id::NodeId;
use crate::schema::{MintRedeemer, SetNode};

use super::node_value;

/// Configuration for creating a set.
pub struct GenesisConfig {
    /// Wallet output the one-shot policy is parametrized by. It is spent.
    pub seed: Utxo,
    /// The validator instantiated with `seed`'s output reference.
    pub script: PlutusScript,
    /// Address node outputs are locked at.
    pub script_address: Address,
    /// Payload of the root node.
    pub values: Vec<Vec<u8>>,
    /// Validity upper bound, POSIX milliseconds.
    pub valid_to: u64,
}

/// Build a genesis transaction.
///
/// # Transaction structure
/// - Input: the seed output (key-locked, no redeemer)
/// - Mint: one root token, redeemer `Unit`
/// - Output 0: root token at the script address with a root datum
/// - Change is added when balancing
pub fn build_genesis_tx(config: &GenesisConfig) -> Result<TxBuilder, SetError> {
    let policy_id = config.script.policy_id();
    let id = NodeId::derive(&config.seed.out_ref);
    let unit = id.unit(policy_id);
    let datum = SetNode::root(id, config.values.clone());

    Ok(TxBuilder::new()
        .valid_to(config.valid_to)
        .attach_script(config.script.clone())
        .add_input(config.seed.clone())
        .mint_assets(
            MultiAsset::singleton(&unit, 1),
            MintRedeemer::Unit.to_plutus_data(),
        )
        .pay_to_address_with_data(
            config.script_address,
            datum.to_plutus_data(),
            node_value(policy_id, &id),
        ))
}
