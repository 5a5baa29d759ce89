//! Client-side record of a live set.

use dset_ledger::{Address, PlutusScript, PolicyId, Unit};
use dset_primitives::TxHash;

use crate::node_id::NodeId;

/// Everything needed to operate on a set after genesis.
///
/// Owned by the caller and threaded through every operation; nothing is
/// persisted by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetHandle {
    /// Policy minting the node tokens (the hash of `script`).
    pub policy_id: PolicyId,
    /// The validator instantiated for this set, used both as minting
    /// policy and spending validator.
    pub script: PlutusScript,
    /// Address every node output lives at.
    pub script_address: Address,
    /// The genesis transaction.
    pub genesis_tx: TxHash,
    /// Identifiers of the nodes created through this handle, in creation
    /// order.
    pub ids: Vec<NodeId>,
}

impl SetHandle {
    /// The unit of `id`'s token.
    pub fn unit(&self, id: &NodeId) -> Unit {
        id.unit(self.policy_id)
    }

    /// The root node's identifier.
    pub fn root(&self) -> Option<&NodeId> {
        self.ids.first()
    }

    /// Whether `id` was created through this handle.
    pub fn contains(&self, id: &NodeId) -> bool {
        self.ids.contains(id)
    }
}
