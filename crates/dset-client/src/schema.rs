//! On-chain schema shared with the distributed-set validator.
//!
//! | Type            | Plutus data                                       |
//! |-----------------|---------------------------------------------------|
//! | [`SetNode`]     | `Constr 0 [id, next, is_head, [values], requires]`|
//! | [`Requirement`] | `RequireMint b = Constr 0 [b]`, `RequireStake b = Constr 1 [b]` |
//! | [`SetAction`]   | `Unit = Constr 0 []`, `BinarySplit = Constr 1 [oref]` |
//! | [`SpendRedeemer`] | `Constr 0 [action]`                             |
//!
//! The mint redeemer is a bare [`SetAction`].

use dset_ledger::OutputReference;
use dset_plutus::{FromPlutusData, PlutusData, PlutusError, ToPlutusData};

use crate::node_id::NodeId;

/// A precondition a node places on operations touching it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// A mint of the referenced token must accompany the operation.
    RequireMint(Vec<u8>),
    /// A stake registration of the referenced credential must accompany it.
    RequireStake(Vec<u8>),
}

impl ToPlutusData for Requirement {
    fn to_plutus_data(&self) -> PlutusData {
        match self {
            Requirement::RequireMint(b) => PlutusData::constr(0, vec![PlutusData::bytes(b.clone())]),
            Requirement::RequireStake(b) => {
                PlutusData::constr(1, vec![PlutusData::bytes(b.clone())])
            }
        }
    }
}

impl FromPlutusData for Requirement {
    fn from_plutus_data(data: &PlutusData) -> Result<Self, PlutusError> {
        let c = data.as_constr()?;
        match c.index {
            0 => Ok(Requirement::RequireMint(c.expect(0, 1)?[0].as_bytes()?.to_vec())),
            1 => Ok(Requirement::RequireStake(c.expect(1, 1)?[0].as_bytes()?.to_vec())),
            other => Err(PlutusError::UnexpectedConstructor {
                expected: 1,
                actual: other,
            }),
        }
    }
}

/// The datum stored with every set node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetNode {
    /// The node's identifier, also its token's asset name.
    pub id: NodeId,
    /// Successor in the chain; `None` at the tail.
    pub next: Option<NodeId>,
    /// Whether this is the set's root.
    pub is_head: bool,
    /// Opaque payload values, in order.
    pub values: Vec<Vec<u8>>,
    /// Optional precondition.
    pub requires: Option<Requirement>,
}

impl SetNode {
    /// A root node with no successor and no precondition.
    pub fn root(id: NodeId, values: Vec<Vec<u8>>) -> Self {
        Self {
            id,
            next: None,
            is_head: true,
            values,
            requires: None,
        }
    }

    /// Split this node in two around `new_id`.
    ///
    /// The retained node keeps the identifier, head flag and requirement,
    /// points at `new_id`, and keeps the lower half of the values. The new
    /// node takes over the former successor, the requirement and the upper
    /// half of the values.
    pub fn split(&self, new_id: NodeId) -> (SetNode, SetNode) {
        let mid = self.values.len().div_ceil(2);
        let (lower, upper) = self.values.split_at(mid);
        let retained = SetNode {
            id: self.id,
            next: Some(new_id),
            is_head: self.is_head,
            values: lower.to_vec(),
            requires: self.requires.clone(),
        };
        let created = SetNode {
            id: new_id,
            next: self.next,
            is_head: false,
            values: upper.to_vec(),
            requires: self.requires.clone(),
        };
        (retained, created)
    }
}

impl ToPlutusData for SetNode {
    fn to_plutus_data(&self) -> PlutusData {
        PlutusData::constr(
            0,
            vec![
                self.id.to_plutus_data(),
                self.next.to_plutus_data(),
                self.is_head.to_plutus_data(),
                PlutusData::List(
                    self.values
                        .iter()
                        .map(|v| PlutusData::bytes(v.clone()))
                        .collect(),
                ),
                self.requires.to_plutus_data(),
            ],
        )
    }
}

impl FromPlutusData for SetNode {
    fn from_plutus_data(data: &PlutusData) -> Result<Self, PlutusError> {
        let fields = data.as_constr()?.expect(0, 5)?;
        let values = fields[3]
            .as_list()?
            .iter()
            .map(|v| v.as_bytes().map(<[u8]>::to_vec))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            id: NodeId::from_plutus_data(&fields[0])?,
            next: Option::<NodeId>::from_plutus_data(&fields[1])?,
            is_head: bool::from_plutus_data(&fields[2])?,
            values,
            requires: Option::<Requirement>::from_plutus_data(&fields[4])?,
        })
    }
}

/// The action a transaction performs on the set, shared by the mint and
/// spend redeemers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetAction {
    /// No structural change.
    Unit,
    /// Split the node living at `consuming` into two.
    BinarySplit {
        /// Output holding the node being split.
        consuming: OutputReference,
    },
}

/// The mint redeemer is the bare action.
pub type MintRedeemer = SetAction;

impl ToPlutusData for SetAction {
    fn to_plutus_data(&self) -> PlutusData {
        match self {
            SetAction::Unit => PlutusData::constr(0, Vec::new()),
            SetAction::BinarySplit { consuming } => {
                PlutusData::constr(1, vec![consuming.to_plutus_data()])
            }
        }
    }
}

impl FromPlutusData for SetAction {
    fn from_plutus_data(data: &PlutusData) -> Result<Self, PlutusError> {
        let c = data.as_constr()?;
        match c.index {
            0 => c.expect(0, 0).map(|_| SetAction::Unit),
            1 => Ok(SetAction::BinarySplit {
                consuming: OutputReference::from_plutus_data(&c.expect(1, 1)?[0])?,
            }),
            other => Err(PlutusError::UnexpectedConstructor {
                expected: 1,
                actual: other,
            }),
        }
    }
}

/// The spend redeemer: an action in a single-field wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpendRedeemer {
    /// The wrapped action.
    pub wrapper: SetAction,
}

impl ToPlutusData for SpendRedeemer {
    fn to_plutus_data(&self) -> PlutusData {
        PlutusData::constr(0, vec![self.wrapper.to_plutus_data()])
    }
}

impl FromPlutusData for SpendRedeemer {
    fn from_plutus_data(data: &PlutusData) -> Result<Self, PlutusError> {
        let fields = data.as_constr()?.expect(0, 1)?;
        Ok(Self {
            wrapper: SetAction::from_plutus_data(&fields[0])?,
        })
    }
}
