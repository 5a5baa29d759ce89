#![deny(missing_docs)]
//! Client for the on-chain distributed set.
//!
//! A distributed set is a linked list of nodes on a UTxO ledger. Each
//! node is an output at the set's script address holding one uniquely
//! minted token and a [`SetNode`] datum. This crate derives node
//! identifiers, builds the genesis, continue and split transactions, and
//! hands them to a [`dset_ledger::Wallet`] and
//! [`dset_ledger::LedgerProvider`] for balancing, signing and submission.
//! The validator enforcing the set's invariants is an external script
//! loaded from its [`Blueprint`].

pub mod blueprint;
pub mod client;
pub mod config;
pub mod error;
pub mod factory;
pub mod handle;
pub mod node_id;
pub mod schema;

pub use blueprint::{Blueprint, BlueprintValidator, Preamble};
pub use client::SetClient;
pub use config::SetConfig;
pub use error::SetError;
pub use handle::SetHandle;
pub use node_id::{derive_node_id, NodeId};
pub use schema::{MintRedeemer, Requirement, SetAction, SetNode, SpendRedeemer};

#[cfg(test)]
mod tests;
