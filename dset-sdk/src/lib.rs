#![deny(missing_docs)]

//! Distributed-set SDK.
//!
//! Re-exports every component for single-crate usage.

pub use dset_client as client;
pub use dset_ledger as ledger;
pub use dset_plutus as plutus;
pub use dset_primitives as primitives;

pub use dset_client::{NodeId, SetClient, SetConfig, SetError, SetHandle, SetNode};
pub use dset_ledger::{Emulator, KeyWallet, LedgerProvider, Wallet};
