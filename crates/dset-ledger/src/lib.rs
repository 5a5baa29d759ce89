#![deny(missing_docs)]
//! Ledger model and SDK seams for the distributed-set client.
//!
//! Provides the UTxO data types (output references, values, addresses,
//! scripts), transaction intents and their balancing [`TxBuilder`], the
//! [`Wallet`] and [`LedgerProvider`] traits through which the client
//! reaches a ledger, and an in-memory [`Emulator`] implementing them.

pub mod address;
pub mod builder;
pub mod emulator;
pub mod error;
pub mod params;
pub mod provider;
pub mod script;
pub mod transaction;
pub mod types;
pub mod value;
pub mod wallet;

pub use address::{Address, Credential, Network};
pub use builder::TxBuilder;
pub use emulator::{AcceptAll, Emulator, ScriptEvaluator, ScriptInvocation, SLOTS_PER_BLOCK};
pub use error::LedgerError;
pub use params::{ExUnits, ProtocolParameters, SlotConfig};
pub use provider::LedgerProvider;
pub use script::{PlutusScript, PlutusVersion};
pub use transaction::{Redeemer, RedeemerTag, Transaction, TxBody, TxOutput, VkeyWitness};
pub use types::{AssetName, OutputReference, PolicyId, Unit, Utxo};
pub use value::{MultiAsset, Value};
pub use wallet::{KeyWallet, Wallet};

#[cfg(test)]
mod tests;
