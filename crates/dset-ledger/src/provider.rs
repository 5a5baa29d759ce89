//! The ledger provider seam.
//!
//! A provider answers UTxO queries, accepts signed transactions, and
//! supplies the parameters needed to balance them. [`crate::Emulator`]
//! is the in-memory implementation; a network-backed provider implements
//! the same trait.

use std::future::Future;

use dset_plutus::PlutusData;
use dset_primitives::TxHash;

use crate::address::{Address, Network};
use crate::error::LedgerError;
use crate::params::ProtocolParameters;
use crate::script::PlutusScript;
use crate::transaction::Transaction;
use crate::types::{Unit, Utxo};

/// Read and submit access to a UTxO ledger.
pub trait LedgerProvider: Send + Sync {
    /// Current protocol parameters.
    fn protocol_parameters(&self) -> ProtocolParameters;

    /// The network this provider talks to.
    fn network(&self) -> Network;

    /// Current ledger time in POSIX milliseconds.
    fn now(&self) -> u64;

    /// Apply `params` to a parameterized script, producing the concrete
    /// script whose hash is the policy id.
    fn apply_params(
        &self,
        script: &PlutusScript,
        params: &[PlutusData],
    ) -> Result<PlutusScript, LedgerError>;

    /// Unspent outputs sitting at `address`.
    fn utxos_at(
        &self,
        address: &Address,
    ) -> impl Future<Output = Result<Vec<Utxo>, LedgerError>> + Send;

    /// The single unspent output holding `unit`.
    ///
    /// Fails with [`LedgerError::UnitNotFound`] when none holds it and
    /// [`LedgerError::UnitNotUnique`] when more than one does.
    fn utxo_by_unit(&self, unit: &Unit) -> impl Future<Output = Result<Utxo, LedgerError>> + Send;

    /// Validate and accept a signed transaction.
    fn submit(&self, tx: Transaction) -> impl Future<Output = Result<TxHash, LedgerError>> + Send;
}
