//! Ledger error types.

use dset_plutus::PlutusError;
use dset_primitives::PrimitivesError;

use crate::types::{OutputReference, PolicyId, Unit};

/// Errors raised while building, balancing, or submitting transactions.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// A transaction input does not exist on the ledger.
    #[error("input not found: {0}")]
    InputNotFound(OutputReference),

    /// A transaction input was already spent.
    #[error("input already spent: {0}")]
    InputSpent(OutputReference),

    /// The transaction's validity upper bound has passed.
    #[error("validity window expired: ttl slot {ttl}, current slot {slot}")]
    Expired {
        /// The transaction's time-to-live slot.
        ttl: u64,
        /// The ledger's current slot.
        slot: u64,
    },

    /// A script evaluated the transaction and rejected it.
    #[error("script rejected transaction: {0}")]
    ScriptRejected(String),

    /// A script input or minted policy has no redeemer.
    #[error("missing {purpose} redeemer at index {index}")]
    MissingRedeemer {
        /// `spend` or `mint`.
        purpose: &'static str,
        /// The sorted index the redeemer should point at.
        index: u32,
    },

    /// A script needed by the transaction was not attached.
    #[error("missing script with hash {0}")]
    MissingScript(String),

    /// A key-locked input has no matching witness.
    #[error("missing witness for key hash {0}")]
    MissingWitness(String),

    /// A witness signature does not verify.
    #[error("invalid witness signature: {0}")]
    InvalidSignature(String),

    /// Inputs plus mint do not equal outputs plus fee.
    #[error("value not conserved: {0}")]
    ValueNotConserved(String),

    /// The declared fee is below the protocol minimum.
    #[error("fee too small: {fee} < {minimum}")]
    FeeTooSmall {
        /// Declared fee.
        fee: u64,
        /// Minimum fee for the transaction's size and scripts.
        minimum: u64,
    },

    /// An output carries less than the minimum lovelace.
    #[error("output {index} below minimum: {lovelace} < {minimum}")]
    OutputTooSmall {
        /// Output position.
        index: usize,
        /// Lovelace carried.
        lovelace: u64,
        /// Required minimum.
        minimum: u64,
    },

    /// The wallet cannot cover outputs and fee.
    #[error("insufficient funds: needed {needed}, available {available}")]
    InsufficientFunds {
        /// Lovelace needed.
        needed: u64,
        /// Lovelace available.
        available: u64,
    },

    /// No unspent output holds the unit.
    #[error("no unspent output holds unit {0}")]
    UnitNotFound(Unit),

    /// More than one unspent output holds the unit.
    #[error("unit {0} is held by more than one output")]
    UnitNotUnique(Unit),

    /// Two different redeemers were given for the same minting policy.
    #[error("conflicting redeemers for policy {0}")]
    ConflictingMintRedeemer(PolicyId),

    /// A value was malformed (negative quantity, overflow, bad asset name).
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// An address could not be parsed.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Plutus data encoding or decoding failed.
    #[error(transparent)]
    Plutus(#[from] PlutusError),

    /// Primitives error.
    #[error(transparent)]
    Primitives(#[from] PrimitivesError),
}
