//! Distributed-set error types.

use dset_ledger::LedgerError;
use dset_plutus::PlutusError;

use crate::node_id::NodeId;

/// Errors returned by set operations.
#[derive(Debug, thiserror::Error)]
pub enum SetError {
    /// The wallet has no output to seed a new set with.
    #[error("wallet has no spendable outputs")]
    NoSpendableFunds,

    /// No unspent output holds the token for this identifier.
    #[error("unknown identifier {0}: no live output holds its token")]
    UnknownIdentifier(NodeId),

    /// The ledger or a validator refused the transaction.
    #[error("transaction rejected: {0}")]
    ValidatorRejected(String),

    /// The transaction reached the ledger after its deadline.
    #[error("validity window expired: ttl slot {ttl}, current slot {slot}")]
    ExpiredValidityWindow {
        /// The transaction's time-to-live slot.
        ttl: u64,
        /// The ledger's slot at submission.
        slot: u64,
    },

    /// A node output carries a missing or malformed datum.
    #[error("invalid node datum: {0}")]
    InvalidDatum(String),

    /// The validator blueprint could not be read.
    #[error("blueprint error: {0}")]
    Blueprint(String),

    /// The client configuration is invalid.
    #[error("config error: {0}")]
    Config(String),

    /// Ledger error raised while building a transaction.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Plutus data error.
    #[error(transparent)]
    Plutus(#[from] PlutusError),

    /// JSON error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SetError {
    /// Classify a submission failure.
    pub fn from_submission(err: LedgerError) -> Self {
        match err {
            LedgerError::Expired { ttl, slot } => SetError::ExpiredValidityWindow { ttl, slot },
            other => SetError::ValidatorRejected(other.to_string()),
        }
    }

    /// Classify a failed lookup of the output holding `id`'s token.
    pub fn from_lookup(id: &NodeId, err: LedgerError) -> Self {
        match err {
            LedgerError::UnitNotFound(_) => SetError::UnknownIdentifier(*id),
            other => SetError::Ledger(other),
        }
    }
}
