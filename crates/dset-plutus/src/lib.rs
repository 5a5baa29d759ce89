#![deny(missing_docs)]
//! Plutus data support.
//!
//! Provides a minimal CBOR reader/writer, the [`PlutusData`] value model
//! used for datums and redeemers, and the [`ToPlutusData`] /
//! [`FromPlutusData`] conversion traits. The encoder reproduces the byte
//! layout produced by the reference off-chain SDK, since script hashes,
//! datum hashes and node identifiers are all computed over these bytes.

pub mod cbor;
pub mod convert;
pub mod data;
pub mod error;

pub use convert::{FromPlutusData, ToPlutusData};
pub use data::{Constr, PlutusData};
pub use error::PlutusError;
