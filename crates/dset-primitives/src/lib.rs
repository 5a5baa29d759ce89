/// Distributed-set SDK - Hashing and encoding primitives.
///
/// This crate provides the foundational building blocks for the SDK:
/// - Blake2b-224 and Blake2b-256 hash functions
/// - A 32-byte transaction hash type
/// - Bech32 encoding/decoding for ledger addresses

pub mod hash;
pub mod txhash;
pub mod bech32;

mod error;
pub use error::PrimitivesError;
pub use txhash::TxHash;
