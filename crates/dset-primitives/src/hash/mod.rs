//! Hash function primitives.
//!
//! The ledger identifies transactions, scripts, keys and set nodes with
//! Blake2b digests of two widths: 256 bits for transaction bodies and
//! node identifiers, 224 bits for script and verification-key hashes.

use blake2::digest::consts::{U28, U32};
use blake2::{Blake2b, Digest};

type Blake2b224 = Blake2b<U28>;
type Blake2b256 = Blake2b<U32>;

/// Size of a Blake2b-224 digest in bytes.
pub const BLAKE2B_224_SIZE: usize = 28;

/// Size of a Blake2b-256 digest in bytes.
pub const BLAKE2B_256_SIZE: usize = 32;

/// Compute the Blake2b-256 hash of the input data.
///
/// # Arguments
/// * `data` - Byte slice to hash.
///
/// # Returns
/// A 32-byte digest.
pub fn blake2b_256(data: &[u8]) -> [u8; BLAKE2B_256_SIZE] {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute the Blake2b-224 hash of the input data.
///
/// Used for script hashes (policy ids) and verification-key hashes.
///
/// # Arguments
/// * `data` - Byte slice to hash.
///
/// # Returns
/// A 28-byte digest.
pub fn blake2b_224(data: &[u8]) -> [u8; BLAKE2B_224_SIZE] {
    let mut hasher = Blake2b224::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute Blake2b-224 over a one-byte tag followed by the data.
///
/// Script hashes are taken over the language tag prepended to the
/// serialized script, which this avoids copying into a new buffer.
pub fn tagged_blake2b_224(tag: u8, data: &[u8]) -> [u8; BLAKE2B_224_SIZE] {
    let mut hasher = Blake2b224::new();
    hasher.update([tag]);
    hasher.update(data);
    hasher.finalize().into()
}
