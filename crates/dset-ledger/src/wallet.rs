//! Wallet trait and an Ed25519 key wallet.
//!
//! The wallet owns the funds that pay fees and carry minimum-lovelace
//! deposits, receives change, and signs transaction bodies.

use ed25519_dalek::{Signer, SigningKey};

use dset_primitives::hash::{blake2b_224, BLAKE2B_224_SIZE};
use dset_primitives::TxHash;

use crate::address::{Address, Credential, Network};
use crate::transaction::VkeyWitness;

/// A source of funds and signatures.
pub trait Wallet: Send + Sync {
    /// The address funds are collected from and change is sent to.
    fn address(&self) -> Address;

    /// Hash of the verification key that controls [`Wallet::address`].
    fn key_hash(&self) -> [u8; BLAKE2B_224_SIZE];

    /// Sign a transaction body hash.
    fn sign(&self, tx_hash: &TxHash) -> VkeyWitness;
}

/// A wallet backed by a single Ed25519 signing key, paying to an
/// enterprise key address.
pub struct KeyWallet {
    signing_key: SigningKey,
    network: Network,
}

impl KeyWallet {
    /// Generate a fresh random key.
    pub fn generate(network: Network) -> Self {
        let mut rng = rand::rngs::OsRng;
        Self {
            signing_key: SigningKey::generate(&mut rng),
            network,
        }
    }

    /// Create from a 32-byte secret key seed.
    pub fn from_bytes(secret: &[u8; 32], network: Network) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(secret),
            network,
        }
    }

    /// The Ed25519 verification key bytes.
    pub fn verification_key(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }
}

impl std::fmt::Debug for KeyWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyWallet")
            .field("address", &self.address().to_string())
            .finish_non_exhaustive()
    }
}

impl Wallet for KeyWallet {
    fn address(&self) -> Address {
        Address::enterprise(self.network, Credential::Key(self.key_hash()))
    }

    fn key_hash(&self) -> [u8; BLAKE2B_224_SIZE] {
        blake2b_224(&self.verification_key())
    }

    fn sign(&self, tx_hash: &TxHash) -> VkeyWitness {
        let signature = self.signing_key.sign(tx_hash.as_bytes());
        VkeyWitness {
            vkey: self.verification_key(),
            signature: signature.to_bytes(),
        }
    }
}
