//! Shelley-era addresses over key or script credentials.
//!
//! Supports enterprise addresses (payment credential only) and base
//! addresses (payment plus stake credential). The binary form is a header
//! byte followed by the 28-byte credential hashes; the text form is
//! bech32 with an `addr` or `addr_test` prefix.

use std::fmt;
use std::str::FromStr;

use dset_primitives::bech32;
use dset_primitives::hash::BLAKE2B_224_SIZE;

use crate::error::LedgerError;

/// Which network an address belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Any test network (network id 0).
    Testnet,
    /// The main network (network id 1).
    Mainnet,
}

impl Network {
    /// The network id carried in the address header.
    pub fn id(&self) -> u8 {
        match self {
            Network::Testnet => 0,
            Network::Mainnet => 1,
        }
    }

    /// The bech32 human-readable prefix for payment addresses.
    pub fn address_prefix(&self) -> &'static str {
        match self {
            Network::Testnet => "addr_test",
            Network::Mainnet => "addr",
        }
    }

    fn from_id(id: u8) -> Self {
        if id == 1 {
            Network::Mainnet
        } else {
            Network::Testnet
        }
    }
}

/// A payment or stake credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Credential {
    /// Hash of a verification key.
    Key([u8; BLAKE2B_224_SIZE]),
    /// Hash of a script.
    Script([u8; BLAKE2B_224_SIZE]),
}

impl Credential {
    /// The 28-byte hash inside the credential.
    pub fn hash(&self) -> &[u8; BLAKE2B_224_SIZE] {
        match self {
            Credential::Key(h) | Credential::Script(h) => h,
        }
    }

    /// Whether this is a script credential.
    pub fn is_script(&self) -> bool {
        matches!(self, Credential::Script(_))
    }
}

/// A ledger address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    /// Network the address belongs to.
    pub network: Network,
    /// Who may spend outputs at this address.
    pub payment: Credential,
    /// Optional delegation credential.
    pub stake: Option<Credential>,
}

impl Address {
    /// An enterprise address (no stake part).
    pub fn enterprise(network: Network, payment: Credential) -> Self {
        Self {
            network,
            payment,
            stake: None,
        }
    }

    /// A base address with both payment and stake credentials.
    pub fn base(network: Network, payment: Credential, stake: Credential) -> Self {
        Self {
            network,
            payment,
            stake: Some(stake),
        }
    }

    fn header_type(&self) -> u8 {
        match (self.payment, self.stake) {
            (Credential::Key(_), Some(Credential::Key(_))) => 0,
            (Credential::Script(_), Some(Credential::Key(_))) => 1,
            (Credential::Key(_), Some(Credential::Script(_))) => 2,
            (Credential::Script(_), Some(Credential::Script(_))) => 3,
            (Credential::Key(_), None) => 6,
            (Credential::Script(_), None) => 7,
        }
    }

    /// Serialize to the binary address form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + 2 * BLAKE2B_224_SIZE);
        out.push((self.header_type() << 4) | self.network.id());
        out.extend_from_slice(self.payment.hash());
        if let Some(stake) = &self.stake {
            out.extend_from_slice(stake.hash());
        }
        out
    }

    /// Parse the binary address form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LedgerError> {
        let (&header, rest) = bytes
            .split_first()
            .ok_or_else(|| LedgerError::InvalidAddress("empty address".to_string()))?;
        let network = Network::from_id(header & 0x0f);
        let hash_at = |i: usize| -> Result<[u8; BLAKE2B_224_SIZE], LedgerError> {
            let start = i * BLAKE2B_224_SIZE;
            rest.get(start..start + BLAKE2B_224_SIZE)
                .and_then(|s| s.try_into().ok())
                .ok_or_else(|| LedgerError::InvalidAddress("truncated credential".to_string()))
        };

        let (payment, stake, expected_len) = match header >> 4 {
            0 => (Credential::Key(hash_at(0)?), Some(Credential::Key(hash_at(1)?)), 2),
            1 => (Credential::Script(hash_at(0)?), Some(Credential::Key(hash_at(1)?)), 2),
            2 => (Credential::Key(hash_at(0)?), Some(Credential::Script(hash_at(1)?)), 2),
            3 => (Credential::Script(hash_at(0)?), Some(Credential::Script(hash_at(1)?)), 2),
            6 => (Credential::Key(hash_at(0)?), None, 1),
            7 => (Credential::Script(hash_at(0)?), None, 1),
            other => {
                return Err(LedgerError::InvalidAddress(format!(
                    "unsupported address type {other}"
                )))
            }
        };
        if rest.len() != expected_len * BLAKE2B_224_SIZE {
            return Err(LedgerError::InvalidAddress(format!(
                "address payload is {} bytes, expected {}",
                rest.len(),
                expected_len * BLAKE2B_224_SIZE
            )));
        }
        Ok(Self {
            network,
            payment,
            stake,
        })
    }

    /// Render as bech32.
    pub fn to_bech32(&self) -> Result<String, LedgerError> {
        Ok(bech32::encode(self.network.address_prefix(), &self.to_bytes())?)
    }

    /// Parse a bech32 address.
    pub fn from_bech32(s: &str) -> Result<Self, LedgerError> {
        let (hrp, bytes) = bech32::decode(s)?;
        let address = Self::from_bytes(&bytes)?;
        if hrp != address.network.address_prefix() {
            return Err(LedgerError::InvalidAddress(format!(
                "prefix {hrp:?} does not match network {:?}",
                address.network
            )));
        }
        Ok(address)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.to_bech32().map_err(|_| fmt::Error)?;
        write!(f, "{text}")
    }
}

impl FromStr for Address {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bech32(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq28() -> [u8; 28] {
        let mut arr = [0u8; 28];
        for (i, b) in arr.iter_mut().enumerate() {
            *b = i as u8;
        }
        arr
    }

    #[test]
    fn test_enterprise_script_address() {
        let addr = Address::enterprise(Network::Testnet, Credential::Script([0u8; 28]));
        assert_eq!(addr.to_bytes()[0], 0x70);
        assert_eq!(
            addr.to_string(),
            "addr_test1wqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqydhgrt"
        );
    }

    #[test]
    fn test_enterprise_key_address_roundtrip() {
        let addr = Address::enterprise(Network::Mainnet, Credential::Key(seq28()));
        let text = addr.to_string();
        assert_eq!(text, "addr1vyqqzqsrqszsvpcgpy9qkrqdpc83qygjzv2p29shrqv35xcjrvarg");
        let parsed: Address = text.parse().unwrap();
        assert_eq!(parsed, addr);
    }

    #[test]
    fn test_base_address_roundtrip() {
        let addr = Address::base(
            Network::Testnet,
            Credential::Script(seq28()),
            Credential::Key([7u8; 28]),
        );
        let bytes = addr.to_bytes();
        assert_eq!(bytes.len(), 57);
        assert_eq!(bytes[0], 0x10);
        assert_eq!(Address::from_bytes(&bytes).unwrap(), addr);
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(Address::from_bytes(&[]).is_err());
        assert!(Address::from_bytes(&[0x70, 0x01]).is_err());
        // Enterprise header with a trailing stake hash.
        let mut long = vec![0x60];
        long.extend_from_slice(&[0u8; 56]);
        assert!(Address::from_bytes(&long).is_err());
        // Mainnet payload under a testnet prefix.
        let mainnet = Address::enterprise(Network::Mainnet, Credential::Key([0u8; 28]));
        let forged = bech32::encode("addr_test", &mainnet.to_bytes()).unwrap();
        assert!(Address::from_bech32(&forged).is_err());
    }
}
