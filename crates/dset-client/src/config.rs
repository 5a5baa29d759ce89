//! Client configuration.
//!
//! Loaded from TOML; every field has a default so an empty file is valid.
//!
//! ```toml
//! network = "testnet"
//! validity_window_ms = 30000
//! blueprint_validator_title = "distributed_set.mint_distributed_set"
//! genesis_values = ["01", "03"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use dset_ledger::Network;

use crate::error::SetError;

/// Default validity window: 30 seconds from the ledger's current time.
pub const DEFAULT_VALIDITY_WINDOW_MS: u64 = 30_000;

/// Default blueprint title of the distributed-set validator.
pub const DEFAULT_VALIDATOR_TITLE: &str = "distributed_set.mint_distributed_set";

/// Settings for a [`crate::SetClient`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetConfig {
    /// Network the client expects its wallet and provider to be on.
    pub network: Network,
    /// How long after submission a transaction stays valid.
    pub validity_window_ms: u64,
    /// Title of the validator entry in the blueprint.
    pub blueprint_validator_title: String,
    /// Hex payload values placed in a new set's root node.
    pub genesis_values: Vec<String>,
}

impl Default for SetConfig {
    fn default() -> Self {
        Self {
            network: Network::Testnet,
            validity_window_ms: DEFAULT_VALIDITY_WINDOW_MS,
            blueprint_validator_title: DEFAULT_VALIDATOR_TITLE.to_string(),
            genesis_values: vec!["01".to_string(), "03".to_string()],
        }
    }
}

impl SetConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, SetError> {
        let config: SetConfig =
            toml::from_str(content).map_err(|e| SetError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SetError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Check field invariants.
    pub fn validate(&self) -> Result<(), SetError> {
        if self.validity_window_ms == 0 {
            return Err(SetError::Config(
                "validity_window_ms must be greater than zero".to_string(),
            ));
        }
        if self.blueprint_validator_title.is_empty() {
            return Err(SetError::Config(
                "blueprint_validator_title must not be empty".to_string(),
            ));
        }
        self.genesis_values()?;
        Ok(())
    }

    /// Decoded genesis values.
    pub fn genesis_values(&self) -> Result<Vec<Vec<u8>>, SetError> {
        self.genesis_values
            .iter()
            .map(|v| {
                hex::decode(v)
                    .map_err(|e| SetError::Config(format!("genesis value {v:?}: {e}")))
            })
            .collect()
    }
}
