//! CIP-57 blueprint loading.
//!
//! A validator package publishes its compiled validators in a
//! `plutus.json` blueprint. Only the fields needed to recover a script
//! are read; unknown fields are ignored.

use std::path::Path;

use serde::{Deserialize, Serialize};

use dset_ledger::{PlutusScript, PlutusVersion};

use crate::error::SetError;

/// Blueprint preamble.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preamble {
    /// Package title.
    pub title: String,
    /// Package version.
    #[serde(default)]
    pub version: Option<String>,
    /// Plutus language version of every validator (`v1`, `v2`, `v3`).
    #[serde(default)]
    pub plutus_version: Option<String>,
}

/// One validator entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlueprintValidator {
    /// `module.name` title.
    pub title: String,
    /// Hex-encoded compiled script.
    pub compiled_code: String,
    /// Script hash as published, if any.
    #[serde(default)]
    pub hash: Option<String>,
}

/// A parsed blueprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blueprint {
    /// Package metadata.
    pub preamble: Preamble,
    /// Compiled validators.
    pub validators: Vec<BlueprintValidator>,
}

impl Blueprint {
    /// Parse blueprint JSON.
    pub fn from_json_str(json: &str) -> Result<Self, SetError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a blueprint file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SetError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// The language version declared in the preamble, defaulting to V2.
    pub fn plutus_version(&self) -> Result<PlutusVersion, SetError> {
        match &self.preamble.plutus_version {
            None => Ok(PlutusVersion::V2),
            Some(label) => PlutusVersion::from_label(label).ok_or_else(|| {
                SetError::Blueprint(format!("unsupported plutus version {label:?}"))
            }),
        }
    }

    /// The validator titled `title`, as a script.
    pub fn validator(&self, title: &str) -> Result<PlutusScript, SetError> {
        let entry = self
            .validators
            .iter()
            .find(|v| v.title == title)
            .ok_or_else(|| SetError::Blueprint(format!("no validator titled {title:?}")))?;
        let script = PlutusScript::from_hex(self.plutus_version()?, &entry.compiled_code)
            .map_err(|e| SetError::Blueprint(format!("{title}: {e}")))?;
        Ok(script)
    }
}
