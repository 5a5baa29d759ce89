//! Ledger values: lovelace plus a multi-asset bundle.

use std::collections::BTreeMap;
use std::fmt;

use dset_plutus::cbor::CborWriter;

use crate::types::{AssetName, PolicyId, Unit};

/// Quantities of native assets grouped by policy.
///
/// Quantities are signed so the same type can describe a mint field
/// (where negative quantities burn). Zero entries are never stored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MultiAsset(BTreeMap<PolicyId, BTreeMap<AssetName, i128>>);

impl MultiAsset {
    /// An empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// A bundle holding one unit quantity.
    pub fn singleton(unit: &Unit, quantity: i128) -> Self {
        let mut ma = Self::new();
        ma.add(unit, quantity);
        ma
    }

    /// Add `quantity` of `unit`, dropping the entry if it reaches zero.
    pub fn add(&mut self, unit: &Unit, quantity: i128) {
        if quantity == 0 {
            return;
        }
        let assets = self.0.entry(unit.policy_id).or_default();
        let entry = assets.entry(unit.asset_name.clone()).or_insert(0);
        *entry += quantity;
        if *entry == 0 {
            assets.remove(&unit.asset_name);
            if assets.is_empty() {
                self.0.remove(&unit.policy_id);
            }
        }
    }

    /// Add every entry of `other` into `self`.
    pub fn merge(&mut self, other: &MultiAsset) {
        for (unit, qty) in other.iter() {
            self.add(&unit, qty);
        }
    }

    /// Subtract every entry of `other` from `self`.
    pub fn subtract(&mut self, other: &MultiAsset) {
        for (unit, qty) in other.iter() {
            self.add(&unit, -qty);
        }
    }

    /// Quantity held of `unit` (zero when absent).
    pub fn quantity_of(&self, unit: &Unit) -> i128 {
        self.0
            .get(&unit.policy_id)
            .and_then(|assets| assets.get(&unit.asset_name))
            .copied()
            .unwrap_or(0)
    }

    /// Whether the bundle holds nothing.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether every quantity is positive.
    pub fn is_positive(&self) -> bool {
        self.iter().all(|(_, qty)| qty > 0)
    }

    /// Policies present in the bundle, in sorted order.
    pub fn policies(&self) -> impl Iterator<Item = &PolicyId> {
        self.0.keys()
    }

    /// Iterate `(unit, quantity)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Unit, i128)> + '_ {
        self.0.iter().flat_map(|(policy, assets)| {
            assets
                .iter()
                .map(move |(name, qty)| (Unit::new(*policy, name.clone()), *qty))
        })
    }

    /// Write as a CBOR map of policy → (asset name → quantity).
    pub fn write_to(&self, w: &mut CborWriter) {
        w.write_map_header(self.0.len());
        for (policy, assets) in &self.0 {
            w.write_bytes(policy.as_bytes());
            w.write_map_header(assets.len());
            for (name, qty) in assets {
                w.write_bytes(name.as_bytes());
                write_int(w, *qty);
            }
        }
    }
}

fn write_int(w: &mut CborWriter, n: i128) {
    if n >= 0 {
        w.write_uint(n as u64);
    } else {
        w.write_nint((-1 - n) as u64);
    }
}

/// An amount of lovelace plus native assets carried by an output.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Value {
    /// Lovelace (1 ada = 1 000 000 lovelace).
    pub lovelace: u64,
    /// Native assets. All quantities are positive.
    pub assets: MultiAsset,
}

impl Value {
    /// A value of pure lovelace.
    pub fn lovelace(lovelace: u64) -> Self {
        Self {
            lovelace,
            assets: MultiAsset::new(),
        }
    }

    /// Builder-style: add `quantity` of `unit`.
    pub fn with_asset(mut self, unit: &Unit, quantity: u64) -> Self {
        self.assets.add(unit, i128::from(quantity));
        self
    }

    /// Quantity held of `unit`.
    pub fn quantity_of(&self, unit: &Unit) -> i128 {
        self.assets.quantity_of(unit)
    }

    /// Add another value into this one.
    pub fn add(&mut self, other: &Value) {
        self.lovelace = self.lovelace.saturating_add(other.lovelace);
        self.assets.merge(&other.assets);
    }

    /// Write in ledger form: a bare coin, or `[coin, multiasset]`.
    pub fn write_to(&self, w: &mut CborWriter) {
        if self.assets.is_empty() {
            w.write_uint(self.lovelace);
        } else {
            w.write_array_header(2);
            w.write_uint(self.lovelace);
            self.assets.write_to(w);
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} lovelace", self.lovelace)?;
        for (unit, qty) in self.assets.iter() {
            write!(f, " + {qty} {unit}")?;
        }
        Ok(())
    }
}
