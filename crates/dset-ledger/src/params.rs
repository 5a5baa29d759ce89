//! Protocol parameters and slot/time conversion.

use serde::{Deserialize, Serialize};

/// Execution budget for a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExUnits {
    /// Memory units.
    pub mem: u64,
    /// CPU steps.
    pub steps: u64,
}

impl Default for ExUnits {
    fn default() -> Self {
        Self {
            mem: 1_000_000,
            steps: 500_000_000,
        }
    }
}

/// Mapping between POSIX milliseconds and ledger slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotConfig {
    /// POSIX time in milliseconds of `zero_slot`.
    pub zero_time: u64,
    /// Slot number at `zero_time`.
    pub zero_slot: u64,
    /// Milliseconds per slot.
    pub slot_length: u64,
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            zero_time: 0,
            zero_slot: 0,
            slot_length: 1000,
        }
    }
}

impl SlotConfig {
    /// The slot containing POSIX time `unix_ms`. Times before `zero_time`
    /// map to `zero_slot`.
    pub fn slot_at(&self, unix_ms: u64) -> u64 {
        let elapsed = unix_ms.saturating_sub(self.zero_time);
        self.zero_slot + elapsed / self.slot_length.max(1)
    }

    /// The POSIX time in milliseconds at which `slot` begins.
    pub fn time_at(&self, slot: u64) -> u64 {
        self.zero_time + slot.saturating_sub(self.zero_slot) * self.slot_length
    }
}

/// The subset of protocol parameters the transaction builder needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolParameters {
    /// Linear fee coefficient (lovelace per byte).
    pub fee_per_byte: u64,
    /// Constant fee term.
    pub fee_base: u64,
    /// Minimum lovelace every output must carry.
    pub min_utxo_lovelace: u64,
    /// Budget assigned to each redeemer.
    pub max_tx_ex_units: ExUnits,
    /// Price per memory unit, as (numerator, denominator).
    pub price_mem: (u64, u64),
    /// Price per CPU step, as (numerator, denominator).
    pub price_step: (u64, u64),
    /// Slot/time mapping.
    pub slot_config: SlotConfig,
}

impl Default for ProtocolParameters {
    fn default() -> Self {
        Self {
            fee_per_byte: 44,
            fee_base: 155_381,
            min_utxo_lovelace: 2_000_000,
            max_tx_ex_units: ExUnits::default(),
            price_mem: (577, 10_000),
            price_step: (721, 10_000_000),
            slot_config: SlotConfig::default(),
        }
    }
}

impl ProtocolParameters {
    /// Minimum fee for a transaction of `size` bytes with `redeemers`
    /// script executions at the default budget.
    pub fn min_fee(&self, size: usize, redeemers: usize) -> u64 {
        let size_fee = self.fee_base + self.fee_per_byte * size as u64;
        let ex = self.max_tx_ex_units;
        let per_redeemer = ceil_div(ex.mem * self.price_mem.0, self.price_mem.1.max(1))
            + ceil_div(ex.steps * self.price_step.0, self.price_step.1.max(1));
        size_fee + per_redeemer * redeemers as u64
    }
}

fn ceil_div(n: u64, d: u64) -> u64 {
    n.div_ceil(d)
}
