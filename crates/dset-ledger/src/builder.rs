//! Transaction intents and balancing.
//!
//! A [`TxBuilder`] collects what a transaction must do (spend these
//! outputs, mint these assets, pay these outputs, carry this script,
//! expire at this time). [`TxBuilder::complete`] then turns the intent
//! into a balanced, unsigned [`Transaction`]: it selects wallet funds,
//! computes the fee, adds a change output and assigns redeemer indices
//! against the sorted inputs and policies.

use std::collections::BTreeMap;

use dset_plutus::PlutusData;

use crate::address::Address;
use crate::error::LedgerError;
use crate::params::ProtocolParameters;
use crate::provider::LedgerProvider;
use crate::script::PlutusScript;
use crate::transaction::{Redeemer, RedeemerTag, Transaction, TxBody, TxOutput};
use crate::types::{OutputReference, PolicyId, Utxo};
use crate::value::{MultiAsset, Value};
use crate::wallet::Wallet;

/// Bytes one key witness adds to the serialized transaction.
const VKEY_WITNESS_SIZE: usize = 104;

/// Fee estimation rounds before giving up.
const MAX_BALANCE_ROUNDS: usize = 8;

/// An unbalanced transaction intent.
#[derive(Debug, Clone, Default)]
pub struct TxBuilder {
    inputs: Vec<Utxo>,
    spend_redeemers: BTreeMap<OutputReference, PlutusData>,
    mint: MultiAsset,
    mint_redeemers: Vec<(PolicyId, PlutusData)>,
    outputs: Vec<TxOutput>,
    scripts: Vec<PlutusScript>,
    valid_to: Option<u64>,
}

impl TxBuilder {
    /// An empty intent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the upper validity bound as POSIX milliseconds.
    pub fn valid_to(mut self, unix_ms: u64) -> Self {
        self.valid_to = Some(unix_ms);
        self
    }

    /// Attach a script to the witness set. Attaching the same script
    /// twice keeps one copy.
    pub fn attach_script(mut self, script: PlutusScript) -> Self {
        if !self.scripts.contains(&script) {
            self.scripts.push(script);
        }
        self
    }

    /// Spend `utxos`, passing `redeemer` to the script guarding each of
    /// them (`None` for key-locked outputs).
    pub fn collect_from(
        mut self,
        utxos: impl IntoIterator<Item = Utxo>,
        redeemer: Option<PlutusData>,
    ) -> Self {
        for utxo in utxos {
            if let Some(data) = &redeemer {
                self.spend_redeemers.insert(utxo.out_ref, data.clone());
            }
            if !self.inputs.iter().any(|u| u.out_ref == utxo.out_ref) {
                self.inputs.push(utxo);
            }
        }
        self
    }

    /// Spend a key-locked output without a redeemer.
    pub fn add_input(self, utxo: Utxo) -> Self {
        self.collect_from([utxo], None)
    }

    /// Mint (positive) or burn (negative) `assets`, passing `redeemer` to
    /// each minting policy involved.
    pub fn mint_assets(mut self, assets: MultiAsset, redeemer: PlutusData) -> Self {
        for policy in assets.policies() {
            self.mint_redeemers.push((*policy, redeemer.clone()));
        }
        self.mint.merge(&assets);
        self
    }

    /// Pay `value` to `address`.
    pub fn pay_to_address(mut self, address: Address, value: Value) -> Self {
        self.outputs.push(TxOutput::new(address, value));
        self
    }

    /// Pay `value` to `address` with `datum` inlined in the output.
    pub fn pay_to_address_with_data(
        mut self,
        address: Address,
        datum: PlutusData,
        value: Value,
    ) -> Self {
        self.outputs.push(TxOutput::new(address, value).with_datum(datum));
        self
    }

    /// Outputs explicitly spent so far.
    pub fn inputs(&self) -> &[Utxo] {
        &self.inputs
    }

    /// Spend redeemer attached to `out_ref`, if any.
    pub fn spend_redeemer(&self, out_ref: &OutputReference) -> Option<&PlutusData> {
        self.spend_redeemers.get(out_ref)
    }

    /// Assets minted or burned so far.
    pub fn mint(&self) -> &MultiAsset {
        &self.mint
    }

    /// Mint redeemers in the order they were given.
    pub fn mint_redeemers(&self) -> &[(PolicyId, PlutusData)] {
        &self.mint_redeemers
    }

    /// Outputs requested so far.
    pub fn outputs(&self) -> &[TxOutput] {
        &self.outputs
    }

    /// Scripts attached so far.
    pub fn scripts(&self) -> &[PlutusScript] {
        &self.scripts
    }

    /// Upper validity bound in POSIX milliseconds.
    pub fn validity_end(&self) -> Option<u64> {
        self.valid_to
    }

    /// Balance the intent against the wallet's funds.
    ///
    /// Outputs below the minimum lovelace are topped up; wallet outputs
    /// are selected largest first until outputs, fee and a change
    /// deposit are covered. The result is unsigned.
    pub async fn complete<W, P>(self, wallet: &W, provider: &P) -> Result<Transaction, LedgerError>
    where
        W: Wallet + ?Sized,
        P: LedgerProvider + ?Sized,
    {
        let params = provider.protocol_parameters();
        let mint_redeemers = self.resolve_mint_redeemers()?;

        let outputs: Vec<TxOutput> = self
            .outputs
            .iter()
            .cloned()
            .map(|mut out| {
                out.value.lovelace = out.value.lovelace.max(params.min_utxo_lovelace);
                out
            })
            .collect();

        let change_address = wallet.address();
        let mut pool: Vec<Utxo> = provider
            .utxos_at(&change_address)
            .await?
            .into_iter()
            .filter(|u| !self.inputs.iter().any(|i| i.out_ref == u.out_ref))
            .collect();
        pool.sort_by(|a, b| {
            b.value()
                .lovelace
                .cmp(&a.value().lovelace)
                .then(a.out_ref.cmp(&b.out_ref))
        });

        let mut selected = self.select_assets(&outputs, &mut pool)?;

        let redeemer_count = self.spend_redeemers.len() + mint_redeemers.len();
        let ttl = self.valid_to.map(|ms| params.slot_config.slot_at(ms));
        let out_lovelace: u64 = outputs.iter().map(|o| o.value.lovelace).sum();

        let mut fee = params.min_fee(0, redeemer_count);
        for _ in 0..MAX_BALANCE_ROUNDS {
            let target = out_lovelace + fee + params.min_utxo_lovelace;
            loop {
                let available = self.input_lovelace(&selected);
                if available >= target {
                    break;
                }
                if pool.is_empty() {
                    return Err(LedgerError::InsufficientFunds {
                        needed: target,
                        available,
                    });
                }
                selected.push(pool.remove(0));
            }

            let tx = self.assemble(
                &outputs,
                &selected,
                fee,
                ttl,
                &mint_redeemers,
                &change_address,
                &params,
            )?;
            let required = params.min_fee(tx.size() + VKEY_WITNESS_SIZE, redeemer_count);
            if required <= fee {
                tracing::debug!(
                    inputs = tx.body.inputs.len(),
                    outputs = tx.body.outputs.len(),
                    fee,
                    redeemers = tx.redeemers.len(),
                    "balanced transaction"
                );
                return Ok(tx);
            }
            fee = required;
        }
        Err(LedgerError::ValueNotConserved(
            "fee estimate did not converge".to_string(),
        ))
    }

    fn resolve_mint_redeemers(&self) -> Result<BTreeMap<PolicyId, PlutusData>, LedgerError> {
        let mut resolved = BTreeMap::new();
        for (policy, data) in &self.mint_redeemers {
            match resolved.get(policy) {
                Some(existing) if existing != data => {
                    return Err(LedgerError::ConflictingMintRedeemer(*policy));
                }
                Some(_) => {}
                None => {
                    resolved.insert(*policy, data.clone());
                }
            }
        }
        Ok(resolved)
    }

    /// Pull wallet outputs carrying assets the outputs need beyond what
    /// the explicit inputs and mint provide.
    fn select_assets(
        &self,
        outputs: &[TxOutput],
        pool: &mut Vec<Utxo>,
    ) -> Result<Vec<Utxo>, LedgerError> {
        let mut needed = MultiAsset::new();
        for out in outputs {
            needed.merge(&out.value.assets);
        }
        for input in &self.inputs {
            needed.subtract(&input.value().assets);
        }
        needed.subtract(&self.mint);

        let mut selected: Vec<Utxo> = Vec::new();
        for (unit, quantity) in needed.iter().filter(|(_, q)| *q > 0) {
            let mut have: i128 = selected.iter().map(|u| u.value().quantity_of(&unit)).sum();
            while have < quantity {
                let Some(pos) = pool.iter().position(|u| u.holds(&unit)) else {
                    return Err(LedgerError::ValueNotConserved(format!(
                        "wallet lacks {} of {unit}",
                        quantity - have
                    )));
                };
                let utxo = pool.remove(pos);
                have += utxo.value().quantity_of(&unit);
                selected.push(utxo);
            }
        }
        Ok(selected)
    }

    fn input_lovelace(&self, selected: &[Utxo]) -> u64 {
        self.inputs
            .iter()
            .chain(selected)
            .map(|u| u.value().lovelace)
            .sum()
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        &self,
        outputs: &[TxOutput],
        selected: &[Utxo],
        fee: u64,
        ttl: Option<u64>,
        mint_redeemers: &BTreeMap<PolicyId, PlutusData>,
        change_address: &Address,
        params: &ProtocolParameters,
    ) -> Result<Transaction, LedgerError> {
        let mut total_in = Value::default();
        for utxo in self.inputs.iter().chain(selected) {
            total_in.add(utxo.value());
        }
        let mut total_out = Value::default();
        for out in outputs {
            total_out.add(&out.value);
        }

        let mut change_assets = total_in.assets;
        change_assets.merge(&self.mint);
        change_assets.subtract(&total_out.assets);
        if !change_assets.is_positive() {
            return Err(LedgerError::ValueNotConserved(
                "outputs and burns exceed the assets available".to_string(),
            ));
        }
        let needed = total_out.lovelace + fee;
        let change_lovelace = total_in.lovelace.checked_sub(needed).ok_or(
            LedgerError::InsufficientFunds {
                needed,
                available: total_in.lovelace,
            },
        )?;

        let mut body_outputs = outputs.to_vec();
        if change_lovelace > 0 || !change_assets.is_empty() {
            body_outputs.push(TxOutput::new(
                *change_address,
                Value {
                    lovelace: change_lovelace,
                    assets: change_assets,
                },
            ));
        }

        let mut inputs: Vec<OutputReference> = self
            .inputs
            .iter()
            .chain(selected)
            .map(|u| u.out_ref)
            .collect();
        inputs.sort();
        inputs.dedup();

        let mut redeemers = Vec::with_capacity(self.spend_redeemers.len() + mint_redeemers.len());
        for (out_ref, data) in &self.spend_redeemers {
            if let Ok(index) = inputs.binary_search(out_ref) {
                redeemers.push(Redeemer {
                    tag: RedeemerTag::Spend,
                    index: index as u32,
                    data: data.clone(),
                    ex_units: params.max_tx_ex_units,
                });
            }
        }
        for (policy, data) in mint_redeemers {
            if let Some(index) = self.mint.policies().position(|p| p == policy) {
                redeemers.push(Redeemer {
                    tag: RedeemerTag::Mint,
                    index: index as u32,
                    data: data.clone(),
                    ex_units: params.max_tx_ex_units,
                });
            }
        }

        Ok(Transaction {
            body: TxBody {
                inputs,
                outputs: body_outputs,
                fee,
                ttl,
                mint: self.mint.clone(),
            },
            scripts: self.scripts.clone(),
            redeemers,
            witnesses: Vec::new(),
        })
    }
}
