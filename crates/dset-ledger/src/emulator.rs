//! An in-memory ledger that validates and settles transactions.
//!
//! Submission checks a transaction against the settled ledger and marks
//! its inputs spent at once; its outputs only become visible after the
//! next [`Emulator::await_block`]. Genesis funds sit at outputs of the
//! all-zero transaction hash, one index per funded address.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use ed25519_dalek::{Signature, Verifier, VerifyingKey};

use dset_plutus::PlutusData;
use dset_primitives::hash::blake2b_224;
use dset_primitives::TxHash;

use crate::address::{Address, Credential, Network};
use crate::error::LedgerError;
use crate::params::ProtocolParameters;
use crate::provider::LedgerProvider;
use crate::script::PlutusScript;
use crate::transaction::{Redeemer, RedeemerTag, Transaction, TxOutput};
use crate::types::{OutputReference, Unit, Utxo};
use crate::value::{MultiAsset, Value};

/// Slots the ledger advances per block.
pub const SLOTS_PER_BLOCK: u64 = 20;

/// One script execution the evaluator is asked to judge.
#[derive(Debug)]
pub struct ScriptInvocation<'a> {
    /// The transaction under validation.
    pub tx: &'a Transaction,
    /// Its inputs resolved against the ledger, in body order.
    pub inputs: &'a [Utxo],
    /// The script being run.
    pub script: &'a PlutusScript,
    /// The redeemer passed to it.
    pub redeemer: &'a Redeemer,
}

/// Decides whether a script accepts a transaction.
pub trait ScriptEvaluator: Send + Sync {
    /// `Err` carries the script's failure message.
    fn evaluate(&self, invocation: &ScriptInvocation<'_>) -> Result<(), String>;
}

/// An evaluator that accepts every script.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl ScriptEvaluator for AcceptAll {
    fn evaluate(&self, _invocation: &ScriptInvocation<'_>) -> Result<(), String> {
        Ok(())
    }
}

impl<F> ScriptEvaluator for F
where
    F: Fn(&ScriptInvocation<'_>) -> Result<(), String> + Send + Sync,
{
    fn evaluate(&self, invocation: &ScriptInvocation<'_>) -> Result<(), String> {
        self(invocation)
    }
}

#[derive(Debug)]
struct Entry {
    output: TxOutput,
    spent: bool,
}

#[derive(Debug, Default)]
struct State {
    slot: u64,
    block_height: u64,
    ledger: BTreeMap<OutputReference, Entry>,
    mempool: Vec<Transaction>,
    confirmed: BTreeSet<TxHash>,
}

impl State {
    fn unspent(&self) -> impl Iterator<Item = Utxo> + '_ {
        self.ledger
            .iter()
            .filter(|(_, entry)| !entry.spent)
            .map(|(out_ref, entry)| Utxo {
                out_ref: *out_ref,
                output: entry.output.clone(),
            })
    }
}

/// In-memory [`LedgerProvider`].
pub struct Emulator {
    state: Mutex<State>,
    params: ProtocolParameters,
    network: Network,
    evaluator: Box<dyn ScriptEvaluator>,
}

impl Emulator {
    /// Start a testnet ledger with `funds` as genesis outputs, using
    /// default protocol parameters with slot zero at the current time.
    pub fn new(funds: impl IntoIterator<Item = (Address, Value)>) -> Self {
        let mut params = ProtocolParameters::default();
        params.slot_config.zero_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self::with_params(funds, params)
    }

    /// Start a testnet ledger with explicit protocol parameters.
    pub fn with_params(
        funds: impl IntoIterator<Item = (Address, Value)>,
        params: ProtocolParameters,
    ) -> Self {
        let mut state = State::default();
        for (index, (address, value)) in funds.into_iter().enumerate() {
            state.ledger.insert(
                OutputReference::new(TxHash::default(), index as u32),
                Entry {
                    output: TxOutput::new(address, value),
                    spent: false,
                },
            );
        }
        Self {
            state: Mutex::new(state),
            params,
            network: Network::Testnet,
            evaluator: Box::new(AcceptAll),
        }
    }

    /// Replace the script evaluator.
    pub fn with_evaluator(mut self, evaluator: impl ScriptEvaluator + 'static) -> Self {
        self.evaluator = Box::new(evaluator);
        self
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Current slot.
    pub fn slot(&self) -> u64 {
        self.lock().slot
    }

    /// Number of blocks produced so far.
    pub fn block_height(&self) -> u64 {
        self.lock().block_height
    }

    /// Produce `blocks` blocks: advance the clock and settle every
    /// pending transaction.
    pub fn await_block(&self, blocks: u64) {
        let mut state = self.lock();
        state.slot += SLOTS_PER_BLOCK * blocks;
        state.block_height += blocks;
        let pending = std::mem::take(&mut state.mempool);
        for tx in pending {
            let hash = tx.hash();
            for (index, output) in tx.body.outputs.into_iter().enumerate() {
                state.ledger.insert(
                    OutputReference::new(hash, index as u32),
                    Entry {
                        output,
                        spent: false,
                    },
                );
            }
            state.confirmed.insert(hash);
        }
        tracing::debug!(
            slot = state.slot,
            height = state.block_height,
            "emulator advanced"
        );
    }

    /// Advance the clock by `slots` without producing a block.
    pub fn await_slot(&self, slots: u64) {
        self.lock().slot += slots;
    }

    /// Whether `hash` has been settled in a block.
    pub fn is_confirmed(&self, hash: &TxHash) -> bool {
        self.lock().confirmed.contains(hash)
    }

    /// Every settled unspent output.
    pub fn utxos(&self) -> Vec<Utxo> {
        self.lock().unspent().collect()
    }

    fn validate(&self, state: &State, tx: &Transaction) -> Result<Vec<Utxo>, LedgerError> {
        let body = &tx.body;
        if let Some(ttl) = body.ttl {
            if ttl <= state.slot {
                return Err(LedgerError::Expired {
                    ttl,
                    slot: state.slot,
                });
            }
        }

        let mut seen = BTreeSet::new();
        let mut resolved = Vec::with_capacity(body.inputs.len());
        for out_ref in &body.inputs {
            let entry = state
                .ledger
                .get(out_ref)
                .ok_or(LedgerError::InputNotFound(*out_ref))?;
            if entry.spent || !seen.insert(*out_ref) {
                return Err(LedgerError::InputSpent(*out_ref));
            }
            resolved.push(Utxo {
                out_ref: *out_ref,
                output: entry.output.clone(),
            });
        }

        self.check_balance(tx, &resolved)?;

        let minimum = self.params.min_fee(tx.size(), tx.redeemers.len());
        if body.fee < minimum {
            return Err(LedgerError::FeeTooSmall {
                fee: body.fee,
                minimum,
            });
        }

        let signers = verify_witnesses(tx)?;

        for (index, utxo) in resolved.iter().enumerate() {
            match utxo.output.address.payment {
                Credential::Key(key_hash) => {
                    if !signers.contains(&key_hash) {
                        return Err(LedgerError::MissingWitness(hex::encode(key_hash)));
                    }
                }
                Credential::Script(script_hash) => {
                    if utxo.datum().is_none() {
                        return Err(LedgerError::ScriptRejected(format!(
                            "script input {} carries no datum",
                            utxo.out_ref
                        )));
                    }
                    self.run_script(tx, &resolved, &script_hash, RedeemerTag::Spend, index)?;
                }
            }
        }

        for (index, policy) in body.mint.policies().enumerate() {
            self.run_script(tx, &resolved, policy.as_bytes(), RedeemerTag::Mint, index)?;
        }

        Ok(resolved)
    }

    fn check_balance(&self, tx: &Transaction, resolved: &[Utxo]) -> Result<(), LedgerError> {
        let body = &tx.body;
        let mut produced = Value::lovelace(body.fee);
        for (index, output) in body.outputs.iter().enumerate() {
            if output.value.lovelace < self.params.min_utxo_lovelace {
                return Err(LedgerError::OutputTooSmall {
                    index,
                    lovelace: output.value.lovelace,
                    minimum: self.params.min_utxo_lovelace,
                });
            }
            if !output.value.assets.is_positive() {
                return Err(LedgerError::InvalidValue(format!(
                    "output {index} carries a non-positive quantity"
                )));
            }
            produced.add(&output.value);
        }

        let mut consumed = Value::default();
        for utxo in resolved {
            consumed.add(utxo.value());
        }
        consumed.assets.merge(&body.mint);

        let mut residue: MultiAsset = consumed.assets.clone();
        residue.subtract(&produced.assets);
        if consumed.lovelace != produced.lovelace || !residue.is_empty() {
            return Err(LedgerError::ValueNotConserved(format!(
                "consumed {consumed}, produced {produced}"
            )));
        }
        Ok(())
    }

    fn run_script(
        &self,
        tx: &Transaction,
        resolved: &[Utxo],
        script_hash: &[u8; 28],
        tag: RedeemerTag,
        index: usize,
    ) -> Result<(), LedgerError> {
        let script = tx
            .script(script_hash)
            .ok_or_else(|| LedgerError::MissingScript(hex::encode(script_hash)))?;
        let index = index as u32;
        let redeemer = tx
            .redeemer(tag, index)
            .ok_or(LedgerError::MissingRedeemer {
                purpose: tag.label(),
                index,
            })?;
        self.evaluator
            .evaluate(&ScriptInvocation {
                tx,
                inputs: resolved,
                script,
                redeemer,
            })
            .map_err(LedgerError::ScriptRejected)
    }
}

/// Check every witness signature and return the signing key hashes.
fn verify_witnesses(tx: &Transaction) -> Result<BTreeSet<[u8; 28]>, LedgerError> {
    let hash = tx.hash();
    let mut signers = BTreeSet::new();
    for witness in &tx.witnesses {
        let vkey = VerifyingKey::from_bytes(&witness.vkey)
            .map_err(|e| LedgerError::InvalidSignature(format!("bad verification key: {e}")))?;
        let signature = Signature::from_bytes(&witness.signature);
        vkey.verify(hash.as_bytes(), &signature)
            .map_err(|_| LedgerError::InvalidSignature(hex::encode(witness.vkey)))?;
        signers.insert(blake2b_224(&witness.vkey));
    }
    Ok(signers)
}

impl LedgerProvider for Emulator {
    fn protocol_parameters(&self) -> ProtocolParameters {
        self.params
    }

    fn network(&self) -> Network {
        self.network
    }

    fn now(&self) -> u64 {
        self.params.slot_config.time_at(self.slot())
    }

    /// Stand-in for script application: the parameters' CBOR list is
    /// appended to the script bytes, so distinct parameters give distinct
    /// hashes.
    fn apply_params(
        &self,
        script: &PlutusScript,
        params: &[PlutusData],
    ) -> Result<PlutusScript, LedgerError> {
        let mut bytes = script.bytes.clone();
        bytes.extend_from_slice(&PlutusData::List(params.to_vec()).to_cbor());
        Ok(PlutusScript::new(script.version, bytes))
    }

    async fn utxos_at(&self, address: &Address) -> Result<Vec<Utxo>, LedgerError> {
        Ok(self
            .lock()
            .unspent()
            .filter(|u| &u.output.address == address)
            .collect())
    }

    async fn utxo_by_unit(&self, unit: &Unit) -> Result<Utxo, LedgerError> {
        let mut holders: Vec<Utxo> = self.lock().unspent().filter(|u| u.holds(unit)).collect();
        match holders.len() {
            0 => Err(LedgerError::UnitNotFound(unit.clone())),
            1 => Ok(holders.remove(0)),
            _ => Err(LedgerError::UnitNotUnique(unit.clone())),
        }
    }

    async fn submit(&self, tx: Transaction) -> Result<TxHash, LedgerError> {
        let mut state = self.lock();
        let hash = tx.hash();
        let resolved = match self.validate(&state, &tx) {
            Ok(resolved) => resolved,
            Err(err) => {
                tracing::warn!(tx_hash = %hash, error = %err, "transaction rejected");
                return Err(err);
            }
        };
        for utxo in &resolved {
            if let Some(entry) = state.ledger.get_mut(&utxo.out_ref) {
                entry.spent = true;
            }
        }
        state.mempool.push(tx);
        tracing::info!(tx_hash = %hash, slot = state.slot, "transaction accepted");
        Ok(hash)
    }
}
