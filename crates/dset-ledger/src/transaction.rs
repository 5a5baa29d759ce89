//! Transaction outputs, bodies, witnesses and their ledger encoding.

use dset_plutus::cbor::CborWriter;
use dset_plutus::PlutusData;
use dset_primitives::TxHash;

use crate::address::Address;
use crate::params::ExUnits;
use crate::script::{PlutusScript, PlutusVersion};
use crate::types::OutputReference;
use crate::value::{MultiAsset, Value};
use crate::wallet::Wallet;

/// CBOR tag for embedded CBOR (used for inline datums).
const TAG_ENCODED_CBOR: u64 = 24;
const CBOR_TRUE: u8 = 0xf5;
const CBOR_NULL: u8 = 0xf6;

/// A transaction output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutput {
    /// Destination address.
    pub address: Address,
    /// Value carried.
    pub value: Value,
    /// Inline datum, if any.
    pub datum: Option<PlutusData>,
}

impl TxOutput {
    /// An output without a datum.
    pub fn new(address: Address, value: Value) -> Self {
        Self {
            address,
            value,
            datum: None,
        }
    }

    /// Attach an inline datum.
    pub fn with_datum(mut self, datum: PlutusData) -> Self {
        self.datum = Some(datum);
        self
    }

    /// Post-Alonzo map form: `{0: address, 1: value, ?2: [1, #6.24(datum)]}`.
    pub fn write_to(&self, w: &mut CborWriter) {
        w.write_map_header(if self.datum.is_some() { 3 } else { 2 });
        w.write_uint(0);
        w.write_bytes(&self.address.to_bytes());
        w.write_uint(1);
        self.value.write_to(w);
        if let Some(datum) = &self.datum {
            w.write_uint(2);
            w.write_array_header(2);
            w.write_uint(1);
            w.write_tag(TAG_ENCODED_CBOR);
            w.write_bytes(&datum.to_cbor());
        }
    }
}

/// What a redeemer is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RedeemerTag {
    /// Spending a script-locked input.
    Spend,
    /// Minting or burning under a script policy.
    Mint,
}

impl RedeemerTag {
    fn code(&self) -> u64 {
        match self {
            RedeemerTag::Spend => 0,
            RedeemerTag::Mint => 1,
        }
    }

    /// Lowercase label for diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            RedeemerTag::Spend => "spend",
            RedeemerTag::Mint => "mint",
        }
    }
}

/// A redeemer: the argument passed to a script for one purpose.
///
/// `index` points into the sorted inputs (for [`RedeemerTag::Spend`]) or
/// the sorted minting policies (for [`RedeemerTag::Mint`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redeemer {
    /// Purpose.
    pub tag: RedeemerTag,
    /// Position within the sorted inputs or policies.
    pub index: u32,
    /// Argument data.
    pub data: PlutusData,
    /// Execution budget.
    pub ex_units: ExUnits,
}

impl Redeemer {
    fn write_to(&self, w: &mut CborWriter) {
        w.write_array_header(4);
        w.write_uint(self.tag.code());
        w.write_uint(u64::from(self.index));
        self.data.write_to(w);
        w.write_array_header(2);
        w.write_uint(self.ex_units.mem);
        w.write_uint(self.ex_units.steps);
    }
}

/// A verification key and its signature over the body hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VkeyWitness {
    /// Ed25519 public key.
    pub vkey: [u8; 32],
    /// Ed25519 signature.
    pub signature: [u8; 64],
}

/// The signed part of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TxBody {
    /// Spent outputs, in ledger order.
    pub inputs: Vec<OutputReference>,
    /// Created outputs.
    pub outputs: Vec<TxOutput>,
    /// Fee in lovelace.
    pub fee: u64,
    /// Upper validity bound (exclusive slot).
    pub ttl: Option<u64>,
    /// Minted (positive) and burned (negative) assets.
    pub mint: MultiAsset,
}

impl TxBody {
    /// Encode as the ledger's body map.
    pub fn write_to(&self, w: &mut CborWriter) {
        let entries = 3 + usize::from(self.ttl.is_some()) + usize::from(!self.mint.is_empty());
        w.write_map_header(entries);

        w.write_uint(0);
        w.write_array_header(self.inputs.len());
        for input in &self.inputs {
            w.write_array_header(2);
            w.write_bytes(input.tx_hash.as_bytes());
            w.write_uint(u64::from(input.output_index));
        }

        w.write_uint(1);
        w.write_array_header(self.outputs.len());
        for output in &self.outputs {
            output.write_to(w);
        }

        w.write_uint(2);
        w.write_uint(self.fee);

        if let Some(ttl) = self.ttl {
            w.write_uint(3);
            w.write_uint(ttl);
        }
        if !self.mint.is_empty() {
            w.write_uint(9);
            self.mint.write_to(w);
        }
    }

    /// Serialized body.
    pub fn to_cbor(&self) -> Vec<u8> {
        let mut w = CborWriter::with_capacity(256);
        self.write_to(&mut w);
        w.into_bytes()
    }

    /// The transaction id: Blake2b-256 of the serialized body.
    pub fn hash(&self) -> TxHash {
        TxHash::digest(&self.to_cbor())
    }
}

/// A complete transaction: body plus witness set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transaction {
    /// The body.
    pub body: TxBody,
    /// Attached scripts.
    pub scripts: Vec<PlutusScript>,
    /// Redeemers for script inputs and policies.
    pub redeemers: Vec<Redeemer>,
    /// Key witnesses.
    pub witnesses: Vec<VkeyWitness>,
}

impl Transaction {
    /// The transaction id.
    pub fn hash(&self) -> TxHash {
        self.body.hash()
    }

    /// Add the wallet's signature over the body hash.
    ///
    /// Signing twice with the same key leaves a single witness.
    pub fn sign<W: Wallet + ?Sized>(mut self, wallet: &W) -> Self {
        let witness = wallet.sign(&self.hash());
        if !self.witnesses.iter().any(|w| w.vkey == witness.vkey) {
            self.witnesses.push(witness);
        }
        self
    }

    /// The attached script with the given hash, if any.
    pub fn script(&self, hash: &[u8; 28]) -> Option<&PlutusScript> {
        self.scripts.iter().find(|s| &s.hash() == hash)
    }

    /// The redeemer for `(tag, index)`, if any.
    pub fn redeemer(&self, tag: RedeemerTag, index: u32) -> Option<&Redeemer> {
        self.redeemers
            .iter()
            .find(|r| r.tag == tag && r.index == index)
    }

    /// Encode as `[body, witness_set, true, null]`.
    pub fn write_to(&self, w: &mut CborWriter) {
        w.write_array_header(4);
        self.body.write_to(w);
        self.write_witness_set(w);
        w.write_raw(&[CBOR_TRUE, CBOR_NULL]);
    }

    fn write_witness_set(&self, w: &mut CborWriter) {
        let by_version = |v: PlutusVersion| -> Vec<&PlutusScript> {
            self.scripts.iter().filter(|s| s.version == v).collect()
        };
        // Keys in ascending order: vkeys, v1 scripts, redeemers, v2, v3.
        let script_groups = [
            (3u64, by_version(PlutusVersion::V1)),
            (6, by_version(PlutusVersion::V2)),
            (7, by_version(PlutusVersion::V3)),
        ];

        let entries = usize::from(!self.witnesses.is_empty())
            + usize::from(!self.redeemers.is_empty())
            + script_groups.iter().filter(|(_, g)| !g.is_empty()).count();
        w.write_map_header(entries);

        if !self.witnesses.is_empty() {
            w.write_uint(0);
            w.write_array_header(self.witnesses.len());
            for witness in &self.witnesses {
                w.write_array_header(2);
                w.write_bytes(&witness.vkey);
                w.write_bytes(&witness.signature);
            }
        }

        let write_group = |w: &mut CborWriter, key: u64, group: &[&PlutusScript]| {
            w.write_uint(key);
            w.write_array_header(group.len());
            for script in group {
                w.write_bytes(&script.bytes);
            }
        };

        let (v1_key, v1) = &script_groups[0];
        if !v1.is_empty() {
            write_group(w, *v1_key, v1.as_slice());
        }
        if !self.redeemers.is_empty() {
            w.write_uint(5);
            w.write_array_header(self.redeemers.len());
            for redeemer in &self.redeemers {
                redeemer.write_to(w);
            }
        }
        for (key, group) in &script_groups[1..] {
            if !group.is_empty() {
                write_group(w, *key, group.as_slice());
            }
        }
    }

    /// Serialized transaction.
    pub fn to_cbor(&self) -> Vec<u8> {
        let mut w = CborWriter::with_capacity(512);
        self.write_to(&mut w);
        w.into_bytes()
    }

    /// Serialized size in bytes.
    pub fn size(&self) -> usize {
        self.to_cbor().len()
    }

    /// Hex encoding of the serialized transaction.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_cbor())
    }
}
