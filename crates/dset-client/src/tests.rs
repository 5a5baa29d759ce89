//! Tests for the dset-client crate.
//!
//! Identifier and datum vectors are checked against the bytes the
//! validator expects.

use dset_ledger::{
    Address, Credential, LedgerError, Network, OutputReference, PlutusScript, PlutusVersion,
    TxOutput, Utxo, Value,
};
use dset_plutus::{FromPlutusData, PlutusData, ToPlutusData};
use dset_primitives::TxHash;

use crate::blueprint::Blueprint;
use crate::config::SetConfig;
use crate::error::SetError;
use crate::factory::{
    build_continue_tx, build_genesis_tx, build_split_tx, decode_node, ContinueConfig,
    GenesisConfig, SplitConfig,
};
use crate::node_id::{derive_node_id, NodeId};
use crate::schema::{Requirement, SetAction, SetNode, SpendRedeemer};

const ZERO_OREF_ID: &str = "3ae6c26cf942220b86842d5788f7b3c069eeb6211c76e89e1be6f0eb389ac1b9";

fn seq_hash() -> TxHash {
    let mut bytes = [0u8; 32];
    for (i, b) in bytes.iter_mut().enumerate() {
        *b = i as u8;
    }
    TxHash::new(bytes)
}

fn zero_oref() -> OutputReference {
    OutputReference::new(TxHash::default(), 0)
}

fn script() -> PlutusScript {
    PlutusScript::new(PlutusVersion::V2, vec![0x49, 0x01, 0x00, 0x00, 0x32, 0x22, 0x53, 0x00, 0x11])
}

fn script_address() -> Address {
    script().address(Network::Testnet)
}

fn node_utxo(out_ref: OutputReference, node: &SetNode) -> Utxo {
    let policy_id = script().policy_id();
    Utxo {
        out_ref,
        output: TxOutput::new(
            script_address(),
            Value::lovelace(2_000_000).with_asset(&node.id.unit(policy_id), 1),
        )
        .with_datum(node.to_plutus_data()),
    }
}

// -----------------------------------------------------------------------
// Identifiers
// -----------------------------------------------------------------------

#[test]
fn test_node_id_vectors() {
    assert_eq!(derive_node_id(&zero_oref()).to_hex(), ZERO_OREF_ID);
    assert_eq!(
        derive_node_id(&OutputReference::new(seq_hash(), 0)).to_hex(),
        "fd6b4980c002f19857761011c036d400ea93407990057a3892f74ae347a0ffa3"
    );
    assert_eq!(
        derive_node_id(&OutputReference::new(seq_hash(), 1)).to_hex(),
        "6735ef42b1cfc071a188f4f5a05cead5f21e5bf93a697bdb1ca168f5c909f072"
    );
}

#[test]
fn test_node_id_text_and_asset_name() {
    let id: NodeId = ZERO_OREF_ID.parse().unwrap();
    assert_eq!(id.to_string(), ZERO_OREF_ID);
    assert_eq!(id.asset_name().as_bytes(), id.as_bytes());
    assert!(NodeId::from_hex("abcd").is_err());

    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, format!("\"{ZERO_OREF_ID}\""));
    let back: NodeId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
}

// -----------------------------------------------------------------------
// Schema
// -----------------------------------------------------------------------

#[test]
fn test_root_datum_encoding() {
    let id = derive_node_id(&zero_oref());
    let node = SetNode::root(id, vec![vec![0x01], vec![0x03]]);
    let expected = format!("d8799f5820{ZERO_OREF_ID}d87a80d87a809f41014103ffd87a80ff");
    assert_eq!(node.to_plutus_data().to_hex(), expected);
    assert_eq!(SetNode::from_cbor(&hex::decode(&expected).unwrap()).unwrap(), node);
}

#[test]
fn test_redeemer_encoding() {
    let oref_hex = format!("d8799fd8799f5820{}ff00ff", "00".repeat(32));
    let split = SetAction::BinarySplit {
        consuming: zero_oref(),
    };
    assert_eq!(SetAction::Unit.to_plutus_data().to_hex(), "d87980");
    assert_eq!(split.to_plutus_data().to_hex(), format!("d87a9f{oref_hex}ff"));

    let wrapped = SpendRedeemer { wrapper: split };
    assert_eq!(
        wrapped.to_plutus_data().to_hex(),
        format!("d8799fd87a9f{oref_hex}ffff")
    );
    assert_eq!(
        SpendRedeemer {
            wrapper: SetAction::Unit
        }
        .to_plutus_data()
        .to_hex(),
        "d8799fd87980ff"
    );
    assert_eq!(
        SpendRedeemer::from_plutus_data(&wrapped.to_plutus_data()).unwrap(),
        wrapped
    );
}

#[test]
fn test_requirement_roundtrip() {
    let id = derive_node_id(&zero_oref());
    for requires in [
        Requirement::RequireMint(vec![0xaa; 28]),
        Requirement::RequireStake(vec![0xbb; 28]),
    ] {
        let node = SetNode {
            id,
            next: Some(id),
            is_head: false,
            values: Vec::new(),
            requires: Some(requires),
        };
        let decoded = SetNode::from_plutus_data(&node.to_plutus_data()).unwrap();
        assert_eq!(decoded, node);
    }
}

#[test]
fn test_datum_rejects_wrong_shape() {
    let bad_arity = PlutusData::constr(0, vec![PlutusData::bytes(vec![0u8; 32])]);
    assert!(SetNode::from_plutus_data(&bad_arity).is_err());

    let short_id = SetNode::root(derive_node_id(&zero_oref()), Vec::new())
        .to_plutus_data()
        .to_hex()
        .replacen(&format!("5820{ZERO_OREF_ID}"), "4100", 1);
    assert!(SetNode::from_cbor(&hex::decode(short_id).unwrap()).is_err());

    assert!(SetAction::from_plutus_data(&PlutusData::constr(2, Vec::new())).is_err());
}

#[test]
fn test_split_nodes() {
    let id = derive_node_id(&zero_oref());
    let new_id = derive_node_id(&OutputReference::new(seq_hash(), 0));
    let root = SetNode::root(id, vec![vec![1], vec![2], vec![3]]);

    let (retained, created) = root.split(new_id);
    assert_eq!(retained.id, id);
    assert_eq!(retained.next, Some(new_id));
    assert!(retained.is_head);
    assert_eq!(retained.values, vec![vec![1], vec![2]]);

    assert_eq!(created.id, new_id);
    assert_eq!(created.next, None);
    assert!(!created.is_head);
    assert_eq!(created.values, vec![vec![3]]);
}

#[test]
fn test_split_inherits_successor_and_requirement() {
    let id = derive_node_id(&zero_oref());
    let tail = derive_node_id(&OutputReference::new(seq_hash(), 1));
    let new_id = derive_node_id(&OutputReference::new(seq_hash(), 0));
    let node = SetNode {
        id,
        next: Some(tail),
        is_head: false,
        values: Vec::new(),
        requires: Some(Requirement::RequireMint(vec![7])),
    };
    let (retained, created) = node.split(new_id);
    assert!(!retained.is_head);
    assert_eq!(created.next, Some(tail));
    assert_eq!(created.requires, node.requires);
    assert!(retained.values.is_empty() && created.values.is_empty());
}

// -----------------------------------------------------------------------
// Factories
// -----------------------------------------------------------------------

#[test]
fn test_genesis_factory() {
    let wallet_addr = Address::enterprise(Network::Testnet, Credential::Key([3u8; 28]));
    let seed = Utxo {
        out_ref: zero_oref(),
        output: TxOutput::new(wallet_addr, Value::lovelace(10_000_000)),
    };
    let builder = build_genesis_tx(&GenesisConfig {
        seed: seed.clone(),
        script: script(),
        script_address: script_address(),
        values: vec![vec![1], vec![3]],
        valid_to: 30_000,
    })
    .unwrap();

    let id = derive_node_id(&seed.out_ref);
    let unit = id.unit(script().policy_id());
    assert_eq!(builder.inputs(), &[seed.clone()]);
    assert!(builder.spend_redeemer(&seed.out_ref).is_none());
    assert_eq!(builder.mint().quantity_of(&unit), 1);
    assert_eq!(builder.mint_redeemers()[0].1, SetAction::Unit.to_plutus_data());
    assert_eq!(builder.validity_end(), Some(30_000));
    assert_eq!(builder.scripts(), &[script()]);

    let out = &builder.outputs()[0];
    assert_eq!(out.address, script_address());
    assert_eq!(out.value.quantity_of(&unit), 1);
    let datum = SetNode::from_plutus_data(out.datum.as_ref().unwrap()).unwrap();
    assert_eq!(datum, SetNode::root(id, vec![vec![1], vec![3]]));
}

#[test]
fn test_continue_factory() {
    let id = derive_node_id(&zero_oref());
    let utxo = node_utxo(
        OutputReference::new(seq_hash(), 0),
        &SetNode::root(id, vec![vec![1]]),
    );
    let builder = build_continue_tx(&ContinueConfig {
        node: utxo.clone(),
        id,
        script: script(),
        script_address: script_address(),
        policy_id: script().policy_id(),
        valid_to: 1,
    })
    .unwrap();

    assert_eq!(
        builder.spend_redeemer(&utxo.out_ref),
        Some(
            &SpendRedeemer {
                wrapper: SetAction::Unit
            }
            .to_plutus_data()
        )
    );
    assert!(builder.mint().is_empty());
    let datum = SetNode::from_plutus_data(builder.outputs()[0].datum.as_ref().unwrap()).unwrap();
    assert_eq!(datum, SetNode::root(id, Vec::new()));
}

#[test]
fn test_continue_factory_rejects_foreign_output() {
    let id = derive_node_id(&zero_oref());
    let other = derive_node_id(&OutputReference::new(seq_hash(), 1));
    let utxo = node_utxo(zero_oref(), &SetNode::root(other, Vec::new()));
    let result = build_continue_tx(&ContinueConfig {
        node: utxo,
        id,
        script: script(),
        script_address: script_address(),
        policy_id: script().policy_id(),
        valid_to: 1,
    });
    assert!(matches!(result, Err(SetError::InvalidDatum(_))));
}

#[test]
fn test_split_factory() {
    let id = derive_node_id(&zero_oref());
    let node_ref = OutputReference::new(seq_hash(), 0);
    let utxo = node_utxo(node_ref, &SetNode::root(id, vec![vec![1], vec![3]]));
    let policy_id = script().policy_id();

    let (builder, new_id) = build_split_tx(&SplitConfig {
        node: utxo,
        id,
        script: script(),
        script_address: script_address(),
        policy_id,
        valid_to: 1,
    })
    .unwrap();
    assert_eq!(new_id, derive_node_id(&node_ref));

    let action = SetAction::BinarySplit {
        consuming: node_ref,
    };
    assert_eq!(
        builder.spend_redeemer(&node_ref),
        Some(
            &SpendRedeemer {
                wrapper: action.clone()
            }
            .to_plutus_data()
        )
    );
    assert_eq!(builder.mint_redeemers()[0].1, action.to_plutus_data());
    assert_eq!(builder.mint().quantity_of(&new_id.unit(policy_id)), 1);

    let outputs = builder.outputs();
    assert_eq!(outputs.len(), 2);
    let first = SetNode::from_plutus_data(outputs[0].datum.as_ref().unwrap()).unwrap();
    let second = SetNode::from_plutus_data(outputs[1].datum.as_ref().unwrap()).unwrap();
    assert_eq!(first.next, Some(new_id));
    assert_eq!(first.values, vec![vec![1]]);
    assert_eq!(second.id, new_id);
    assert_eq!(second.values, vec![vec![3]]);
    assert_eq!(outputs[0].value.quantity_of(&id.unit(policy_id)), 1);
    assert_eq!(outputs[1].value.quantity_of(&new_id.unit(policy_id)), 1);
}

#[test]
fn test_decode_node_requires_datum() {
    let utxo = Utxo {
        out_ref: zero_oref(),
        output: TxOutput::new(script_address(), Value::lovelace(2_000_000)),
    };
    assert!(matches!(decode_node(&utxo), Err(SetError::InvalidDatum(_))));
}

// -----------------------------------------------------------------------
// Config, blueprint, errors
// -----------------------------------------------------------------------

#[test]
fn test_config_defaults_and_toml() {
    let defaults = SetConfig::default();
    assert_eq!(defaults.validity_window_ms, 30_000);
    assert_eq!(defaults.genesis_values().unwrap(), vec![vec![1], vec![3]]);
    assert_eq!(SetConfig::from_toml_str("").unwrap(), defaults);

    let config = SetConfig::from_toml_str(
        r#"
        network = "mainnet"
        validity_window_ms = 60000
        genesis_values = ["aa", "bbcc"]
        "#,
    )
    .unwrap();
    assert_eq!(config.network, Network::Mainnet);
    assert_eq!(config.validity_window_ms, 60_000);
    assert_eq!(config.genesis_values().unwrap(), vec![vec![0xaa], vec![0xbb, 0xcc]]);
}

#[test]
fn test_config_rejects_invalid() {
    assert!(matches!(
        SetConfig::from_toml_str("validity_window_ms = 0"),
        Err(SetError::Config(_))
    ));
    assert!(matches!(
        SetConfig::from_toml_str("genesis_values = [\"xyz\"]"),
        Err(SetError::Config(_))
    ));
    assert!(matches!(
        SetConfig::from_toml_str("network = 5"),
        Err(SetError::Config(_))
    ));
}

#[test]
fn test_config_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dset.toml");
    std::fs::write(
        &path,
        "validity_window_ms = 45000\nblueprint_validator_title = \"custom.mint\"\n",
    )
    .unwrap();

    let config = SetConfig::load(&path).unwrap();
    assert_eq!(config.validity_window_ms, 45_000);
    assert_eq!(config.blueprint_validator_title, "custom.mint");
    assert_eq!(config.network, Network::Testnet);

    std::fs::write(&path, "validity_window_ms = 0\n").unwrap();
    assert!(matches!(SetConfig::load(&path), Err(SetError::Config(_))));

    assert!(matches!(
        SetConfig::load(dir.path().join("missing.toml")),
        Err(SetError::Io(_))
    ));
}

const BLUEPRINT: &str = r#"{
  "preamble": {
    "title": "acme/distributed_set",
    "version": "0.0.0",
    "plutusVersion": "v2"
  },
  "validators": [
    {
      "title": "distributed_set.mint_distributed_set",
      "redeemer": { "title": "redeemer", "schema": {} },
      "parameters": [{ "title": "seed", "schema": {} }],
      "compiledCode": "490100003222530011",
      "hash": "00"
    },
    {
      "title": "distributed_set.spend_distributed_set",
      "compiledCode": "4901000032225300111"
    }
  ]
}"#;

#[test]
fn test_blueprint_lookup() {
    let blueprint = Blueprint::from_json_str(BLUEPRINT).unwrap();
    let validator = blueprint
        .validator("distributed_set.mint_distributed_set")
        .unwrap();
    assert_eq!(validator, script());
    assert!(matches!(
        blueprint.validator("missing.validator"),
        Err(SetError::Blueprint(_))
    ));
    // Odd-length hex.
    assert!(matches!(
        blueprint.validator("distributed_set.spend_distributed_set"),
        Err(SetError::Blueprint(_))
    ));
}

#[test]
fn test_blueprint_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plutus.json");
    std::fs::write(&path, BLUEPRINT).unwrap();

    let blueprint = Blueprint::load(&path).unwrap();
    assert_eq!(
        blueprint.validator("distributed_set.mint_distributed_set").unwrap(),
        script()
    );

    std::fs::write(&path, "not json").unwrap();
    assert!(matches!(Blueprint::load(&path), Err(SetError::Json(_))));

    assert!(matches!(
        Blueprint::load(dir.path().join("missing.json")),
        Err(SetError::Io(_))
    ));
}

#[test]
fn test_blueprint_rejects_unknown_version() {
    let json = BLUEPRINT.replace("\"v2\"", "\"v9\"");
    let blueprint = Blueprint::from_json_str(&json).unwrap();
    assert!(blueprint.plutus_version().is_err());
    assert!(Blueprint::from_json_str("{}").is_err());
}

#[test]
fn test_submission_error_mapping() {
    assert!(matches!(
        SetError::from_submission(LedgerError::Expired { ttl: 30, slot: 40 }),
        SetError::ExpiredValidityWindow { ttl: 30, slot: 40 }
    ));
    assert!(matches!(
        SetError::from_submission(LedgerError::ScriptRejected("no".into())),
        SetError::ValidatorRejected(_)
    ));

    let id = derive_node_id(&zero_oref());
    let unit = id.unit(script().policy_id());
    assert!(matches!(
        SetError::from_lookup(&id, LedgerError::UnitNotFound(unit.clone())),
        SetError::UnknownIdentifier(found) if found == id
    ));
    assert!(matches!(
        SetError::from_lookup(&id, LedgerError::UnitNotUnique(unit)),
        SetError::Ledger(LedgerError::UnitNotUnique(_))
    ));
}
