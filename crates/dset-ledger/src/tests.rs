//! Tests for the dset-ledger crate: balancing with [`TxBuilder`] and
//! validation and settlement in the [`Emulator`].

use dset_plutus::PlutusData;

use crate::address::{Address, Credential, Network};
use crate::builder::TxBuilder;
use crate::emulator::{Emulator, ScriptInvocation};
use crate::error::LedgerError;
use crate::params::ProtocolParameters;
use crate::provider::LedgerProvider;
use crate::script::{PlutusScript, PlutusVersion};
use crate::transaction::RedeemerTag;
use crate::types::{AssetName, Unit};
use crate::value::{MultiAsset, Value};
use crate::wallet::{KeyWallet, Wallet};

const FUNDS: u64 = 100_000_000;

fn setup() -> (KeyWallet, Emulator) {
    let wallet = KeyWallet::from_bytes(&[1u8; 32], Network::Testnet);
    let emulator = Emulator::new(vec![(wallet.address(), Value::lovelace(FUNDS))]);
    (wallet, emulator)
}

fn test_script() -> PlutusScript {
    PlutusScript::new(PlutusVersion::V2, vec![0x46, 0x01, 0x00, 0x00, 0x22, 0x20, 0x01])
}

fn token(script: &PlutusScript) -> Unit {
    Unit::new(script.policy_id(), AssetName::new(b"node".to_vec()).unwrap())
}

fn recipient() -> Address {
    Address::enterprise(Network::Testnet, Credential::Key([42u8; 28]))
}

/// Build, sign and submit a mint of one token to the script address.
async fn mint_token(wallet: &KeyWallet, emulator: &Emulator) -> Result<(), LedgerError> {
    let script = test_script();
    let unit = token(&script);
    let tx = TxBuilder::new()
        .mint_assets(MultiAsset::singleton(&unit, 1), PlutusData::constr(0, vec![]))
        .pay_to_address_with_data(
            script.address(Network::Testnet),
            PlutusData::integer(7),
            Value::default().with_asset(&unit, 1),
        )
        .attach_script(script)
        .complete(wallet, emulator)
        .await?
        .sign(wallet);
    emulator.submit(tx).await?;
    Ok(())
}

// -----------------------------------------------------------------------
// Payments and settlement
// -----------------------------------------------------------------------

#[tokio::test]
async fn test_simple_payment_settles_after_block() {
    let (wallet, emulator) = setup();
    let tx = TxBuilder::new()
        .pay_to_address(recipient(), Value::lovelace(5_000_000))
        .complete(&wallet, &emulator)
        .await
        .expect("should balance")
        .sign(&wallet);

    let fee = tx.body.fee;
    assert!(fee >= ProtocolParameters::default().min_fee(tx.size(), 0));

    let hash = emulator.submit(tx).await.expect("should accept");

    // Inputs are spent at once; outputs wait for the block.
    assert!(emulator.utxos_at(&wallet.address()).await.unwrap().is_empty());
    assert!(emulator.utxos_at(&recipient()).await.unwrap().is_empty());
    assert!(!emulator.is_confirmed(&hash));

    emulator.await_block(1);
    assert!(emulator.is_confirmed(&hash));
    assert_eq!(emulator.block_height(), 1);

    let paid = emulator.utxos_at(&recipient()).await.unwrap();
    assert_eq!(paid.len(), 1);
    assert_eq!(paid[0].value().lovelace, 5_000_000);

    let change = emulator.utxos_at(&wallet.address()).await.unwrap();
    assert_eq!(change.len(), 1);
    assert_eq!(change[0].value().lovelace, FUNDS - 5_000_000 - fee);
}

#[tokio::test]
async fn test_small_outputs_are_topped_up() {
    let (wallet, emulator) = setup();
    let tx = TxBuilder::new()
        .pay_to_address(recipient(), Value::lovelace(1))
        .complete(&wallet, &emulator)
        .await
        .unwrap();
    assert_eq!(tx.body.outputs[0].value.lovelace, 2_000_000);
}

#[tokio::test]
async fn test_insufficient_funds() {
    let (wallet, emulator) = setup();
    let err = TxBuilder::new()
        .pay_to_address(recipient(), Value::lovelace(FUNDS))
        .complete(&wallet, &emulator)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
}

#[tokio::test]
async fn test_unsigned_transaction_is_rejected() {
    let (wallet, emulator) = setup();
    let tx = TxBuilder::new()
        .pay_to_address(recipient(), Value::lovelace(5_000_000))
        .complete(&wallet, &emulator)
        .await
        .unwrap();
    let err = emulator.submit(tx).await.unwrap_err();
    assert!(matches!(err, LedgerError::MissingWitness(_)));
}

#[tokio::test]
async fn test_tampered_signature_is_rejected() {
    let (wallet, emulator) = setup();
    let mut tx = TxBuilder::new()
        .pay_to_address(recipient(), Value::lovelace(5_000_000))
        .complete(&wallet, &emulator)
        .await
        .unwrap()
        .sign(&wallet);
    tx.witnesses[0].signature[0] ^= 0xff;
    let err = emulator.submit(tx).await.unwrap_err();
    assert!(matches!(err, LedgerError::InvalidSignature(_)));
}

#[tokio::test]
async fn test_double_spend_is_rejected() {
    let (wallet, emulator) = setup();
    let tx = TxBuilder::new()
        .pay_to_address(recipient(), Value::lovelace(5_000_000))
        .complete(&wallet, &emulator)
        .await
        .unwrap()
        .sign(&wallet);
    emulator.submit(tx.clone()).await.unwrap();
    let err = emulator.submit(tx).await.unwrap_err();
    assert!(matches!(err, LedgerError::InputSpent(_)));
}

#[tokio::test]
async fn test_expired_validity_window() {
    let (wallet, emulator) = setup();
    let tx = TxBuilder::new()
        .pay_to_address(recipient(), Value::lovelace(5_000_000))
        .valid_to(emulator.now() + 30_000)
        .complete(&wallet, &emulator)
        .await
        .unwrap()
        .sign(&wallet);
    assert_eq!(tx.body.ttl, Some(emulator.slot() + 30));

    emulator.await_block(2);
    let err = emulator.submit(tx).await.unwrap_err();
    assert!(matches!(err, LedgerError::Expired { ttl: 30, slot: 40 }));
}

// -----------------------------------------------------------------------
// Scripts: minting, spending, evaluation
// -----------------------------------------------------------------------

#[tokio::test]
async fn test_mint_then_find_by_unit() {
    let (wallet, emulator) = setup();
    let unit = token(&test_script());

    mint_token(&wallet, &emulator).await.expect("mint should succeed");
    let err = emulator.utxo_by_unit(&unit).await.unwrap_err();
    assert!(matches!(err, LedgerError::UnitNotFound(_)));

    emulator.await_block(1);
    let utxo = emulator.utxo_by_unit(&unit).await.expect("should find token");
    assert_eq!(utxo.value().quantity_of(&unit), 1);
    assert_eq!(utxo.value().lovelace, 2_000_000);
    assert_eq!(utxo.datum(), Some(&PlutusData::integer(7)));
}

#[tokio::test]
async fn test_spend_script_output() {
    let (wallet, emulator) = setup();
    let script = test_script();
    let unit = token(&script);
    mint_token(&wallet, &emulator).await.unwrap();
    emulator.await_block(1);

    let utxo = emulator.utxo_by_unit(&unit).await.unwrap();
    let tx = TxBuilder::new()
        .collect_from(vec![utxo.clone()], Some(PlutusData::integer(0)))
        .pay_to_address_with_data(
            script.address(Network::Testnet),
            PlutusData::integer(8),
            Value::default().with_asset(&unit, 1),
        )
        .attach_script(script)
        .complete(&wallet, &emulator)
        .await
        .unwrap()
        .sign(&wallet);

    let spend = tx
        .redeemers
        .iter()
        .find(|r| r.tag == RedeemerTag::Spend)
        .expect("spend redeemer");
    assert_eq!(tx.body.inputs[spend.index as usize], utxo.out_ref);

    emulator.submit(tx).await.unwrap();
    emulator.await_block(1);
    let moved = emulator.utxo_by_unit(&unit).await.unwrap();
    assert_ne!(moved.out_ref, utxo.out_ref);
    assert_eq!(moved.datum(), Some(&PlutusData::integer(8)));
}

fn reject_minting(invocation: &ScriptInvocation<'_>) -> Result<(), String> {
    if invocation.redeemer.tag == RedeemerTag::Mint {
        Err("minting closed".to_string())
    } else {
        Ok(())
    }
}

#[tokio::test]
async fn test_rejecting_evaluator() {
    let wallet = KeyWallet::from_bytes(&[1u8; 32], Network::Testnet);
    let emulator = Emulator::new(vec![(wallet.address(), Value::lovelace(FUNDS))])
        .with_evaluator(reject_minting);
    let err = mint_token(&wallet, &emulator).await.unwrap_err();
    assert!(matches!(err, LedgerError::ScriptRejected(ref msg) if msg == "minting closed"));
}

#[tokio::test]
async fn test_missing_script_and_redeemer() {
    let (wallet, emulator) = setup();
    let script = test_script();
    let unit = token(&script);

    let without_script = TxBuilder::new()
        .mint_assets(MultiAsset::singleton(&unit, 1), PlutusData::integer(0))
        .complete(&wallet, &emulator)
        .await
        .unwrap()
        .sign(&wallet);
    let err = emulator.submit(without_script).await.unwrap_err();
    assert!(matches!(err, LedgerError::MissingScript(_)));

    let mut without_redeemer = TxBuilder::new()
        .mint_assets(MultiAsset::singleton(&unit, 1), PlutusData::integer(0))
        .attach_script(script)
        .complete(&wallet, &emulator)
        .await
        .unwrap();
    without_redeemer.redeemers.clear();
    let err = emulator
        .submit(without_redeemer.sign(&wallet))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::MissingRedeemer {
            purpose: "mint",
            index: 0
        }
    ));
}

#[tokio::test]
async fn test_conflicting_mint_redeemers() {
    let (wallet, emulator) = setup();
    let unit = token(&test_script());
    let err = TxBuilder::new()
        .mint_assets(MultiAsset::singleton(&unit, 1), PlutusData::integer(0))
        .mint_assets(MultiAsset::singleton(&unit, 1), PlutusData::integer(1))
        .complete(&wallet, &emulator)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::ConflictingMintRedeemer(_)));
}

#[test]
fn test_attach_script_deduplicates() {
    let builder = TxBuilder::new()
        .attach_script(test_script())
        .attach_script(test_script());
    assert_eq!(builder.scripts().len(), 1);
}

#[test]
fn test_apply_params_changes_hash() {
    let emulator = Emulator::new(Vec::new());
    let base = test_script();
    let a = emulator
        .apply_params(&base, &[PlutusData::integer(1)])
        .unwrap();
    let b = emulator
        .apply_params(&base, &[PlutusData::integer(2)])
        .unwrap();
    assert_ne!(a.policy_id(), b.policy_id());
    assert_ne!(a.policy_id(), base.policy_id());
    assert_eq!(
        a,
        emulator.apply_params(&base, &[PlutusData::integer(1)]).unwrap()
    );
}

#[test]
fn test_params_json_overrides() {
    let params: ProtocolParameters =
        serde_json::from_str(r#"{"fee_per_byte": 50, "slot_config": {"zero_time": 1000}}"#)
            .unwrap();
    assert_eq!(params.fee_per_byte, 50);
    assert_eq!(params.fee_base, ProtocolParameters::default().fee_base);
    assert_eq!(params.slot_config.slot_length, 1000);
    assert_eq!(params.slot_config.slot_at(3500), 2);

    assert_eq!(serde_json::to_string(&Network::Mainnet).unwrap(), "\"mainnet\"");
    let network: Network = serde_json::from_str("\"testnet\"").unwrap();
    assert_eq!(network, Network::Testnet);
}
