use proptest::prelude::*;

use dset_ledger::{
    Address, AssetName, Credential, MultiAsset, Network, OutputReference, PolicyId, SlotConfig,
    Unit,
};
use dset_plutus::{FromPlutusData, PlutusData, ToPlutusData};
use dset_primitives::TxHash;

fn arb_credential() -> impl Strategy<Value = Credential> {
    (any::<bool>(), prop::array::uniform28(any::<u8>())).prop_map(|(script, hash)| {
        if script {
            Credential::Script(hash)
        } else {
            Credential::Key(hash)
        }
    })
}

fn arb_address() -> impl Strategy<Value = Address> {
    (
        any::<bool>(),
        arb_credential(),
        prop::option::of(arb_credential()),
    )
        .prop_map(|(mainnet, payment, stake)| Address {
            network: if mainnet {
                Network::Mainnet
            } else {
                Network::Testnet
            },
            payment,
            stake,
        })
}

fn arb_unit() -> impl Strategy<Value = Unit> {
    (0u8..4, prop::collection::vec(any::<u8>(), 0..=32)).prop_map(|(policy, name)| {
        Unit::new(PolicyId::new([policy; 28]), AssetName::new(name).unwrap())
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn address_bytes_and_bech32_roundtrip(addr in arb_address()) {
        prop_assert_eq!(Address::from_bytes(&addr.to_bytes()).unwrap(), addr);
        let text = addr.to_string();
        prop_assert_eq!(text.parse::<Address>().unwrap(), addr);
    }

    #[test]
    fn output_reference_plutus_roundtrip(hash in prop::array::uniform32(any::<u8>()), index in any::<u32>()) {
        let out_ref = OutputReference::new(TxHash::new(hash), index);
        let data = out_ref.to_plutus_data();
        let decoded = OutputReference::from_plutus_data(&PlutusData::from_cbor(&data.to_cbor()).unwrap()).unwrap();
        prop_assert_eq!(decoded, out_ref);
    }

    #[test]
    fn multiasset_subtract_undoes_merge(
        base in prop::collection::vec((arb_unit(), 1i128..1000), 0..6),
        extra in prop::collection::vec((arb_unit(), -1000i128..1000), 0..6),
    ) {
        let mut a = MultiAsset::new();
        for (unit, qty) in &base {
            a.add(unit, *qty);
        }
        let mut b = MultiAsset::new();
        for (unit, qty) in &extra {
            b.add(unit, *qty);
        }
        let mut combined = a.clone();
        combined.merge(&b);
        combined.subtract(&b);
        prop_assert_eq!(combined, a);
    }

    #[test]
    fn slot_time_roundtrip(zero_time in 0u64..1u64 << 42, slot in 0u64..1u64 << 30) {
        let cfg = SlotConfig { zero_time, zero_slot: 0, slot_length: 1000 };
        prop_assert_eq!(cfg.slot_at(cfg.time_at(slot)), slot);
        prop_assert_eq!(cfg.slot_at(cfg.time_at(slot) + 999), slot);
    }
}
