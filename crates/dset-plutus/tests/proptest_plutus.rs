use proptest::prelude::*;

use dset_plutus::PlutusData;

fn arb_plutus_data() -> impl Strategy<Value = PlutusData> {
    let leaf = prop_oneof![
        any::<i64>().prop_map(|n| PlutusData::integer(n)),
        any::<u64>().prop_map(|n| PlutusData::integer(n)),
        any::<i128>().prop_map(PlutusData::Integer),
        prop::collection::vec(any::<u8>(), 0..150).prop_map(PlutusData::Bytes),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            (0u64..300, prop::collection::vec(inner.clone(), 0..4))
                .prop_map(|(index, fields)| PlutusData::constr(index, fields)),
            prop::collection::vec(inner.clone(), 0..4).prop_map(PlutusData::List),
            prop::collection::vec((inner.clone(), inner), 0..3).prop_map(PlutusData::Map),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn plutus_data_cbor_roundtrip(data in arb_plutus_data()) {
        let bytes = data.to_cbor();
        let decoded = PlutusData::from_cbor(&bytes).unwrap();
        prop_assert_eq!(&decoded, &data);
        // Re-encoding is canonical.
        prop_assert_eq!(decoded.to_cbor(), bytes);
    }

    #[test]
    fn truncated_cbor_never_panics(data in arb_plutus_data(), cut in 1usize..8) {
        let bytes = data.to_cbor();
        let end = bytes.len().saturating_sub(cut);
        let _ = PlutusData::from_cbor(&bytes[..end]);
    }
}
