use proptest::prelude::*;

use dset_primitives::bech32;
use dset_primitives::hash::{blake2b_224, blake2b_256};
use dset_primitives::TxHash;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn tx_hash_hex_roundtrip(bytes in prop::array::uniform32(any::<u8>())) {
        let hash = TxHash::new(bytes);
        let hash2 = TxHash::from_hex(&hash.to_string()).unwrap();
        prop_assert_eq!(hash, hash2);
    }

    #[test]
    fn bech32_roundtrip(payload in prop::collection::vec(any::<u8>(), 0..64)) {
        let encoded = bech32::encode("addr_test", &payload).unwrap();
        let (hrp, decoded) = bech32::decode(&encoded).unwrap();
        prop_assert_eq!(hrp, "addr_test");
        prop_assert_eq!(decoded, payload);
    }

    #[test]
    fn blake2b_is_deterministic(data in prop::collection::vec(any::<u8>(), 0..256)) {
        prop_assert_eq!(blake2b_256(&data), blake2b_256(&data));
        prop_assert_eq!(blake2b_224(&data), blake2b_224(&data));
    }
}
