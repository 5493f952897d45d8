use proptest::prelude::*;

use txsign_script::chunk::decode_script;
use txsign_script::{Address, Network, Script, ScriptType};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn pushed_data_decodes_back(parts in prop::collection::vec(
        prop::collection::vec(any::<u8>(), 1..300), 0..6)
    ) {
        let mut script = Script::new();
        for part in &parts {
            script.append_push_data(part).unwrap();
        }
        let chunks = script.chunks().unwrap();
        prop_assert_eq!(chunks.len(), parts.len());
        for (chunk, part) in chunks.iter().zip(&parts) {
            prop_assert_eq!(chunk.push_data(), Some(&part[..]));
        }
    }

    #[test]
    fn asm_reassembles_push_only_scripts(parts in prop::collection::vec(
        prop::collection::vec(any::<u8>(), 5..80), 1..4)
    ) {
        // pushes of 5+ bytes never render as an opcode name
        let mut script = Script::new();
        for part in &parts {
            script.append_push_data(part).unwrap();
        }
        prop_assert_eq!(Script::from_asm(&script.to_asm()).unwrap(), script);
    }

    #[test]
    fn decode_never_panics(data in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = decode_script(&data);
        let _ = Script::from_bytes(&data).script_type();
    }

    #[test]
    fn p2pkh_from_any_hash(hash in prop::array::uniform20(any::<u8>()), testnet in any::<bool>()) {
        let mut bytes = vec![0x76, 0xa9, 0x14];
        bytes.extend_from_slice(&hash);
        bytes.extend_from_slice(&[0x88, 0xac]);
        let script = Script::from_bytes(&bytes);
        prop_assert_eq!(script.script_type(), ScriptType::PubKeyHash);
        prop_assert_eq!(script.public_key_hash().unwrap(), hash);

        let network = if testnet { Network::Testnet } else { Network::Mainnet };
        let addr = Address::from_public_key_hash(&hash, network);
        let parsed = Address::from_string(&addr.to_string()).unwrap();
        prop_assert_eq!(parsed.public_key_hash, hash);
        prop_assert_eq!(parsed.network, network);
    }
}
