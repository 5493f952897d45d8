use txsign::config::{DEFAULT_AMOUNT, DEFAULT_LOCKING_SCRIPT, DEFAULT_TX, DEFAULT_UTXO_TXID, DEFAULT_WIF};
use txsign::transaction::{Transaction, UnspentOutput};
use txsign::workflow::{render, run, OutputFormat, SignRequest, WorkflowError};

const SIGNED_TX: &str = "0200000001037ded84940e54c8c9e1ba73aa338a61d2ee4c4ac0d1faf2e8671896b0f8da63000000006a4730440220416154a5a117e89855397c6a7b2796d82107d20c1326bc917444e4ab84567b80022057de212dc0615ea1f4bbca817ed18be49acb96acff7760fc4d6447cbe772d1e8412103fc7c702eb7a03099ef01970b31ecbebe7ff77adc202d3749a8562ffc185a44a6ffffffff01806de729010000001976a91463ea0d776d45502d2226aed9ebdf5b676e232ca188ac00000000";

/// Spends an unrelated output and has three inputs.
const MULTI_INPUT_TX: &str = "0200000003a9bc457fdc6a54d99300fb137b23714d860c350a9d19ff0f571e694a419ff3a0010000006b48304502210086c83beb2b2663e4709a583d261d75be538aedcafa7766bd983e5c8db2f8b2fc02201a88b178624ab0ad1748b37c875f885930166237c88f5af78ee4e61d337f935f412103e8be830d98bb3b007a0343ee5c36daa48796ae8bb57946b1e87378ad6e8a090dfeffffff0092bb9a47e27bf64fc98f557c530c04d9ac25e2f2a8b600e92a0b1ae7c89c20010000006b483045022100f06b3db1c0a11af348401f9cebe10ae2659d6e766a9dcd9e3a04690ba10a160f02203f7fbd7dfcfc70863aface1a306fcc91bbadf6bc884c21a55ef0d32bd6b088c8412103e8be830d98bb3b007a0343ee5c36daa48796ae8bb57946b1e87378ad6e8a090dfeffffff9d0d4554fa692420a0830ca614b6c60f1bf8eaaa21afca4aa8c99fb052d9f398000000006b483045022100d920f2290548e92a6235f8b2513b7f693a64a0d3fa699f81a034f4b4608ff82f0220767d7d98025aff3c7bd5f2a66aab6a824f5990392e6489aae1e1ae3472d8dffb412103e8be830d98bb3b007a0343ee5c36daa48796ae8bb57946b1e87378ad6e8a090dfeffffff02807c814a000000001976a9143a6bf34ebfcf30e8541bbb33a7882845e5a29cb488ac76b0e60e000000001976a914bd492b67f90cb85918494767ebb23102c4f06b7088ac67000000";

fn scenario() -> SignRequest {
    SignRequest {
        raw_tx: DEFAULT_TX.to_string(),
        utxo: UnspentOutput::from_amount(DEFAULT_UTXO_TXID, 0, DEFAULT_LOCKING_SCRIPT, DEFAULT_AMOUNT)
            .unwrap(),
        wif: DEFAULT_WIF.to_string(),
        keep_inputs: false,
    }
}

#[test]
fn scenario_is_fully_signed() {
    let outcome = run(&scenario()).unwrap();
    assert!(outcome.fully_signed);
    assert_eq!(outcome.signed_inputs, vec![0]);
    assert_eq!(outcome.tx.to_hex(), SIGNED_TX);
}

#[test]
fn keeping_the_matching_input_gives_the_same_result() {
    let request = SignRequest {
        keep_inputs: true,
        ..scenario()
    };
    let outcome = run(&request).unwrap();
    assert_eq!(outcome.tx.input_count(), 1);
    assert_eq!(outcome.tx.to_hex(), SIGNED_TX);
    assert!(outcome.fully_signed);
}

#[test]
fn many_inputs_collapse_to_one() {
    let request = SignRequest {
        raw_tx: MULTI_INPUT_TX.to_string(),
        ..scenario()
    };
    let outcome = run(&request).unwrap();
    assert_eq!(outcome.tx.input_count(), 1);
    assert_eq!(outcome.tx.output_count(), 2);
    assert!(outcome.fully_signed);
}

#[test]
fn keeping_foreign_inputs_is_not_fully_signed() {
    let request = SignRequest {
        raw_tx: MULTI_INPUT_TX.to_string(),
        keep_inputs: true,
        ..scenario()
    };
    let outcome = run(&request).unwrap();
    assert_eq!(outcome.tx.input_count(), 4);
    assert_eq!(outcome.signed_inputs, vec![3]);
    assert!(!outcome.fully_signed);
}

#[test]
fn wrong_key_is_not_fully_signed() {
    let request = SignRequest {
        wif: "L3MhnEn1pLWcggeYLk9jdkvA2wUK1iWwwrGkBbgQRqv6HPCdRxuw".to_string(),
        ..scenario()
    };
    let outcome = run(&request).unwrap();
    assert!(outcome.signed_inputs.is_empty());
    assert!(!outcome.fully_signed);
}

#[test]
fn malformed_inputs_are_errors() {
    let bad_hex = SignRequest {
        raw_tx: "02000000zz".to_string(),
        ..scenario()
    };
    assert!(matches!(run(&bad_hex), Err(WorkflowError::InvalidTransaction(_))));

    let bad_checksum = SignRequest {
        wif: DEFAULT_WIF.replace("kGe5", "kGe6"),
        ..scenario()
    };
    assert!(matches!(run(&bad_checksum), Err(WorkflowError::InvalidKey(_))));
}

#[test]
fn printed_json_round_trips() {
    let outcome = run(&scenario()).unwrap();
    for compact in [false, true] {
        let library = render(&outcome.tx, OutputFormat::Library, compact).unwrap();
        assert_eq!(Transaction::from_json(&library).unwrap().to_hex(), SIGNED_TX);

        let node = render(&outcome.tx, OutputFormat::Node, compact).unwrap();
        assert_eq!(Transaction::from_node_json(&node).unwrap().to_hex(), SIGNED_TX);
    }

    let compact = render(&outcome.tx, OutputFormat::Library, true).unwrap();
    assert!(!compact.contains('\n'));
}
