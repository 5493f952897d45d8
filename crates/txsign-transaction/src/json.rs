//! JSON representations of a transaction.
//!
//! The library form (`Transaction`'s serde impls) lists raw fields:
//!
//! ```json
//! {"txid": "..", "hex": "..", "inputs": [{"unlockingScript", "txid", "vout", "sequence"}],
//!  "outputs": [{"satoshis", "lockingScript"}], "version": 1, "lockTime": 0}
//! ```
//!
//! The node form ([`NodeTransaction`]) mirrors a verbose
//! `getrawtransaction` result with `vin`, `vout`, ASM and script types.
//!
//! When decoding either form a non-empty `hex` wins; the other fields are
//! only used to rebuild a transaction that has no `hex`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use txsign_primitives::chainhash::Hash;
use txsign_script::Script;

use crate::input::TransactionInput;
use crate::output::TransactionOutput;
use crate::transaction::Transaction;
use crate::utxo::{coins_to_satoshis, satoshis_to_coins};
use crate::TransactionError;

// -----------------------------------------------------------------------
// Library form
// -----------------------------------------------------------------------

#[derive(Serialize, Deserialize)]
struct TxJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    txid: Option<Hash>,
    #[serde(default)]
    hex: String,
    #[serde(default)]
    inputs: Vec<InputJson>,
    #[serde(default)]
    outputs: Vec<OutputJson>,
    #[serde(default)]
    version: u32,
    #[serde(rename = "lockTime", default)]
    lock_time: u32,
}

#[derive(Serialize, Deserialize)]
struct InputJson {
    #[serde(rename = "unlockingScript", default)]
    unlocking_script: Script,
    txid: Hash,
    vout: u32,
    sequence: u32,
}

#[derive(Serialize, Deserialize)]
struct OutputJson {
    satoshis: u64,
    #[serde(rename = "lockingScript")]
    locking_script: Script,
}

impl From<&TransactionInput> for InputJson {
    fn from(input: &TransactionInput) -> Self {
        InputJson {
            unlocking_script: input.unlocking_script.clone().unwrap_or_default(),
            txid: input.source_txid,
            vout: input.source_tx_out_index,
            sequence: input.sequence_number,
        }
    }
}

impl From<InputJson> for TransactionInput {
    fn from(json: InputJson) -> Self {
        let mut input = TransactionInput::new(json.txid, json.vout);
        input.sequence_number = json.sequence;
        input.unlocking_script = non_empty(json.unlocking_script);
        input
    }
}

impl Serialize for Transaction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        TxJson {
            txid: Some(self.tx_id()),
            hex: self.to_hex(),
            inputs: self.inputs.iter().map(InputJson::from).collect(),
            outputs: self
                .outputs
                .iter()
                .map(|o| OutputJson {
                    satoshis: o.satoshis,
                    locking_script: o.locking_script.clone(),
                })
                .collect(),
            version: self.version,
            lock_time: self.lock_time,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Transaction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = TxJson::deserialize(deserializer)?;
        if !json.hex.is_empty() {
            return Transaction::from_hex(&json.hex).map_err(serde::de::Error::custom);
        }
        Ok(Transaction {
            version: json.version,
            inputs: json.inputs.into_iter().map(TransactionInput::from).collect(),
            outputs: json
                .outputs
                .into_iter()
                .map(|o| TransactionOutput::new(o.satoshis, o.locking_script))
                .collect(),
            lock_time: json.lock_time,
        })
    }
}

// -----------------------------------------------------------------------
// Node form
// -----------------------------------------------------------------------

/// Node-style (`getrawtransaction` verbose) view of a transaction.
///
/// Serializing borrows the transaction; deserializing produces an owned
/// one through [`NodeTransaction::into_inner`].
pub struct NodeTransaction<'a>(std::borrow::Cow<'a, Transaction>);

impl<'a> NodeTransaction<'a> {
    pub fn new(tx: &'a Transaction) -> Self {
        NodeTransaction(std::borrow::Cow::Borrowed(tx))
    }

    pub fn into_inner(self) -> Transaction {
        self.0.into_owned()
    }
}

#[derive(Serialize, Deserialize)]
struct NodeTxJson {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    locktime: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    txid: Option<Hash>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hash: Option<Hash>,
    #[serde(default)]
    size: usize,
    #[serde(default)]
    hex: String,
    #[serde(default)]
    vin: Vec<NodeInputJson>,
    #[serde(default)]
    vout: Vec<NodeOutputJson>,
}

#[derive(Serialize, Deserialize)]
struct NodeScriptSig {
    #[serde(default)]
    asm: String,
    hex: Script,
}

#[derive(Serialize, Deserialize)]
struct NodeInputJson {
    #[serde(rename = "scriptSig", default, skip_serializing_if = "Option::is_none")]
    script_sig: Option<NodeScriptSig>,
    txid: Hash,
    vout: u32,
    sequence: u32,
}

#[derive(Serialize, Deserialize)]
struct NodeScriptPubKey {
    #[serde(default)]
    asm: String,
    hex: Script,
    #[serde(rename = "reqSigs", default, skip_serializing_if = "Option::is_none")]
    req_sigs: Option<u32>,
    #[serde(rename = "type", default)]
    script_type: String,
}

#[derive(Serialize, Deserialize)]
struct NodeOutputJson {
    value: f64,
    #[serde(default)]
    n: usize,
    #[serde(rename = "scriptPubKey")]
    script_pub_key: NodeScriptPubKey,
}

impl Serialize for NodeTransaction<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let tx = self.0.as_ref();
        let txid = tx.tx_id();
        let vin = tx
            .inputs
            .iter()
            .map(|input| {
                let script = input.unlocking_script.clone().unwrap_or_default();
                NodeInputJson {
                    script_sig: Some(NodeScriptSig {
                        asm: script.to_asm(),
                        hex: script,
                    }),
                    txid: input.source_txid,
                    vout: input.source_tx_out_index,
                    sequence: input.sequence_number,
                }
            })
            .collect();
        let vout = tx
            .outputs
            .iter()
            .enumerate()
            .map(|(n, output)| {
                let script_type = output.locking_script.script_type();
                NodeOutputJson {
                    value: satoshis_to_coins(output.satoshis),
                    n,
                    script_pub_key: NodeScriptPubKey {
                        asm: output.locking_script.to_asm(),
                        hex: output.locking_script.clone(),
                        req_sigs: script_type.required_sigs(),
                        script_type: script_type.to_string(),
                    },
                }
            })
            .collect();

        NodeTxJson {
            version: tx.version,
            locktime: tx.lock_time,
            txid: Some(txid),
            hash: Some(txid),
            size: tx.size(),
            hex: tx.to_hex(),
            vin,
            vout,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for NodeTransaction<'static> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = NodeTxJson::deserialize(deserializer)?;
        let tx = if json.hex.is_empty() {
            node_fields_to_tx(json).map_err(serde::de::Error::custom)?
        } else {
            Transaction::from_hex(&json.hex).map_err(serde::de::Error::custom)?
        };
        Ok(NodeTransaction(std::borrow::Cow::Owned(tx)))
    }
}

fn node_fields_to_tx(json: NodeTxJson) -> Result<Transaction, TransactionError> {
    let inputs = json
        .vin
        .into_iter()
        .map(|vin| {
            let mut input = TransactionInput::new(vin.txid, vin.vout);
            input.sequence_number = vin.sequence;
            input.unlocking_script = vin.script_sig.and_then(|sig| non_empty(sig.hex));
            input
        })
        .collect();
    let outputs = json
        .vout
        .into_iter()
        .map(|vout| {
            Ok(TransactionOutput::new(
                coins_to_satoshis(vout.value)?,
                vout.script_pub_key.hex,
            ))
        })
        .collect::<Result<Vec<_>, TransactionError>>()?;

    Ok(Transaction {
        version: json.version,
        inputs,
        outputs,
        lock_time: json.locktime,
    })
}

fn non_empty(script: Script) -> Option<Script> {
    if script.is_empty() {
        None
    } else {
        Some(script)
    }
}

// -----------------------------------------------------------------------
// Convenience
// -----------------------------------------------------------------------

impl Transaction {
    /// Library-form JSON, pretty-printed when `pretty` is set.
    pub fn to_json(&self, pretty: bool) -> Result<String, TransactionError> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    pub fn from_json(json: &str) -> Result<Self, TransactionError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Node-form JSON, pretty-printed when `pretty` is set.
    pub fn to_node_json(&self, pretty: bool) -> Result<String, TransactionError> {
        let node = NodeTransaction::new(self);
        let json = if pretty {
            serde_json::to_string_pretty(&node)?
        } else {
            serde_json::to_string(&node)?
        };
        Ok(json)
    }

    pub fn from_node_json(json: &str) -> Result<Self, TransactionError> {
        let node: NodeTransaction<'static> = serde_json::from_str(json)?;
        Ok(node.into_inner())
    }
}
