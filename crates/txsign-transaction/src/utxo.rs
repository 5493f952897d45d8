//! Spendable outputs.
//!
//! An `UnspentOutput` names a prior output by txid and index together with
//! its locking script and value. It is immutable once built; the fields are
//! read through accessors.

use serde::{Deserialize, Serialize};
use txsign_primitives::chainhash::Hash;
use txsign_script::Script;

use crate::TransactionError;

/// Satoshis in one coin.
pub const SATOSHIS_PER_COIN: u64 = 100_000_000;

const MAX_DECIMALS: usize = 8;

/// A spendable prior output.
///
/// Serializes to `{txid, vout, lockingScript, satoshis}`. Deserializes from
/// that form or from the node form `{txid, vout, scriptPubKey, amount}`
/// where `amount` is in coins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnspentOutput {
    txid: Hash,
    vout: u32,
    locking_script: Script,
    satoshis: u64,
}

impl UnspentOutput {
    /// Build from hex strings and a satoshi value.
    ///
    /// # Arguments
    /// * `txid_hex` - 64-character transaction id in display order.
    /// * `vout` - Output index.
    /// * `locking_script_hex` - Locking script as hex.
    /// * `satoshis` - Output value.
    pub fn new(
        txid_hex: &str,
        vout: u32,
        locking_script_hex: &str,
        satoshis: u64,
    ) -> Result<Self, TransactionError> {
        Ok(UnspentOutput {
            txid: Hash::from_hex(txid_hex)?,
            vout,
            locking_script: Script::from_hex(locking_script_hex)?,
            satoshis,
        })
    }

    /// Build from a decimal coin amount such as `"49.98"`.
    ///
    /// The amount is converted exactly; see [`parse_amount`].
    pub fn from_amount(
        txid_hex: &str,
        vout: u32,
        locking_script_hex: &str,
        amount: &str,
    ) -> Result<Self, TransactionError> {
        Self::new(txid_hex, vout, locking_script_hex, parse_amount(amount)?)
    }

    pub fn from_parts(txid: Hash, vout: u32, locking_script: Script, satoshis: u64) -> Self {
        UnspentOutput {
            txid,
            vout,
            locking_script,
            satoshis,
        }
    }

    pub fn txid(&self) -> &Hash {
        &self.txid
    }

    pub fn vout(&self) -> u32 {
        self.vout
    }

    pub fn locking_script(&self) -> &Script {
        &self.locking_script
    }

    pub fn satoshis(&self) -> u64 {
        self.satoshis
    }

    /// Serializable view in the node form.
    pub fn node_form(&self) -> NodeUnspentOutput<'_> {
        NodeUnspentOutput {
            txid: &self.txid,
            vout: self.vout,
            script_pub_key: &self.locking_script,
            amount: satoshis_to_coins(self.satoshis),
        }
    }
}

/// Node-style rendering of an [`UnspentOutput`].
#[derive(Serialize)]
pub struct NodeUnspentOutput<'a> {
    txid: &'a Hash,
    vout: u32,
    #[serde(rename = "scriptPubKey")]
    script_pub_key: &'a Script,
    amount: f64,
}

/// Parse a decimal coin amount into satoshis without floating point.
///
/// Accepts digits with an optional fractional part of at most eight digits.
///
/// # Returns
/// The satoshi value, or `InvalidAmount` for signs, empty parts, excess
/// precision, stray characters or overflow.
pub fn parse_amount(amount: &str) -> Result<u64, TransactionError> {
    let invalid = || TransactionError::InvalidAmount(amount.to_string());

    let (whole, frac) = match amount.split_once('.') {
        Some((w, f)) => (w, f),
        None => (amount, ""),
    };
    if whole.is_empty()
        || !whole.bytes().all(|b| b.is_ascii_digit())
        || !frac.bytes().all(|b| b.is_ascii_digit())
        || frac.len() > MAX_DECIMALS
        || (amount.contains('.') && frac.is_empty())
    {
        return Err(invalid());
    }

    let whole: u64 = whole.parse().map_err(|_| invalid())?;
    let frac_sats: u64 = if frac.is_empty() {
        0
    } else {
        let scale = 10u64.pow((MAX_DECIMALS - frac.len()) as u32);
        frac.parse::<u64>().map_err(|_| invalid())? * scale
    };

    whole
        .checked_mul(SATOSHIS_PER_COIN)
        .and_then(|s| s.checked_add(frac_sats))
        .ok_or_else(invalid)
}

/// Convert a coin amount given as a float to satoshis, rounding to the
/// nearest satoshi.
pub fn coins_to_satoshis(amount: f64) -> Result<u64, TransactionError> {
    let sats = (amount * SATOSHIS_PER_COIN as f64).round();
    if !sats.is_finite() || sats < 0.0 || sats > u64::MAX as f64 {
        return Err(TransactionError::InvalidAmount(amount.to_string()));
    }
    Ok(sats as u64)
}

pub fn satoshis_to_coins(satoshis: u64) -> f64 {
    satoshis as f64 / SATOSHIS_PER_COIN as f64
}

#[derive(Serialize)]
struct LibraryUtxoRef<'a> {
    txid: &'a Hash,
    vout: u32,
    #[serde(rename = "lockingScript")]
    locking_script: &'a Script,
    satoshis: u64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UtxoJson {
    Library {
        txid: Hash,
        vout: u32,
        #[serde(rename = "lockingScript")]
        locking_script: Script,
        satoshis: u64,
    },
    Node {
        txid: Hash,
        vout: u32,
        #[serde(rename = "scriptPubKey")]
        script_pub_key: Script,
        amount: f64,
    },
}

impl Serialize for UnspentOutput {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        LibraryUtxoRef {
            txid: &self.txid,
            vout: self.vout,
            locking_script: &self.locking_script,
            satoshis: self.satoshis,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for UnspentOutput {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        match UtxoJson::deserialize(deserializer)? {
            UtxoJson::Library {
                txid,
                vout,
                locking_script,
                satoshis,
            } => Ok(UnspentOutput::from_parts(txid, vout, locking_script, satoshis)),
            UtxoJson::Node {
                txid,
                vout,
                script_pub_key,
                amount,
            } => {
                let satoshis = coins_to_satoshis(amount).map_err(serde::de::Error::custom)?;
                Ok(UnspentOutput::from_parts(txid, vout, script_pub_key, satoshis))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TXID: &str = "63daf8b0961867e8f2fad1c04a4ceed2618a33aa73bae1c9c8540e9484ed7d03";
    const SCRIPT: &str = "76a91403ececf2d12a7f614aef4c82ecf13c303bd9975d88ac";

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("49.98").unwrap(), 4_998_000_000);
        assert_eq!(parse_amount("0.00000001").unwrap(), 1);
        assert_eq!(parse_amount("1").unwrap(), SATOSHIS_PER_COIN);
        assert_eq!(parse_amount("0").unwrap(), 0);
        assert_eq!(parse_amount("21000000.5").unwrap(), 2_100_000_050_000_000);
    }

    #[test]
    fn test_parse_amount_rejects() {
        for bad in ["", "-1", "+1", "1.", ".5", "1.123456789", "1,5", "1e3", " 1", "abc"] {
            assert!(parse_amount(bad).is_err(), "{:?}", bad);
        }
        assert!(parse_amount("184467440737.09551616").is_err());
    }

    #[test]
    fn test_from_amount() {
        let utxo = UnspentOutput::from_amount(TXID, 0, SCRIPT, "49.98").unwrap();
        assert_eq!(utxo.satoshis(), 4_998_000_000);
        assert_eq!(utxo.txid().to_string(), TXID);
        assert_eq!(utxo.vout(), 0);
        assert_eq!(utxo.locking_script().to_hex(), SCRIPT);
    }

    #[test]
    fn test_new_rejects_bad_hex() {
        assert!(UnspentOutput::new("63daf8", 0, SCRIPT, 1).is_err());
        assert!(UnspentOutput::new(TXID, 0, "76a9x", 1).is_err());
    }

    #[test]
    fn test_library_json() {
        let utxo = UnspentOutput::new(TXID, 1, SCRIPT, 4_998_000_000).unwrap();
        let json = serde_json::to_value(&utxo).unwrap();
        assert_eq!(json["txid"], TXID);
        assert_eq!(json["vout"], 1);
        assert_eq!(json["lockingScript"], SCRIPT);
        assert_eq!(json["satoshis"], 4_998_000_000u64);

        let back: UnspentOutput = serde_json::from_value(json).unwrap();
        assert_eq!(back, utxo);
    }

    #[test]
    fn test_node_json() {
        let body = format!(
            r#"{{"txid":"{}","vout":0,"scriptPubKey":"{}","amount":49.98}}"#,
            TXID, SCRIPT
        );
        let utxo: UnspentOutput = serde_json::from_str(&body).unwrap();
        assert_eq!(utxo.satoshis(), 4_998_000_000);

        let node = serde_json::to_value(utxo.node_form()).unwrap();
        assert_eq!(node["scriptPubKey"], SCRIPT);
        assert_eq!(node["amount"], 49.98);
    }

    #[test]
    fn test_node_json_rejects_negative_amount() {
        let body = format!(
            r#"{{"txid":"{}","vout":0,"scriptPubKey":"{}","amount":-1.0}}"#,
            TXID, SCRIPT
        );
        assert!(serde_json::from_str::<UnspentOutput>(&body).is_err());
    }
}
