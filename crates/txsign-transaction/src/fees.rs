//! Fee quotes and change calculation.
//!
//! A `FeeQuote` prices standard bytes and data (`OP_RETURN`) bytes
//! separately. `Transaction::change` uses the standard mining fee for the
//! change output and unlocking scripts, and both rates for the bytes already
//! present.

use log::debug;
use serde::{Deserialize, Serialize};
use txsign_primitives::util::VarInt;
use txsign_script::{Address, Script};

use crate::output::TransactionOutput;
use crate::template::p2pkh;
use crate::transaction::Transaction;
use crate::TransactionError;

/// Value plus P2PKH locking script of a change output.
const CHANGE_OUTPUT_BYTES: u64 = 8 + 25;

/// Unlocking script bytes budgeted per P2PKH input: push, signature of up to
/// 73 bytes, flag, push, 33-byte key.
const P2PKH_UNLOCKING_BYTES: u64 = 109;

/// Unlocking script bytes assumed for an unsigned P2PKH input when sizing.
const UNSIGNED_INPUT_ESTIMATE_BYTES: u64 = 107;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeType {
    Standard,
    Data,
}

/// `satoshis` per `bytes`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeUnit {
    pub satoshis: u64,
    pub bytes: u64,
}

impl FeeUnit {
    pub fn new(satoshis: u64, bytes: u64) -> Self {
        FeeUnit { satoshis, bytes }
    }

    /// Fee for `size` bytes, rounded down.
    ///
    /// # Returns
    /// `FeeError` for a zero-byte unit or on overflow.
    pub fn fee_for(&self, size: u64) -> Result<u64, TransactionError> {
        if self.bytes == 0 {
            return Err(TransactionError::FeeError("fee unit covers zero bytes".to_string()));
        }
        size.checked_mul(self.satoshis)
            .map(|total| total / self.bytes)
            .ok_or_else(|| TransactionError::FeeError(format!("fee for {} bytes overflows", size)))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fee {
    #[serde(skip, default = "default_fee_type")]
    pub fee_type: FeeType,

    #[serde(rename = "miningFee")]
    pub mining_fee: FeeUnit,

    /// Fee for keeping the transaction in a secondary mempool.
    #[serde(rename = "relayFee")]
    pub relay_fee: FeeUnit,
}

fn default_fee_type() -> FeeType {
    FeeType::Standard
}

impl Fee {
    /// A fee charging `unit` for both mining and relay.
    pub fn flat(fee_type: FeeType, unit: FeeUnit) -> Self {
        Fee {
            fee_type,
            mining_fee: unit,
            relay_fee: unit,
        }
    }
}

/// Standard and data fees as quoted by a miner.
///
/// Serializes as `{"standard": Fee, "data": Fee}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeQuote {
    #[serde(deserialize_with = "standard_fee")]
    standard: Fee,
    #[serde(deserialize_with = "data_fee")]
    data: Fee,
}

fn standard_fee<'de, D: serde::Deserializer<'de>>(d: D) -> Result<Fee, D::Error> {
    let fee = Fee::deserialize(d)?;
    Ok(Fee {
        fee_type: FeeType::Standard,
        ..fee
    })
}

fn data_fee<'de, D: serde::Deserializer<'de>>(d: D) -> Result<Fee, D::Error> {
    let fee = Fee::deserialize(d)?;
    Ok(Fee {
        fee_type: FeeType::Data,
        ..fee
    })
}

impl FeeQuote {
    pub fn new(standard: FeeUnit, data: FeeUnit) -> Self {
        FeeQuote {
            standard: Fee::flat(FeeType::Standard, standard),
            data: Fee::flat(FeeType::Data, data),
        }
    }

    pub fn fee(&self, fee_type: FeeType) -> &Fee {
        match fee_type {
            FeeType::Standard => &self.standard,
            FeeType::Data => &self.data,
        }
    }

    /// Replace the quote for `fee.fee_type`.
    pub fn set_fee(&mut self, fee: Fee) {
        match fee.fee_type {
            FeeType::Standard => self.standard = fee,
            FeeType::Data => self.data = fee,
        }
    }
}

/// 5 satoshis per 100 bytes for both types.
impl Default for FeeQuote {
    fn default() -> Self {
        FeeQuote::new(FeeUnit::new(5, 100), FeeUnit::new(5, 100))
    }
}

/// Size of a transaction split into standard and data bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TxSize {
    pub total_bytes: u64,
    /// `total_bytes` minus `data_bytes`.
    pub standard_bytes: u64,
    /// Locking script bytes of `OP_RETURN` outputs.
    pub data_bytes: u64,
}

/// Fees a transaction pays at a quote, per fee type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TxFees {
    pub total_fee_paid: u64,
    pub standard_fee_paid: u64,
    pub data_fee_paid: u64,
    pub size: TxSize,
}

impl Transaction {
    /// Current size split into standard and data bytes.
    pub fn size_with_types(&self) -> TxSize {
        let data_bytes: u64 = self
            .outputs
            .iter()
            .filter(|o| o.locking_script.is_data())
            .map(|o| o.locking_script.len() as u64)
            .sum();
        let total_bytes = self.size() as u64;
        TxSize {
            total_bytes,
            standard_bytes: total_bytes - data_bytes,
            data_bytes,
        }
    }

    /// Size once signed: like `size_with_types`, plus 107 bytes for each
    /// input that has no unlocking script yet.
    ///
    /// # Returns
    /// `FeeError` if any input does not spend a P2PKH output.
    pub fn size_unsigned(&self) -> Result<TxSize, TransactionError> {
        let mut size = self.size_with_types();
        for (index, input) in self.inputs.iter().enumerate() {
            if !input.source_tx_script().map_or(false, Script::is_p2pkh) {
                return Err(TransactionError::FeeError(format!(
                    "input {} is not P2PKH, cannot estimate its size",
                    index
                )));
            }
            if input.unlocking_script.is_none() {
                size.total_bytes += UNSIGNED_INPUT_ESTIMATE_BYTES;
                size.standard_bytes += UNSIGNED_INPUT_ESTIMATE_BYTES;
            }
        }
        Ok(size)
    }

    /// Fees needed to mine this transaction once signed.
    ///
    /// # Arguments
    /// * `quote` - Mining rates for standard and data bytes.
    ///
    /// # Returns
    /// The fee split by type together with the size it was computed from.
    /// Errors when inputs lack source outputs, inputs total less than
    /// outputs, or an input is not P2PKH.
    pub fn calculate_fees(&self, quote: &FeeQuote) -> Result<TxFees, TransactionError> {
        let input_amount = self.total_input_satoshis()?;
        let output_amount = self.total_output_satoshis();
        if input_amount < output_amount {
            return Err(TransactionError::FeeError(format!(
                "inputs of {} satoshis are less than outputs of {}",
                input_amount, output_amount
            )));
        }
        let size = self.size_unsigned()?;
        let standard_fee_paid = quote
            .fee(FeeType::Standard)
            .mining_fee
            .fee_for(size.standard_bytes)?;
        let data_fee_paid = quote.fee(FeeType::Data).mining_fee.fee_for(size.data_bytes)?;
        Ok(TxFees {
            total_fee_paid: standard_fee_paid + data_fee_paid,
            standard_fee_paid,
            data_fee_paid,
            size,
        })
    }

    /// Add a change output paying the leftover to a P2PKH address.
    pub fn change_to_address(
        &mut self,
        address: &str,
        quote: &FeeQuote,
    ) -> Result<bool, TransactionError> {
        let address = Address::from_string(address)?;
        self.change(p2pkh::lock(&address), quote)
    }

    /// Add an output to `script` holding inputs minus outputs minus fees.
    ///
    /// The fee covers the transaction as it stands plus the change output,
    /// and `109` bytes of unlocking script for each input.
    ///
    /// # Arguments
    /// * `script` - Locking script for the change.
    /// * `quote` - Fee rates to apply.
    ///
    /// # Returns
    /// `true` if a change output was added, `false` if the remainder could
    /// not pay for one. Errors when inputs lack source outputs, inputs total
    /// less than outputs, or an input is not P2PKH.
    pub fn change(&mut self, script: Script, quote: &FeeQuote) -> Result<bool, TransactionError> {
        let input_amount = self.total_input_satoshis()?;
        let output_amount = self.total_output_satoshis();
        let available = input_amount.checked_sub(output_amount).ok_or_else(|| {
            TransactionError::FeeError(format!(
                "inputs of {} satoshis are less than outputs of {}",
                input_amount, output_amount
            ))
        })?;

        let standard = quote.fee(FeeType::Standard).mining_fee;
        if !self.can_add_change(available, &standard)? {
            debug!("{} satoshis cannot pay for a change output", available);
            return Ok(false);
        }

        self.add_output(TransactionOutput {
            satoshis: 0,
            locking_script: script,
            change: true,
        });

        let fees = self
            .pre_signed_fee(quote)
            .and_then(|pre| self.unlocking_script_fee(&standard).map(|unlock| (pre, unlock)));
        let (pre_signed, unlocking) = match fees {
            Ok(fees) => fees,
            Err(e) => {
                self.outputs.pop();
                return Err(e);
            }
        };

        match available
            .checked_sub(pre_signed)
            .and_then(|rest| rest.checked_sub(unlocking))
        {
            Some(change) => {
                debug!(
                    "change of {} satoshis after {} pre-sign and {} unlocking fee",
                    change, pre_signed, unlocking
                );
                if let Some(output) = self.outputs.last_mut() {
                    output.satoshis = change;
                }
                Ok(true)
            }
            None => {
                self.outputs.pop();
                debug!("fees exceed the {} satoshis available for change", available);
                Ok(false)
            }
        }
    }

    fn can_add_change(&self, available: u64, standard: &FeeUnit) -> Result<bool, TransactionError> {
        let growth = VarInt::from(self.outputs.len()).upper_limit_inc();
        let Ok(growth) = u64::try_from(growth) else {
            return Ok(false);
        };
        Ok(available >= growth + standard.fee_for(CHANGE_OUTPUT_BYTES)?)
    }

    fn pre_signed_fee(&self, quote: &FeeQuote) -> Result<u64, TransactionError> {
        let size = self.size_with_types();
        let standard = quote.fee(FeeType::Standard).mining_fee.fee_for(size.standard_bytes)?;
        let data = quote.fee(FeeType::Data).mining_fee.fee_for(size.data_bytes)?;
        Ok(standard + data)
    }

    fn unlocking_script_fee(&self, standard: &FeeUnit) -> Result<u64, TransactionError> {
        for (index, input) in self.inputs.iter().enumerate() {
            if !input.source_tx_script().map_or(false, Script::is_p2pkh) {
                return Err(TransactionError::FeeError(format!(
                    "input {} is not P2PKH, cannot estimate its unlocking script",
                    index
                )));
            }
        }
        standard.fee_for(P2PKH_UNLOCKING_BYTES * self.inputs.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_quote() {
        let quote = FeeQuote::default();
        for fee_type in [FeeType::Standard, FeeType::Data] {
            let fee = quote.fee(fee_type);
            assert_eq!(fee.fee_type, fee_type);
            assert_eq!(fee.mining_fee, FeeUnit::new(5, 100));
            assert_eq!(fee.relay_fee, FeeUnit::new(5, 100));
        }
    }

    #[test]
    fn test_quote_json() {
        let body = r#"{
            "standard": {"miningFee": {"satoshis": 5, "bytes": 10}, "relayFee": {"satoshis": 1, "bytes": 10}},
            "data": {"miningFee": {"satoshis": 25, "bytes": 100}, "relayFee": {"satoshis": 1, "bytes": 100}}
        }"#;
        let quote: FeeQuote = serde_json::from_str(body).unwrap();
        assert_eq!(quote.fee(FeeType::Standard).mining_fee, FeeUnit::new(5, 10));
        assert_eq!(quote.fee(FeeType::Data).fee_type, FeeType::Data);
        assert_eq!(quote.fee(FeeType::Data).relay_fee, FeeUnit::new(1, 100));

        let json = serde_json::to_value(quote).unwrap();
        assert_eq!(json["data"]["miningFee"]["satoshis"], 25);
        assert!(json["standard"].get("fee_type").is_none());
    }

    #[test]
    fn test_fee_for_rounds_down() {
        assert_eq!(FeeUnit::new(5, 100).fee_for(250).unwrap(), 12);
        assert_eq!(FeeUnit::new(5, 10).fee_for(33).unwrap(), 16);
        assert!(FeeUnit::new(5, 0).fee_for(10).is_err());
    }

    const P2PKH_SCRIPT: &str = "76a914af2590a45ae401651fdbdf59a76ad43d1862534088ac";
    const PREV_TXID: &str = "07912972e42095fe58daaf09161c5a5da57be47c2054dc2aaa52b30fefa1940b";

    fn unsigned_with_data() -> Transaction {
        let mut tx = Transaction::new();
        tx.add_input_from(PREV_TXID, 0, P2PKH_SCRIPT, 10_000).unwrap();
        tx.pay_to_address("mpdFaJf2cAHNfoxKU63o4QXx6NDbzR6E7d", 5_000).unwrap();
        tx.add_op_return_output(b"hello").unwrap();
        tx
    }

    #[test]
    fn test_size_split_by_type() {
        let tx = unsigned_with_data();
        // 4 + 1 + 41 + 1 + 34 + 17 + 4
        let size = tx.size_with_types();
        assert_eq!(size.total_bytes, 102);
        assert_eq!(size.data_bytes, 8);
        assert_eq!(size.standard_bytes, 94);

        let unsigned = tx.size_unsigned().unwrap();
        assert_eq!(unsigned.total_bytes, 209);
        assert_eq!(unsigned.standard_bytes, 201);
        assert_eq!(unsigned.data_bytes, 8);
    }

    #[test]
    fn test_calculate_fees() {
        let tx = unsigned_with_data();
        let quote = FeeQuote::new(FeeUnit::new(5, 10), FeeUnit::new(25, 100));
        let fees = tx.calculate_fees(&quote).unwrap();
        assert_eq!(fees.standard_fee_paid, 100);
        assert_eq!(fees.data_fee_paid, 2);
        assert_eq!(fees.total_fee_paid, 102);
        assert_eq!(fees.size, tx.size_unsigned().unwrap());

        let default_fees = tx.calculate_fees(&FeeQuote::default()).unwrap();
        assert_eq!(default_fees.total_fee_paid, 10);
    }

    #[test]
    fn test_calculate_fees_errors() {
        let mut overspent = unsigned_with_data();
        overspent.pay_to_address("mpdFaJf2cAHNfoxKU63o4QXx6NDbzR6E7d", 6_000).unwrap();
        assert!(matches!(
            overspent.calculate_fees(&FeeQuote::default()),
            Err(TransactionError::FeeError(_))
        ));

        let mut non_p2pkh = Transaction::new();
        non_p2pkh
            .add_input_from(PREV_TXID, 0, "a91463ea0d776d45502d2226aed9ebdf5b676e232ca187", 10_000)
            .unwrap();
        assert!(non_p2pkh.size_unsigned().is_err());
        assert!(non_p2pkh.calculate_fees(&FeeQuote::default()).is_err());
    }

    #[test]
    fn test_set_fee() {
        let mut quote = FeeQuote::default();
        quote.set_fee(Fee::flat(FeeType::Data, FeeUnit::new(25, 100)));
        assert_eq!(quote.fee(FeeType::Data).mining_fee, FeeUnit::new(25, 100));
        assert_eq!(quote.fee(FeeType::Standard).mining_fee, FeeUnit::new(5, 100));
    }
}
