//! Core transaction type.
//!
//! A transaction is a version, ordered inputs, ordered outputs and a lock
//! time. This module holds wire parsing and encoding, the txid, and the
//! input and output mutators the signing workflow uses.

use std::fmt;

use log::debug;
use txsign_primitives::chainhash::Hash;
use txsign_primitives::util::{ByteReader, ByteWriter, VarInt};
use txsign_script::opcodes::{OP_FALSE, OP_RETURN};
use txsign_script::{Address, Script};

use crate::input::{field_error, TransactionInput};
use crate::output::TransactionOutput;
use crate::sighash;
use crate::template::p2pkh;
use crate::utxo::UnspentOutput;
use crate::TransactionError;

/// Smallest possible encoding: version, two empty counts and lock time.
const MIN_TX_SIZE: usize = 10;

/// Outpoint, empty script length and sequence.
const MIN_INPUT_SIZE: usize = 41;

/// Value and empty script length.
const MIN_OUTPUT_SIZE: usize = 9;

/// A transaction.
///
/// # Wire format
///
/// | Field        | Size                      |
/// |--------------|---------------------------|
/// | version      | 4 bytes (LE)              |
/// | input count  | VarInt                    |
/// | inputs       | variable (per input)      |
/// | output count | VarInt                    |
/// | outputs      | variable (per output)     |
/// | lock_time    | 4 bytes (LE)              |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub version: u32,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,

    /// Block height or timestamp before which the transaction is not final.
    pub lock_time: u32,
}

impl Transaction {
    /// An empty version 1 transaction.
    pub fn new() -> Self {
        Transaction {
            version: 1,
            inputs: Vec::new(),
            outputs: Vec::new(),
            lock_time: 0,
        }
    }

    // -----------------------------------------------------------------
    // Decoding
    // -----------------------------------------------------------------

    /// Parse a transaction from its hex encoding.
    ///
    /// # Arguments
    /// * `hex_str` - Hex of the raw transaction bytes.
    ///
    /// # Returns
    /// The transaction, or `SerializationError` for bad hex, truncation or
    /// trailing bytes.
    pub fn from_hex(hex_str: &str) -> Result<Self, TransactionError> {
        let bytes = hex::decode(hex_str.trim()).map_err(|e| {
            TransactionError::SerializationError(format!("invalid hex: {}", e))
        })?;
        Self::from_bytes(&bytes)
    }

    /// Parse exactly one transaction from `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        if bytes.len() < MIN_TX_SIZE {
            return Err(TransactionError::SerializationError(format!(
                "{} bytes is too short for a transaction",
                bytes.len()
            )));
        }
        let mut reader = ByteReader::new(bytes);
        let tx = Self::read_from(&mut reader)?;
        if reader.remaining() != 0 {
            return Err(TransactionError::SerializationError(format!(
                "trailing {} bytes after transaction",
                reader.remaining()
            )));
        }
        debug!(
            "parsed transaction {} with {} inputs and {} outputs",
            tx.tx_id(),
            tx.inputs.len(),
            tx.outputs.len()
        );
        Ok(tx)
    }

    /// Decode a transaction from a reader positioned at its first byte.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let version = reader
            .read_u32_le()
            .map_err(|e| field_error("version", e))?;

        let input_count = read_count(reader, "input count", MIN_INPUT_SIZE)?;
        let mut inputs = Vec::with_capacity(input_count);
        for _ in 0..input_count {
            inputs.push(TransactionInput::read_from(reader)?);
        }

        let output_count = read_count(reader, "output count", MIN_OUTPUT_SIZE)?;
        let mut outputs = Vec::with_capacity(output_count);
        for _ in 0..output_count {
            outputs.push(TransactionOutput::read_from(reader)?);
        }

        let lock_time = reader
            .read_u32_le()
            .map_err(|e| field_error("lock time", e))?;

        Ok(Transaction {
            version,
            inputs,
            outputs,
            lock_time,
        })
    }

    // -----------------------------------------------------------------
    // Encoding
    // -----------------------------------------------------------------

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::with_capacity(self.size());
        writer.write_u32_le(self.version);

        writer.write_varint(VarInt::from(self.inputs.len()));
        for input in &self.inputs {
            input.write_to(&mut writer);
        }

        writer.write_varint(VarInt::from(self.outputs.len()));
        for output in &self.outputs {
            output.write_to(&mut writer);
        }

        writer.write_u32_le(self.lock_time);
        writer.into_bytes()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Double SHA-256 of the encoding. Displays as the conventional txid.
    pub fn tx_id(&self) -> Hash {
        Hash::double_sha256(&self.to_bytes())
    }

    pub fn tx_id_hex(&self) -> String {
        self.tx_id().to_hex()
    }

    /// Encoded size in bytes, computed without encoding.
    pub fn size(&self) -> usize {
        4 + VarInt::from(self.inputs.len()).length()
            + self.inputs.iter().map(TransactionInput::size).sum::<usize>()
            + VarInt::from(self.outputs.len()).length()
            + self.outputs.iter().map(TransactionOutput::size).sum::<usize>()
            + 4
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    /// One input spending the all-zero txid, with either the output index
    /// or the sequence at `0xFFFFFFFF`.
    pub fn is_coinbase(&self) -> bool {
        match self.inputs.as_slice() {
            [input] => {
                input.source_txid == Hash::default()
                    && (input.source_tx_out_index == u32::MAX
                        || input.sequence_number == u32::MAX)
            }
            _ => false,
        }
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// Sum of the inputs' source output values.
    ///
    /// # Returns
    /// The total, `MissingSourceOutput` naming the first input without one,
    /// or `InvalidAmount` on overflow.
    pub fn total_input_satoshis(&self) -> Result<u64, TransactionError> {
        self.inputs
            .iter()
            .enumerate()
            .try_fold(0u64, |total, (i, input)| {
                let sats = input
                    .source_tx_satoshis()
                    .ok_or(TransactionError::MissingSourceOutput(i))?;
                total.checked_add(sats).ok_or_else(|| {
                    TransactionError::InvalidAmount("input total overflows".to_string())
                })
            })
    }

    pub fn total_output_satoshis(&self) -> u64 {
        self.outputs.iter().map(|o| o.satoshis).sum()
    }

    // -----------------------------------------------------------------
    // Inputs
    // -----------------------------------------------------------------

    pub fn add_input(&mut self, input: TransactionInput) {
        self.inputs.push(input);
    }

    /// Remove every input. Outputs, version and lock time are untouched.
    pub fn clear_inputs(&mut self) {
        debug!("clearing {} inputs", self.inputs.len());
        self.inputs.clear();
    }

    /// Add an input spending `txid:vout`, remembering the spent script and
    /// value for signing.
    ///
    /// # Arguments
    /// * `prev_tx_id` - Txid of the spent output in display order.
    /// * `vout` - Index of the spent output.
    /// * `prev_locking_script_hex` - Locking script of the spent output.
    /// * `satoshis` - Value of the spent output.
    pub fn add_input_from(
        &mut self,
        prev_tx_id: &str,
        vout: u32,
        prev_locking_script_hex: &str,
        satoshis: u64,
    ) -> Result<(), TransactionError> {
        let utxo = UnspentOutput::new(prev_tx_id, vout, prev_locking_script_hex, satoshis)?;
        self.add_utxo(&utxo);
        Ok(())
    }

    pub fn add_utxo(&mut self, utxo: &UnspentOutput) {
        debug!(
            "adding input {}:{} worth {} satoshis",
            utxo.txid(),
            utxo.vout(),
            utxo.satoshis()
        );
        self.inputs.push(TransactionInput::from_utxo(utxo));
    }

    /// A new transaction spending each of `utxos` in order.
    pub fn from_utxos(utxos: &[UnspentOutput]) -> Self {
        let mut tx = Transaction::new();
        for utxo in utxos {
            tx.add_utxo(utxo);
        }
        tx
    }

    /// Spend every P2PKH output of `source` locked to `public_key_hash`.
    ///
    /// Outputs with any other locking script are skipped.
    ///
    /// # Returns
    /// The number of inputs added.
    pub fn add_p2pkh_inputs_from_tx(
        &mut self,
        source: &Transaction,
        public_key_hash: &[u8; 20],
    ) -> usize {
        let source_txid = source.tx_id();
        let mut added = 0;
        for (vout, output) in source.outputs.iter().enumerate() {
            if output.locking_script.public_key_hash().ok().as_ref() != Some(public_key_hash) {
                continue;
            }
            let Ok(vout) = u32::try_from(vout) else {
                break;
            };
            let mut input = TransactionInput::new(source_txid, vout);
            input.set_source_output(Some(output.clone()));
            self.inputs.push(input);
            added += 1;
        }
        debug!("added {} inputs from {}", added, source_txid.to_hex());
        added
    }

    // -----------------------------------------------------------------
    // Outputs
    // -----------------------------------------------------------------

    pub fn add_output(&mut self, output: TransactionOutput) {
        self.outputs.push(output);
    }

    /// Pay `satoshis` to a P2PKH address string.
    pub fn pay_to_address(&mut self, address: &str, satoshis: u64) -> Result<(), TransactionError> {
        let address = Address::from_string(address)?;
        self.add_output(TransactionOutput::new(satoshis, p2pkh::lock(&address)));
        Ok(())
    }

    pub fn add_p2pkh_output_from_pub_key_hash(&mut self, public_key_hash: &[u8; 20], satoshis: u64) {
        self.add_output(TransactionOutput::new(
            satoshis,
            p2pkh::lock_from_hash(public_key_hash),
        ));
    }

    /// Add a zero-value `OP_FALSE OP_RETURN <data>` output.
    pub fn add_op_return_output(&mut self, data: &[u8]) -> Result<(), TransactionError> {
        self.add_op_return_parts_output(&[data])
    }

    /// Add a zero-value `OP_FALSE OP_RETURN` output pushing each part in turn.
    pub fn add_op_return_parts_output(&mut self, parts: &[&[u8]]) -> Result<(), TransactionError> {
        let mut script = Script::new();
        script.append_opcodes(&[OP_FALSE, OP_RETURN])?;
        for part in parts {
            script.append_push_data(part)?;
        }
        self.add_output(TransactionOutput::new(0, script));
        Ok(())
    }

    pub fn has_data_outputs(&self) -> bool {
        self.outputs.iter().any(|o| o.locking_script.is_data())
    }

    // -----------------------------------------------------------------
    // Signature hash
    // -----------------------------------------------------------------

    /// The FORKID signature hash for one input.
    ///
    /// # Arguments
    /// * `input_index` - Input being signed.
    /// * `sighash_flag` - Combined flags, e.g. `SIGHASH_ALL_FORKID`.
    ///
    /// # Returns
    /// The 32-byte digest, `InputIndexOutOfRange`, `MissingSourceOutput`
    /// or `UnsupportedSighash`.
    pub fn calc_input_signature_hash(
        &self,
        input_index: usize,
        sighash_flag: u32,
    ) -> Result<[u8; 32], TransactionError> {
        let input = self.input(input_index)?;
        let source_output = input
            .source_tx_output()
            .ok_or(TransactionError::MissingSourceOutput(input_index))?;

        sighash::signature_hash(
            self,
            input_index,
            source_output.locking_script.to_bytes(),
            sighash_flag,
            source_output.satoshis,
        )
    }

    pub(crate) fn input(&self, index: usize) -> Result<&TransactionInput, TransactionError> {
        self.inputs
            .get(index)
            .ok_or(TransactionError::InputIndexOutOfRange {
                index,
                count: self.inputs.len(),
            })
    }
}

fn read_count(
    reader: &mut ByteReader,
    field: &str,
    min_entry_size: usize,
) -> Result<usize, TransactionError> {
    let count = reader.read_varint().map_err(|e| field_error(field, e))?;
    let count = usize::try_from(count.value()).unwrap_or(usize::MAX);
    let max_entries = reader.remaining() / min_entry_size;
    if count > max_entries {
        return Err(TransactionError::SerializationError(format!(
            "reading {}: {} entries but only {} bytes remain",
            field,
            count,
            reader.remaining()
        )));
    }
    Ok(count)
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

/// Displays as the hex encoding.
impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
