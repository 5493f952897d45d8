//! Transaction input referencing a previous output.
//!
//! Holds the outpoint, the unlocking script and the sequence number, plus an
//! optional copy of the output being spent. That copy is needed to compute
//! the signature hash and is never written to the wire.

use txsign_primitives::chainhash::Hash;
use txsign_primitives::util::{ByteReader, ByteWriter, VarInt};
use txsign_script::Script;

use crate::output::TransactionOutput;
use crate::utxo::UnspentOutput;
use crate::TransactionError;

/// Sequence number of a finalized input.
pub const DEFAULT_SEQUENCE_NUMBER: u32 = 0xFFFF_FFFF;

/// A single transaction input.
///
/// # Wire format
///
/// | Field               | Size          |
/// |---------------------|---------------|
/// | source_txid         | 32 bytes      |
/// | source_tx_out_index | 4 bytes (LE)  |
/// | script length       | VarInt        |
/// | unlocking_script    | variable      |
/// | sequence_number     | 4 bytes (LE)  |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionInput {
    /// Id of the transaction holding the spent output.
    pub source_txid: Hash,

    /// Index of the spent output within that transaction.
    pub source_tx_out_index: u32,

    pub sequence_number: u32,

    /// `None` until the input is signed.
    pub unlocking_script: Option<Script>,

    source_output: Option<TransactionOutput>,
}

impl TransactionInput {
    /// An unsigned input spending `source_txid:vout`.
    pub fn new(source_txid: Hash, source_tx_out_index: u32) -> Self {
        TransactionInput {
            source_txid,
            source_tx_out_index,
            sequence_number: DEFAULT_SEQUENCE_NUMBER,
            unlocking_script: None,
            source_output: None,
        }
    }

    /// An unsigned input spending `utxo`, carrying its amount and locking
    /// script for signing.
    pub fn from_utxo(utxo: &UnspentOutput) -> Self {
        let mut input = TransactionInput::new(*utxo.txid(), utxo.vout());
        input.set_source_output(Some(TransactionOutput::new(
            utxo.satoshis(),
            utxo.locking_script().clone(),
        )));
        input
    }

    /// Decode one input from the wire format.
    ///
    /// # Arguments
    /// * `reader` - Reader positioned at the start of an encoded input.
    ///
    /// # Returns
    /// The input, or `SerializationError` naming the field that was cut off.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let txid = reader
            .read_array::<32>()
            .map_err(|e| field_error("source txid", e))?;
        let source_tx_out_index = reader
            .read_u32_le()
            .map_err(|e| field_error("output index", e))?;
        let script_len = reader
            .read_varint()
            .map_err(|e| field_error("script length", e))?;
        let script_bytes = reader
            .read_bytes(script_len.value() as usize)
            .map_err(|e| field_error("unlocking script", e))?;
        let sequence_number = reader
            .read_u32_le()
            .map_err(|e| field_error("sequence number", e))?;

        let unlocking_script = if script_bytes.is_empty() {
            None
        } else {
            Some(Script::from_bytes(script_bytes))
        };

        Ok(TransactionInput {
            source_txid: Hash::new(txid),
            source_tx_out_index,
            sequence_number,
            unlocking_script,
            source_output: None,
        })
    }

    pub fn write_to(&self, writer: &mut ByteWriter) {
        writer.write_bytes(self.source_txid.as_bytes());
        writer.write_u32_le(self.source_tx_out_index);
        let script = self
            .unlocking_script
            .as_ref()
            .map(|s| s.to_bytes())
            .unwrap_or_default();
        writer.write_var_bytes(script);
        writer.write_u32_le(self.sequence_number);
    }

    /// Attach or clear the output this input spends.
    pub fn set_source_output(&mut self, output: Option<TransactionOutput>) {
        self.source_output = output;
    }

    pub fn source_tx_output(&self) -> Option<&TransactionOutput> {
        self.source_output.as_ref()
    }

    pub fn source_tx_satoshis(&self) -> Option<u64> {
        self.source_output.as_ref().map(|o| o.satoshis)
    }

    pub fn source_tx_script(&self) -> Option<&Script> {
        self.source_output.as_ref().map(|o| &o.locking_script)
    }

    /// Serialized size of this input with its current unlocking script.
    pub fn size(&self) -> usize {
        let script_len = self.unlocking_script.as_ref().map_or(0, Script::len);
        32 + 4 + VarInt::from(script_len).length() + script_len + 4
    }
}

pub(crate) fn field_error(field: &str, e: txsign_primitives::PrimitivesError) -> TransactionError {
    TransactionError::SerializationError(format!("reading {}: {}", field, e))
}
