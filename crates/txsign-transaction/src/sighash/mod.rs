//! Signature hash computation.
//!
//! Only the replay-protected (FORKID) digest is implemented. It commits to
//! the value being spent and hashes prevouts, sequences and outputs
//! separately, so each input's digest is independent of the other inputs'
//! unlocking scripts.

use log::debug;
use txsign_primitives::hash::sha256d;
use txsign_primitives::util::{ByteWriter, VarInt};

use crate::transaction::Transaction;
use crate::TransactionError;

pub const SIGHASH_ALL: u32 = 0x01;

/// Commit to no outputs.
pub const SIGHASH_NONE: u32 = 0x02;

/// Commit only to the output at the signed input's index.
pub const SIGHASH_SINGLE: u32 = 0x03;

/// Commit only to the signed input.
pub const SIGHASH_ANYONECANPAY: u32 = 0x80;

pub const SIGHASH_FORKID: u32 = 0x40;

/// ALL | FORKID, used for every signature this crate produces.
pub const SIGHASH_ALL_FORKID: u32 = SIGHASH_ALL | SIGHASH_FORKID;

/// Extracts the base type (ALL, NONE, SINGLE).
pub const SIGHASH_MASK: u32 = 0x1f;

/// Which outputs `hashOutputs` covers.
enum OutputsCommitment {
    All,
    Single(usize),
    Zero,
}

/// The digest ECDSA signs for input `input_index`.
///
/// # Arguments
/// * `tx` - Transaction being signed.
/// * `input_index` - Input being signed.
/// * `prev_output_script` - Locking script of the spent output (scriptCode).
/// * `sighash_type` - Combined flags; must include `SIGHASH_FORKID`.
/// * `satoshis` - Value of the spent output.
///
/// # Returns
/// sha256d of [`calc_preimage`].
pub fn signature_hash(
    tx: &Transaction,
    input_index: usize,
    prev_output_script: &[u8],
    sighash_type: u32,
    satoshis: u64,
) -> Result<[u8; 32], TransactionError> {
    let preimage = calc_preimage(tx, input_index, prev_output_script, sighash_type, satoshis)?;
    let digest = sha256d(&preimage);
    debug!(
        "sighash for input {} with flag 0x{:02x}: {}",
        input_index,
        sighash_type,
        hex::encode(digest)
    );
    Ok(digest)
}

/// The preimage bytes before double hashing.
///
/// Layout: version · hashPrevouts · hashSequence · outpoint · scriptCode ·
/// value · nSequence · hashOutputs · nLockTime · sighash type. Hash fields
/// that the flags exclude are 32 zero bytes.
pub fn calc_preimage(
    tx: &Transaction,
    input_index: usize,
    prev_output_script: &[u8],
    sighash_type: u32,
    satoshis: u64,
) -> Result<Vec<u8>, TransactionError> {
    if sighash_type & SIGHASH_FORKID == 0 {
        return Err(TransactionError::UnsupportedSighash(sighash_type));
    }
    let input = tx.input(input_index)?;

    let base_type = sighash_type & SIGHASH_MASK;
    let anyone_can_pay = sighash_type & SIGHASH_ANYONECANPAY != 0;
    let single_or_none = base_type == SIGHASH_SINGLE || base_type == SIGHASH_NONE;

    let hash_prevouts = if anyone_can_pay {
        [0u8; 32]
    } else {
        prevouts_hash(tx)
    };

    let hash_sequence = if anyone_can_pay || single_or_none {
        [0u8; 32]
    } else {
        sequence_hash(tx)
    };

    let commitment = if !single_or_none {
        OutputsCommitment::All
    } else if base_type == SIGHASH_SINGLE && input_index < tx.outputs.len() {
        OutputsCommitment::Single(input_index)
    } else {
        OutputsCommitment::Zero
    };
    let hash_outputs = outputs_hash(tx, commitment);

    let mut writer = ByteWriter::with_capacity(156 + prev_output_script.len());
    writer.write_u32_le(tx.version);
    writer.write_bytes(&hash_prevouts);
    writer.write_bytes(&hash_sequence);
    writer.write_bytes(input.source_txid.as_bytes());
    writer.write_u32_le(input.source_tx_out_index);
    writer.write_varint(VarInt::from(prev_output_script.len()));
    writer.write_bytes(prev_output_script);
    writer.write_u64_le(satoshis);
    writer.write_u32_le(input.sequence_number);
    writer.write_bytes(&hash_outputs);
    writer.write_u32_le(tx.lock_time);
    writer.write_u32_le(sighash_type);

    Ok(writer.into_bytes())
}

fn prevouts_hash(tx: &Transaction) -> [u8; 32] {
    let mut writer = ByteWriter::with_capacity(tx.inputs.len() * 36);
    for input in &tx.inputs {
        writer.write_bytes(input.source_txid.as_bytes());
        writer.write_u32_le(input.source_tx_out_index);
    }
    sha256d(writer.as_bytes())
}

fn sequence_hash(tx: &Transaction) -> [u8; 32] {
    let mut writer = ByteWriter::with_capacity(tx.inputs.len() * 4);
    for input in &tx.inputs {
        writer.write_u32_le(input.sequence_number);
    }
    sha256d(writer.as_bytes())
}

fn outputs_hash(tx: &Transaction, commitment: OutputsCommitment) -> [u8; 32] {
    let mut writer = ByteWriter::new();
    match commitment {
        OutputsCommitment::All => {
            for output in &tx.outputs {
                output.write_to(&mut writer);
            }
        }
        OutputsCommitment::Single(index) => tx.outputs[index].write_to(&mut writer),
        OutputsCommitment::Zero => return [0u8; 32],
    }
    sha256d(writer.as_bytes())
}
