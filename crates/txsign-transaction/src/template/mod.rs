//! Unlocking script templates.
//!
//! A template knows how to satisfy one kind of locking script. Signing
//! strategies implement [`UnlockingScriptTemplate`]; P2PKH is the only one
//! provided.

pub mod p2pkh;

use txsign_script::Script;

use crate::transaction::Transaction;
use crate::TransactionError;

pub trait UnlockingScriptTemplate {
    /// Produce the unlocking script for `input_index`.
    ///
    /// # Arguments
    /// * `tx` - The transaction being signed.
    /// * `input_index` - The input to sign.
    ///
    /// # Returns
    /// The unlocking script, or an error if the input cannot be signed.
    fn sign(&self, tx: &Transaction, input_index: usize) -> Result<Script, TransactionError>;

    /// Upper bound on the unlocking script length, for fee estimation.
    fn estimate_length(&self, tx: &Transaction, input_index: usize) -> usize;
}
