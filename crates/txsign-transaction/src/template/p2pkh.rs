//! Pay-to-public-key-hash template.
//!
//! Locking: `OP_DUP OP_HASH160 <hash160(pubkey)> OP_EQUALVERIFY OP_CHECKSIG`.
//! Unlocking: `<DER signature || sighash byte> <pubkey>`.

use log::info;
use txsign_primitives::ec::Wif;
use txsign_script::opcodes::*;
use txsign_script::{Address, Script};

use crate::sighash::{SIGHASH_ALL_FORKID, SIGHASH_FORKID};
use crate::template::UnlockingScriptTemplate;
use crate::transaction::Transaction;
use crate::TransactionError;

/// Lock to the address's public key hash.
pub fn lock(address: &Address) -> Script {
    lock_from_hash(&address.public_key_hash)
}

pub fn lock_from_hash(public_key_hash: &[u8; 20]) -> Script {
    let mut bytes = Vec::with_capacity(25);
    bytes.extend_from_slice(&[OP_DUP, OP_HASH160, OP_DATA_20]);
    bytes.extend_from_slice(public_key_hash);
    bytes.extend_from_slice(&[OP_EQUALVERIFY, OP_CHECKSIG]);
    Script::from(bytes)
}

/// A P2PKH signer for `wif`.
///
/// # Arguments
/// * `wif` - The decoded key. Its compression flag selects the public key
///   form placed in the unlocking script.
/// * `sighash_flag` - Defaults to `SIGHASH_ALL_FORKID`.
pub fn unlock(wif: Wif, sighash_flag: Option<u32>) -> P2PKH {
    P2PKH {
        wif,
        sighash_flag: sighash_flag.unwrap_or(SIGHASH_ALL_FORKID),
    }
}

pub struct P2PKH {
    wif: Wif,
    sighash_flag: u32,
}

impl P2PKH {
    pub fn sighash_flag(&self) -> u32 {
        self.sighash_flag
    }

    /// Whether this key can satisfy `locking_script`.
    pub fn can_unlock(&self, locking_script: &Script) -> bool {
        locking_script
            .public_key_hash()
            .map_or(false, |hash| hash == self.wif.public_key_hash())
    }
}

impl UnlockingScriptTemplate for P2PKH {
    fn sign(&self, tx: &Transaction, input_index: usize) -> Result<Script, TransactionError> {
        if self.sighash_flag & SIGHASH_FORKID == 0 {
            return Err(TransactionError::UnsupportedSighash(self.sighash_flag));
        }
        let flag_byte = u8::try_from(self.sighash_flag)
            .map_err(|_| TransactionError::UnsupportedSighash(self.sighash_flag))?;

        let sig_hash = tx.calc_input_signature_hash(input_index, self.sighash_flag)?;
        let signature = self
            .wif
            .private_key
            .sign(&sig_hash)
            .map_err(|e| TransactionError::SigningError(e.to_string()))?;

        let mut sig_buf = signature.to_der();
        sig_buf.push(flag_byte);

        let mut script = Script::new();
        script.append_push_data(&sig_buf)?;
        script.append_push_data(&self.wif.public_key_bytes())?;

        info!(
            "signed input {} with flag 0x{:02x} ({} byte unlocking script)",
            input_index,
            self.sighash_flag,
            script.len()
        );
        Ok(script)
    }

    /// Push prefix, DER signature of at most 72 bytes, flag byte, push
    /// prefix and the key.
    fn estimate_length(&self, _tx: &Transaction, _input_index: usize) -> usize {
        let key_len = self.wif.public_key_bytes().len();
        1 + 72 + 1 + 1 + key_len
    }
}
