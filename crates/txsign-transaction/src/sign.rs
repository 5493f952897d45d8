//! Signing and P2PKH verification.
//!
//! `sign` walks every input and attaches an unlocking script where the key
//! matches the spent output's public key hash. `verify_input` replays the
//! checks a node performs for a P2PKH spend, which is what
//! `is_fully_signed` reports on.

use log::{debug, info, warn};
use txsign_primitives::ec::{PublicKey, Signature, Wif};
use txsign_primitives::hash::hash160;

use crate::sighash::SIGHASH_FORKID;
use crate::template::p2pkh;
use crate::template::UnlockingScriptTemplate;
use crate::transaction::Transaction;
use crate::TransactionError;

impl Transaction {
    /// Sign every input this key can unlock with ALL|FORKID.
    ///
    /// An input is signed when its spent output is P2PKH and locked to the
    /// hash of the key's public key in the form the WIF declares. Other
    /// inputs are left untouched and logged at `warn`.
    ///
    /// # Arguments
    /// * `wif` - The decoded private key.
    ///
    /// # Returns
    /// Indices of the inputs that were signed, or the first error from an
    /// input that matched but could not be signed.
    pub fn sign(&mut self, wif: &Wif) -> Result<Vec<usize>, TransactionError> {
        let unlocker = p2pkh::unlock(wif.clone(), None);
        let mut signed = Vec::new();

        for index in 0..self.inputs.len() {
            let Some(script) = self.inputs[index].source_tx_script() else {
                warn!("input {} has no source output, skipping", index);
                continue;
            };
            if !unlocker.can_unlock(script) {
                warn!(
                    "input {} is locked by {} which this key cannot unlock, skipping",
                    index,
                    script.script_type()
                );
                continue;
            }
            self.sign_input(index, &unlocker)?;
            signed.push(index);
        }

        info!(
            "signed {} of {} inputs of {}",
            signed.len(),
            self.inputs.len(),
            self.tx_id()
        );
        Ok(signed)
    }

    /// Sign one input with `template`, replacing any unlocking script.
    pub fn sign_input(
        &mut self,
        input_index: usize,
        template: &impl UnlockingScriptTemplate,
    ) -> Result<(), TransactionError> {
        let script = template.sign(self, input_index)?;
        self.inputs[input_index].unlocking_script = Some(script);
        Ok(())
    }

    /// Check that input `input_index` validly spends a P2PKH output.
    ///
    /// # Returns
    /// `Ok(())` when the unlocking script satisfies the locking script,
    /// `MissingSourceOutput` when the spent output is unknown, and
    /// `VerificationFailed` naming the first failed check otherwise.
    pub fn verify_input(&self, input_index: usize) -> Result<(), TransactionError> {
        let input = self.input(input_index)?;
        let fail = |reason: &str| TransactionError::VerificationFailed {
            index: input_index,
            reason: reason.to_string(),
        };

        let locking = input
            .source_tx_script()
            .ok_or(TransactionError::MissingSourceOutput(input_index))?;
        let expected_hash = locking
            .public_key_hash()
            .map_err(|_| fail("locking script is not P2PKH"))?;

        let unlocking = input
            .unlocking_script
            .as_ref()
            .ok_or_else(|| fail("input is unsigned"))?;
        let (sig_bytes, key_bytes) = unlocking
            .p2pkh_unlocking_parts()
            .ok_or_else(|| fail("unlocking script is not <signature> <pubkey>"))?;

        if hash160(&key_bytes) != expected_hash {
            return Err(fail("public key does not match the locking script hash"));
        }
        let public_key = PublicKey::from_bytes(&key_bytes).map_err(|_| fail("invalid public key"))?;

        let (&flag, der) = sig_bytes
            .split_last()
            .ok_or_else(|| fail("empty signature"))?;
        let flag = u32::from(flag);
        if flag & SIGHASH_FORKID == 0 {
            return Err(fail("signature flag lacks FORKID"));
        }
        let signature = Signature::from_der(der).map_err(|_| fail("malformed DER signature"))?;

        let sig_hash = self.calc_input_signature_hash(input_index, flag)?;
        if !public_key.verify(&sig_hash, &signature) {
            return Err(fail("signature does not verify"));
        }
        Ok(())
    }

    /// True when there is at least one input and every input verifies.
    pub fn is_fully_signed(&self) -> bool {
        if self.inputs.is_empty() {
            return false;
        }
        (0..self.inputs.len()).all(|index| match self.verify_input(index) {
            Ok(()) => true,
            Err(e) => {
                debug!("{}", e);
                false
            }
        })
    }
}
