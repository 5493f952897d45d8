//! The signing workflow.
//!
//! build unspent output -> parse transaction -> clear inputs -> add the
//! output as the only input -> decode WIF -> sign -> render.

use clap::ValueEnum;
use log::{debug, info};
use txsign_primitives::ec::Wif;
use txsign_primitives::PrimitivesError;
use txsign_transaction::{Transaction, TransactionError, TransactionOutput, UnspentOutput};

/// Inputs to [`run`].
#[derive(Clone, Debug)]
pub struct SignRequest {
    /// Raw transaction as hex.
    pub raw_tx: String,
    /// The output being spent.
    pub utxo: UnspentOutput,
    /// Private key in wallet import format.
    pub wif: String,
    /// Keep the transaction's own inputs instead of replacing them with
    /// `utxo`. The input spending `utxo` gets its source output attached;
    /// if none does, `utxo` is appended.
    pub keep_inputs: bool,
}

/// Result of [`run`].
#[derive(Clone, Debug)]
pub struct SignOutcome {
    /// The transaction after signing.
    pub tx: Transaction,
    /// Indices of the inputs that were signed.
    pub signed_inputs: Vec<usize>,
    /// Whether every input verifies.
    pub fully_signed: bool,
}

/// Workflow failures. Each wraps the layer error that caused it.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// The raw transaction could not be decoded.
    #[error("invalid transaction hex")]
    InvalidTransaction(#[source] TransactionError),

    /// The unspent output could not be built.
    #[error("invalid unspent output")]
    InvalidUtxo(#[source] TransactionError),

    /// The WIF key could not be decoded.
    #[error("invalid WIF private key")]
    InvalidKey(#[source] PrimitivesError),

    /// Signing a matching input failed.
    #[error("signing failed")]
    Signing(#[source] TransactionError),

    /// The transaction could not be rendered.
    #[error("rendering failed")]
    Render(#[source] TransactionError),
}

/// JSON layout for printing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `{txid, hex, inputs, outputs, version, lockTime}`.
    #[default]
    Library,
    /// Verbose `getrawtransaction` style with `vin` and `vout`.
    Node,
}

/// Run the workflow.
///
/// # Arguments
/// * `request` - Transaction, unspent output and key.
///
/// # Returns
/// The signed transaction and whether it is fully signed. A key that
/// matches no input is not an error; it yields `fully_signed == false`.
pub fn run(request: &SignRequest) -> Result<SignOutcome, WorkflowError> {
    let mut tx =
        Transaction::from_hex(&request.raw_tx).map_err(WorkflowError::InvalidTransaction)?;

    if request.keep_inputs {
        attach_utxo(&mut tx, &request.utxo);
    } else {
        tx.clear_inputs();
        tx.add_utxo(&request.utxo);
    }

    let wif = Wif::decode(&request.wif).map_err(WorkflowError::InvalidKey)?;
    debug!(
        "decoded {:?} key, compressed public key: {}",
        wif.network, wif.compress_pub_key
    );

    let signed_inputs = tx.sign(&wif).map_err(WorkflowError::Signing)?;
    let fully_signed = tx.is_fully_signed();
    info!("transaction {} fully signed: {}", tx.tx_id(), fully_signed);

    Ok(SignOutcome {
        tx,
        signed_inputs,
        fully_signed,
    })
}

fn attach_utxo(tx: &mut Transaction, utxo: &UnspentOutput) {
    let spending = tx
        .inputs
        .iter_mut()
        .find(|i| i.source_txid == *utxo.txid() && i.source_tx_out_index == utxo.vout());
    match spending {
        Some(input) => {
            debug!("input already spends {}:{}", utxo.txid(), utxo.vout());
            input.set_source_output(Some(TransactionOutput::new(
                utxo.satoshis(),
                utxo.locking_script().clone(),
            )));
        }
        None => tx.add_utxo(utxo),
    }
}

/// Render `tx` as JSON in `format`, pretty-printed unless `compact`.
pub fn render(tx: &Transaction, format: OutputFormat, compact: bool) -> Result<String, WorkflowError> {
    match format {
        OutputFormat::Library => tx.to_json(!compact),
        OutputFormat::Node => tx.to_node_json(!compact),
    }
    .map_err(WorkflowError::Render)
}
