//! Command-line configuration.
//!
//! Every flag defaults to the reference signing scenario, so running the
//! binary without arguments signs that transaction.

use clap::Parser;
use txsign_transaction::UnspentOutput;

use crate::workflow::{OutputFormat, SignRequest, WorkflowError};

/// Reference unsigned transaction.
pub const DEFAULT_TX: &str = "0200000001037ded84940e54c8c9e1ba73aa338a61d2ee4c4ac0d1faf2e8671896b0f8da630000000000ffffffff01806de729010000001976a91463ea0d776d45502d2226aed9ebdf5b676e232ca188ac00000000";
/// Txid of the reference unspent output.
pub const DEFAULT_UTXO_TXID: &str =
    "63daf8b0961867e8f2fad1c04a4ceed2618a33aa73bae1c9c8540e9484ed7d03";
/// Locking script of the reference unspent output.
pub const DEFAULT_LOCKING_SCRIPT: &str = "76a91403ececf2d12a7f614aef4c82ecf13c303bd9975d88ac";
/// Value of the reference unspent output in coins.
pub const DEFAULT_AMOUNT: &str = "49.98";
/// Testnet key for the reference locking script.
pub const DEFAULT_WIF: &str = "cPjqbeH84Qq9VmWrURUEJNo7DaKnrPP428utXzZRcbBdXPx7kGe5";

/// Sign a transaction spending one unspent output, print it as JSON and
/// then whether it is fully signed.
#[derive(Debug, Parser)]
#[command(name = "txsign", version, about)]
pub struct Args {
    /// Raw transaction hex.
    #[arg(long = "tx", default_value = DEFAULT_TX)]
    pub raw_tx: String,

    /// Txid of the output being spent.
    #[arg(long, default_value = DEFAULT_UTXO_TXID)]
    pub utxo_txid: String,

    /// Index of the output being spent.
    #[arg(long, default_value_t = 0)]
    pub vout: u32,

    /// Locking script of the output being spent, as hex.
    #[arg(long, default_value = DEFAULT_LOCKING_SCRIPT)]
    pub locking_script: String,

    /// Value of the output being spent in coins, e.g. 49.98.
    #[arg(long, default_value = DEFAULT_AMOUNT)]
    pub amount: String,

    /// Private key in wallet import format.
    #[arg(long, default_value = DEFAULT_WIF)]
    pub wif: String,

    /// Keep the transaction's inputs instead of replacing them.
    #[arg(long)]
    pub keep_inputs: bool,

    /// JSON layout.
    #[arg(long, value_enum, default_value_t = OutputFormat::Library)]
    pub format: OutputFormat,

    /// Print JSON on one line.
    #[arg(long)]
    pub compact: bool,
}

impl Args {
    /// Build the workflow request.
    ///
    /// # Returns
    /// `InvalidUtxo` if the txid, script or amount is malformed.
    pub fn sign_request(&self) -> Result<SignRequest, WorkflowError> {
        let utxo = UnspentOutput::from_amount(
            &self.utxo_txid,
            self.vout,
            &self.locking_script,
            &self.amount,
        )
        .map_err(WorkflowError::InvalidUtxo)?;

        Ok(SignRequest {
            raw_tx: self.raw_tx.clone(),
            utxo,
            wif: self.wif.clone(),
            keep_inputs: self.keep_inputs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["txsign"]).unwrap();
        assert_eq!(args.raw_tx, DEFAULT_TX);
        assert_eq!(args.vout, 0);
        assert_eq!(args.format, OutputFormat::Library);
        assert!(!args.keep_inputs);
        assert!(!args.compact);

        let request = args.sign_request().unwrap();
        assert_eq!(request.utxo.satoshis(), 4_998_000_000);
    }

    #[test]
    fn test_flags() {
        let args = Args::try_parse_from([
            "txsign",
            "--vout",
            "2",
            "--amount",
            "0.5",
            "--format",
            "node",
            "--keep-inputs",
            "--compact",
        ])
        .unwrap();
        assert_eq!(args.vout, 2);
        assert_eq!(args.format, OutputFormat::Node);
        assert!(args.keep_inputs && args.compact);
        assert_eq!(args.sign_request().unwrap().utxo.satoshis(), 50_000_000);
    }

    #[test]
    fn test_bad_amount() {
        let args = Args::try_parse_from(["txsign", "--amount", "1.123456789"]).unwrap();
        assert!(matches!(args.sign_request(), Err(WorkflowError::InvalidUtxo(_))));
    }
}
