/// Transaction building, signing and serialization.
///
/// Provides the `Transaction` type with its inputs and outputs, spendable
/// `UnspentOutput`s, FORKID signature hashing, P2PKH signing and
/// verification, change calculation and the two JSON representations.

pub mod fees;
pub mod input;
pub mod json;
pub mod output;
pub mod sighash;
pub mod sign;
pub mod template;
pub mod transaction;
pub mod utxo;

mod error;
pub use error::TransactionError;
pub use fees::{Fee, FeeQuote, FeeType, FeeUnit, TxFees, TxSize};
pub use input::TransactionInput;
pub use json::NodeTransaction;
pub use output::TransactionOutput;
pub use template::UnlockingScriptTemplate;
pub use transaction::Transaction;
pub use utxo::UnspentOutput;
