/// Script handling for UTXO transactions.
///
/// Provides the `Script` byte type, the opcode table, chunk parsing, standard
/// output classification and P2PKH addresses. There is no interpreter:
/// spending checks for P2PKH live in the transaction crate.

pub mod address;
pub mod chunk;
pub mod opcodes;
pub mod script;

mod error;
pub use address::Address;
pub use chunk::ScriptChunk;
pub use error::ScriptError;
pub use script::{Script, ScriptType};
pub use txsign_primitives::Network;
