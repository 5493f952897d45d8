/// Primitives for UTXO transaction signing.
///
/// This crate holds the building blocks the script and transaction layers
/// sit on:
/// - Hash functions (SHA-256, SHA-256d, RIPEMD-160, Hash160)
/// - Chain hash type for transaction identifiers
/// - Variable-length integers and little-endian byte readers/writers
/// - Base58 and Base58Check encoding
/// - Network version bytes for addresses and WIF keys
/// - secp256k1 keys, WIF decoding and ECDSA signatures

pub mod hash;
pub mod chainhash;
pub mod util;
pub mod base58;
pub mod network;
pub mod ec;

mod error;
pub use error::PrimitivesError;
pub use network::Network;
