/// Elliptic curve cryptography on secp256k1.
///
/// Private and public keys, WIF decoding and deterministic ECDSA signatures.

pub mod private_key;
pub mod public_key;
pub mod signature;
pub mod wif;

pub use private_key::PrivateKey;
pub use public_key::PublicKey;
pub use signature::Signature;
pub use wif::Wif;
