//! Wallet Import Format.
//!
//! A WIF string is Base58Check over `version || key[32]`, with a trailing
//! `0x01` when the matching public key is used in compressed form.

use std::fmt;
use std::str::FromStr;

use zeroize::Zeroizing;

use crate::base58;
use crate::ec::private_key::{PrivateKey, PRIVATE_KEY_LEN};
use crate::ec::public_key::PublicKey;
use crate::hash::hash160;
use crate::network::Network;
use crate::PrimitivesError;

const COMPRESS_MAGIC: u8 = 0x01;

/// A decoded WIF private key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wif {
    pub private_key: PrivateKey,
    pub compress_pub_key: bool,
    pub network: Network,
}

impl Wif {
    pub fn new(private_key: PrivateKey, network: Network, compress_pub_key: bool) -> Self {
        Wif {
            private_key,
            compress_pub_key,
            network,
        }
    }

    /// Decode a WIF string.
    ///
    /// # Arguments
    /// * `s` - Base58Check WIF string.
    ///
    /// # Returns
    /// The decoded key, `ChecksumMismatch` for a corrupted string,
    /// `UnknownNetwork` for an unrecognised version byte or `InvalidWif`
    /// for a payload of the wrong shape.
    pub fn decode(s: &str) -> Result<Self, PrimitivesError> {
        let payload = Zeroizing::new(base58::check_decode(s)?);

        let compress_pub_key = match payload.len() {
            n if n == 1 + PRIVATE_KEY_LEN => false,
            n if n == 2 + PRIVATE_KEY_LEN => {
                if payload[n - 1] != COMPRESS_MAGIC {
                    return Err(PrimitivesError::InvalidWif(format!(
                        "bad compression flag 0x{:02x}",
                        payload[n - 1]
                    )));
                }
                true
            }
            n => {
                return Err(PrimitivesError::InvalidWif(format!(
                    "unexpected payload length {}",
                    n
                )))
            }
        };

        let network = Network::from_wif_prefix(payload[0])?;
        let private_key = PrivateKey::from_bytes(&payload[1..1 + PRIVATE_KEY_LEN])?;

        Ok(Wif {
            private_key,
            compress_pub_key,
            network,
        })
    }

    /// Encode as a WIF string.
    pub fn encode(&self) -> String {
        let mut payload = Zeroizing::new(Vec::with_capacity(2 + PRIVATE_KEY_LEN));
        payload.push(self.network.wif_prefix());
        payload.extend_from_slice(&Zeroizing::new(self.private_key.to_bytes())[..]);
        if self.compress_pub_key {
            payload.push(COMPRESS_MAGIC);
        }
        base58::check_encode(&payload)
    }

    pub fn public_key(&self) -> PublicKey {
        self.private_key.pub_key()
    }

    /// Public key bytes in the form this WIF declares.
    pub fn public_key_bytes(&self) -> Vec<u8> {
        self.public_key().serialize(self.compress_pub_key)
    }

    /// Hash160 of [`Self::public_key_bytes`], as found in a P2PKH script.
    pub fn public_key_hash(&self) -> [u8; 20] {
        hash160(&self.public_key_bytes())
    }
}

impl fmt::Display for Wif {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for Wif {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Wif::decode(s)
    }
}
