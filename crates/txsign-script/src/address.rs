/// P2PKH address handling.
///
/// An address is Base58Check over `version || hash160(pubkey)`; the version
/// byte selects the network.

use std::fmt;
use std::str::FromStr;

use txsign_primitives::base58;
use txsign_primitives::hash::hash160;
use txsign_primitives::{Network, PrimitivesError};

use crate::ScriptError;

const PAYLOAD_LEN: usize = 21;

/// A P2PKH address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Address {
    /// The Base58Check string.
    pub address_string: String,
    pub public_key_hash: [u8; 20],
    pub network: Network,
}

impl Address {
    /// Parse a Base58Check address and detect its network.
    ///
    /// # Arguments
    /// * `addr` - The address string.
    ///
    /// # Returns
    /// An `Address`, or `InvalidAddress` for bad characters, a bad checksum,
    /// a wrong length or an unknown version byte.
    pub fn from_string(addr: &str) -> Result<Self, ScriptError> {
        let payload = base58::check_decode(addr).map_err(|e| match e {
            PrimitivesError::ChecksumMismatch => {
                ScriptError::InvalidAddress(format!("checksum mismatch for '{}'", addr))
            }
            other => ScriptError::InvalidAddress(format!("'{}': {}", addr, other)),
        })?;

        if payload.len() != PAYLOAD_LEN {
            return Err(ScriptError::InvalidAddress(format!(
                "'{}' decodes to {} bytes",
                addr,
                payload.len()
            )));
        }

        let network = Network::from_p2pkh_prefix(payload[0])
            .map_err(|e| ScriptError::InvalidAddress(format!("'{}': {}", addr, e)))?;
        let mut public_key_hash = [0u8; 20];
        public_key_hash.copy_from_slice(&payload[1..]);

        Ok(Address {
            address_string: addr.to_string(),
            public_key_hash,
            network,
        })
    }

    /// Build the address for a 20-byte public key hash.
    pub fn from_public_key_hash(hash: &[u8; 20], network: Network) -> Self {
        let mut payload = Vec::with_capacity(PAYLOAD_LEN);
        payload.push(network.p2pkh_prefix());
        payload.extend_from_slice(hash);

        Address {
            address_string: base58::check_encode(&payload),
            public_key_hash: *hash,
            network,
        }
    }

    /// Build the address for serialized public key bytes.
    ///
    /// The bytes are hashed as given, so a compressed and an uncompressed
    /// encoding of the same key give different addresses.
    pub fn from_public_key_bytes(pub_key: &[u8], network: Network) -> Self {
        Self::from_public_key_hash(&hash160(pub_key), network)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address_string)
    }
}

impl FromStr for Address {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::from_string(s)
    }
}
