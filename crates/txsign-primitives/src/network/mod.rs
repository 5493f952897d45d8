//! Network parameters.
//!
//! Only the version bytes that prefix Base58Check payloads differ between
//! networks as far as transaction signing is concerned.

use std::fmt;

use crate::PrimitivesError;

/// The chain a key or address belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Network {
    /// Main network (addresses start with '1', compressed WIF with 'K'/'L').
    Mainnet,
    /// Test network (addresses start with 'm'/'n', compressed WIF with 'c').
    Testnet,
}

impl Network {
    /// Version byte of a P2PKH address.
    pub fn p2pkh_prefix(self) -> u8 {
        match self {
            Network::Mainnet => 0x00,
            Network::Testnet => 0x6f,
        }
    }

    /// Version byte of a WIF private key.
    pub fn wif_prefix(self) -> u8 {
        match self {
            Network::Mainnet => 0x80,
            Network::Testnet => 0xef,
        }
    }

    /// Resolve the network from a P2PKH address version byte.
    pub fn from_p2pkh_prefix(prefix: u8) -> Result<Self, PrimitivesError> {
        match prefix {
            0x00 => Ok(Network::Mainnet),
            0x6f => Ok(Network::Testnet),
            other => Err(PrimitivesError::UnknownNetwork(other)),
        }
    }

    /// Resolve the network from a WIF version byte.
    pub fn from_wif_prefix(prefix: u8) -> Result<Self, PrimitivesError> {
        match prefix {
            0x80 => Ok(Network::Mainnet),
            0xef => Ok(Network::Testnet),
            other => Err(PrimitivesError::UnknownNetwork(other)),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => f.write_str("mainnet"),
            Network::Testnet => f.write_str("testnet"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_round_trip() {
        for net in [Network::Mainnet, Network::Testnet] {
            assert_eq!(Network::from_p2pkh_prefix(net.p2pkh_prefix()).unwrap(), net);
            assert_eq!(Network::from_wif_prefix(net.wif_prefix()).unwrap(), net);
        }
    }

    #[test]
    fn test_unknown_prefix() {
        assert!(matches!(
            Network::from_wif_prefix(0x05),
            Err(PrimitivesError::UnknownNetwork(0x05))
        ));
    }
}
