//! Chain hash type for transaction identification.
//!
//! A `Hash` is stored in internal byte order (the order it appears on the
//! wire and in sighash preimages) and displayed byte-reversed, which is the
//! conventional way transaction IDs are written.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::hash::sha256d;
use crate::PrimitivesError;

/// Size of a Hash in bytes.
pub const HASH_SIZE: usize = 32;

/// Length of the display hex string of a Hash.
pub const HASH_STRING_SIZE: usize = HASH_SIZE * 2;

/// A 32-byte double-SHA-256 hash, such as a transaction ID.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Hash([u8; HASH_SIZE]);

impl Hash {
    /// Wrap 32 bytes given in internal order.
    pub fn new(bytes: [u8; HASH_SIZE]) -> Self {
        Hash(bytes)
    }

    /// Hash `data` with SHA-256d.
    pub fn double_sha256(data: &[u8]) -> Self {
        Hash(sha256d(data))
    }

    /// Create a Hash from a byte slice in internal order.
    ///
    /// # Arguments
    /// * `bytes` - Exactly 32 bytes.
    ///
    /// # Returns
    /// `Ok(Hash)`, or `InvalidHash` if the slice has the wrong length.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let arr: [u8; HASH_SIZE] = bytes.try_into().map_err(|_| {
            PrimitivesError::InvalidHash(format!(
                "invalid hash length of {}, want {}",
                bytes.len(),
                HASH_SIZE
            ))
        })?;
        Ok(Hash(arr))
    }

    /// Parse a Hash from its display (byte-reversed) hex string.
    ///
    /// Transaction IDs are always 64 hex characters, so shorter or longer
    /// strings are rejected rather than padded.
    ///
    /// # Arguments
    /// * `hex_str` - 64 hex characters in display order.
    ///
    /// # Returns
    /// `Ok(Hash)` in internal order, or an error for bad length or hex.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        if hex_str.len() != HASH_STRING_SIZE {
            return Err(PrimitivesError::InvalidHash(format!(
                "hash string must be {} characters, got {}",
                HASH_STRING_SIZE,
                hex_str.len()
            )));
        }
        let mut bytes = [0u8; HASH_SIZE];
        hex::decode_to_slice(hex_str, &mut bytes)?;
        bytes.reverse();
        Ok(Hash(bytes))
    }

    /// The bytes in internal order.
    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    /// The display hex string (byte-reversed).
    pub fn to_hex(&self) -> String {
        let mut reversed = self.0;
        reversed.reverse();
        hex::encode(reversed)
    }
}

impl From<[u8; HASH_SIZE]> for Hash {
    fn from(bytes: [u8; HASH_SIZE]) -> Self {
        Hash(bytes)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.to_hex())
    }
}

impl FromStr for Hash {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Hash::from_hex(s)
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Hash::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TXID: &str = "63daf8b0961867e8f2fad1c04a4ceed2618a33aa73bae1c9c8540e9484ed7d03";
    const TXID_INTERNAL: &str = "037ded84940e54c8c9e1ba73aa338a61d2ee4c4ac0d1faf2e8671896b0f8da63";

    #[test]
    fn test_from_hex_reverses_bytes() {
        let hash = Hash::from_hex(TXID).unwrap();
        assert_eq!(hex::encode(hash.as_bytes()), TXID_INTERNAL);
        assert_eq!(hash.to_string(), TXID);
    }

    #[test]
    fn test_from_bytes_matches_from_hex() {
        let internal = hex::decode(TXID_INTERNAL).unwrap();
        let a = Hash::from_bytes(&internal).unwrap();
        let b: Hash = TXID.parse().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert!(Hash::from_hex("").is_err());
        assert!(Hash::from_hex(&TXID[..62]).is_err());
        assert!(Hash::from_hex(&format!("{}00", TXID)).is_err());
        assert!(Hash::from_bytes(&[0u8; 31]).is_err());
    }

    #[test]
    fn test_rejects_bad_hex() {
        let bad = format!("zz{}", &TXID[2..]);
        assert!(matches!(Hash::from_hex(&bad), Err(PrimitivesError::InvalidHex(_))));
    }

    #[test]
    fn test_serde_uses_display_hex() {
        let hash = Hash::from_hex(TXID).unwrap();
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{}\"", TXID));
        let back: Hash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }
}
