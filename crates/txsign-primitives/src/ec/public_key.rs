//! secp256k1 public key.
//!
//! Supports SEC1 compressed/uncompressed serialization, Hash160 for P2PKH
//! and ECDSA verification.

use std::fmt;

use k256::ecdsa::VerifyingKey;

use crate::ec::signature::Signature;
use crate::hash::hash160;
use crate::PrimitivesError;

/// Length of a compressed SEC1 public key.
pub const COMPRESSED_LEN: usize = 33;

/// Length of an uncompressed SEC1 public key.
pub const UNCOMPRESSED_LEN: usize = 65;

/// A secp256k1 public key.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    inner: VerifyingKey,
}

impl PublicKey {
    /// Parse SEC1-encoded bytes (33-byte compressed or 65-byte uncompressed).
    ///
    /// # Returns
    /// `Ok(PublicKey)`, or `InvalidPublicKey` if the bytes are not a point
    /// on the curve.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let prefix_ok = match bytes.len() {
            COMPRESSED_LEN => matches!(bytes[0], 0x02 | 0x03),
            UNCOMPRESSED_LEN => bytes[0] == 0x04,
            len => {
                return Err(PrimitivesError::InvalidPublicKey(format!(
                    "unexpected length {len}"
                )))
            }
        };
        if !prefix_ok {
            return Err(PrimitivesError::InvalidPublicKey(format!(
                "unexpected prefix {:#04x} for {} bytes",
                bytes[0],
                bytes.len()
            )));
        }
        let inner = VerifyingKey::from_sec1_bytes(bytes)
            .map_err(|e| PrimitivesError::InvalidPublicKey(e.to_string()))?;
        Ok(PublicKey { inner })
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        Self::from_bytes(&hex::decode(hex_str)?)
    }

    pub(crate) fn from_verifying_key(inner: VerifyingKey) -> Self {
        PublicKey { inner }
    }

    pub fn to_compressed(&self) -> [u8; COMPRESSED_LEN] {
        let point = self.inner.to_encoded_point(true);
        let mut out = [0u8; COMPRESSED_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    pub fn to_uncompressed(&self) -> [u8; UNCOMPRESSED_LEN] {
        let point = self.inner.to_encoded_point(false);
        let mut out = [0u8; UNCOMPRESSED_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// SEC1 bytes in the requested form.
    pub fn serialize(&self, compressed: bool) -> Vec<u8> {
        if compressed {
            self.to_compressed().to_vec()
        } else {
            self.to_uncompressed().to_vec()
        }
    }

    /// Hex of the compressed encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_compressed())
    }

    /// Hash160 of the compressed encoding.
    ///
    /// Keys imported from an uncompressed WIF hash the uncompressed form
    /// instead; see [`crate::ec::Wif::public_key_hash`].
    pub fn hash160(&self) -> [u8; 20] {
        hash160(&self.to_compressed())
    }

    /// Verify `sig` over a 32-byte message hash.
    pub fn verify(&self, hash: &[u8; 32], sig: &Signature) -> bool {
        sig.verify(hash, self)
    }

    pub(crate) fn verifying_key(&self) -> &VerifyingKey {
        &self.inner
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPRESSED: &str = "03fc7c702eb7a03099ef01970b31ecbebe7ff77adc202d3749a8562ffc185a44a6";

    #[test]
    fn test_compressed_round_trip() {
        let pk = PublicKey::from_hex(COMPRESSED).unwrap();
        assert_eq!(hex::encode(pk.to_compressed()), COMPRESSED);
        assert_eq!(pk.to_string(), COMPRESSED);
    }

    #[test]
    fn test_uncompressed_parses_to_same_key() {
        let pk = PublicKey::from_hex(COMPRESSED).unwrap();
        let uncompressed = pk.to_uncompressed();
        assert_eq!(uncompressed[0], 0x04);
        let again = PublicKey::from_bytes(&uncompressed).unwrap();
        assert_eq!(again, pk);
        assert_eq!(pk.serialize(false), uncompressed.to_vec());
        assert_eq!(pk.serialize(true).len(), COMPRESSED_LEN);
    }

    #[test]
    fn test_hash160() {
        let pk = PublicKey::from_hex(COMPRESSED).unwrap();
        assert_eq!(
            hex::encode(pk.hash160()),
            "03ececf2d12a7f614aef4c82ecf13c303bd9975d"
        );
    }

    #[test]
    fn test_rejects_invalid_keys() {
        assert!(PublicKey::from_bytes(&[]).is_err());
        assert!(PublicKey::from_bytes(&[0x05]).is_err());
        // x coordinate not on the curve
        let mut bad = hex::decode(COMPRESSED).unwrap();
        bad[0] = 0x05;
        assert!(PublicKey::from_bytes(&bad).is_err());
    }

    #[test]
    fn test_rejects_mismatched_prefix() {
        let mut compact = hex::decode(COMPRESSED).unwrap();
        compact[0] = 0x05;
        assert!(matches!(
            PublicKey::from_bytes(&compact),
            Err(PrimitivesError::InvalidPublicKey(_))
        ));

        let key = PublicKey::from_hex(COMPRESSED).unwrap();
        let mut uncompressed = key.to_uncompressed();
        uncompressed[0] = 0x02;
        assert!(PublicKey::from_bytes(&uncompressed).is_err());
        uncompressed[0] = 0x04;
        assert_eq!(PublicKey::from_bytes(&uncompressed).unwrap(), key);

        let mut hybrid = key.to_compressed();
        hybrid[0] = 0x04;
        assert!(PublicKey::from_bytes(&hybrid).is_err());
    }
}
