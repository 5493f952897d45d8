//! secp256k1 private key.
//!
//! Wraps a k256 signing key. Encoding to and from WIF lives in
//! [`crate::ec::wif`], since WIF also carries the network and the
//! public key compression flag.

use std::fmt;

use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;

use crate::ec::public_key::PublicKey;
use crate::ec::signature::Signature;
use crate::PrimitivesError;

/// Length of a serialized private key scalar in bytes.
pub const PRIVATE_KEY_LEN: usize = 32;

/// A secp256k1 private key used as a signing credential.
///
/// The key is never printed: `Debug` shows a placeholder. The inner k256
/// key zeroizes its scalar when dropped.
#[derive(Clone)]
pub struct PrivateKey {
    inner: SigningKey,
}

impl PrivateKey {
    /// Generate a random key from the operating system RNG.
    pub fn random() -> Self {
        PrivateKey {
            inner: SigningKey::random(&mut OsRng),
        }
    }

    /// Create a private key from a 32-byte big-endian scalar.
    ///
    /// # Arguments
    /// * `bytes` - The scalar; must be non-zero and below the curve order.
    ///
    /// # Returns
    /// `Ok(PrivateKey)`, or `InvalidPrivateKey` for a wrong length or an
    /// out-of-range scalar.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != PRIVATE_KEY_LEN {
            return Err(PrimitivesError::InvalidPrivateKey(format!(
                "expected {} bytes, got {}",
                PRIVATE_KEY_LEN,
                bytes.len()
            )));
        }
        let inner = SigningKey::from_slice(bytes)
            .map_err(|e| PrimitivesError::InvalidPrivateKey(e.to_string()))?;
        Ok(PrivateKey { inner })
    }

    /// Create a private key from a 64-character hex scalar.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let bytes = zeroize::Zeroizing::new(hex::decode(hex_str)?);
        Self::from_bytes(&bytes)
    }

    /// The 32-byte big-endian scalar.
    pub fn to_bytes(&self) -> [u8; PRIVATE_KEY_LEN] {
        self.inner.to_bytes().into()
    }

    /// Derive the matching public key.
    pub fn pub_key(&self) -> PublicKey {
        PublicKey::from_verifying_key(self.inner.verifying_key().clone())
    }

    /// Sign a 32-byte message hash with an RFC6979 deterministic nonce.
    ///
    /// The result is low-S normalized.
    pub fn sign(&self, hash: &[u8; 32]) -> Result<Signature, PrimitivesError> {
        Signature::sign(hash, self)
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.inner
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.inner.to_bytes() == other.inner.to_bytes()
    }
}

impl Eq for PrivateKey {}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}
