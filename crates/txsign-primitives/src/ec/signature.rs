//! ECDSA signature with DER serialization and RFC6979 deterministic nonces.
//!
//! Signatures produced here are always low-S. Parsing accepts either form
//! so that existing high-S signatures can still be inspected and verified.

use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa;

use crate::ec::private_key::PrivateKey;
use crate::ec::public_key::PublicKey;
use crate::PrimitivesError;

/// The secp256k1 curve order N.
const CURVE_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFE, 0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36,
    0x41, 0x41,
];

/// N/2. An S above this is "high".
const HALF_ORDER: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B,
    0x20, 0xA0,
];

/// Smallest valid DER signature: 30 06 02 01 r 02 01 s.
const MIN_DER_LEN: usize = 8;

/// Largest valid DER signature: two 33-byte integers plus framing.
pub const MAX_DER_LEN: usize = 72;

/// An ECDSA signature as big-endian R and S scalars.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    r: [u8; 32],
    s: [u8; 32],
}

impl Signature {
    /// Build a signature from raw R and S. No range checks are applied.
    pub fn new(r: [u8; 32], s: [u8; 32]) -> Self {
        Signature { r, s }
    }

    pub fn r(&self) -> &[u8; 32] {
        &self.r
    }

    pub fn s(&self) -> &[u8; 32] {
        &self.s
    }

    /// True when S is in the lower half of the curve order.
    pub fn is_low_s(&self) -> bool {
        self.s <= HALF_ORDER
    }

    /// Return a copy with S replaced by N - S if S is high.
    pub fn normalize_s(&self) -> Signature {
        if self.is_low_s() {
            self.clone()
        } else {
            Signature {
                r: self.r,
                s: subtract_from_order(&self.s),
            }
        }
    }

    /// Parse a strict DER-encoded signature.
    ///
    /// Expected layout: `0x30 <len> 0x02 <r_len> <r> 0x02 <s_len> <s>`, with
    /// `len` covering the rest of the input exactly. A sighash flag byte must
    /// be stripped by the caller.
    ///
    /// # Arguments
    /// * `bytes` - DER-encoded signature bytes.
    ///
    /// # Returns
    /// `Ok(Signature)`, or `InvalidSignature` describing the first defect.
    pub fn from_der(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() < MIN_DER_LEN || bytes.len() > MAX_DER_LEN {
            return Err(malformed(format!("bad length {}", bytes.len())));
        }
        if bytes[0] != 0x30 {
            return Err(malformed("no sequence header".into()));
        }
        if bytes[1] as usize + 2 != bytes.len() {
            return Err(malformed("sequence length does not match input".into()));
        }

        let (r_bytes, rest) = der_integer(&bytes[2..], "R")?;
        let (s_bytes, rest) = der_integer(rest, "S")?;
        if !rest.is_empty() {
            return Err(malformed("trailing bytes after S".into()));
        }

        let r = to_32_bytes(r_bytes)?;
        let s = to_32_bytes(s_bytes)?;
        for (name, v) in [("R", &r), ("S", &s)] {
            if v.iter().all(|&b| b == 0) {
                return Err(malformed(format!("{} is zero", name)));
            }
            if *v >= CURVE_ORDER {
                return Err(malformed(format!("{} is not below the curve order", name)));
            }
        }

        Ok(Signature { r, s })
    }

    /// Serialize to DER with S normalized to its low form.
    pub fn to_der(&self) -> Vec<u8> {
        let s = self.normalize_s().s;
        let rb = canonicalize_int(&self.r);
        let sb = canonicalize_int(&s);

        let total_len = 6 + rb.len() + sb.len();
        let mut out = Vec::with_capacity(total_len);
        out.push(0x30);
        out.push((total_len - 2) as u8);
        out.push(0x02);
        out.push(rb.len() as u8);
        out.extend_from_slice(&rb);
        out.push(0x02);
        out.push(sb.len() as u8);
        out.extend_from_slice(&sb);
        out
    }

    /// Sign a 32-byte hash using an RFC6979 deterministic nonce.
    ///
    /// # Arguments
    /// * `hash` - The message digest; signed as-is, never rehashed.
    /// * `priv_key` - The signing key.
    ///
    /// # Returns
    /// A low-S `Signature`.
    pub fn sign(hash: &[u8; 32], priv_key: &PrivateKey) -> Result<Self, PrimitivesError> {
        let sig: ecdsa::Signature = priv_key
            .signing_key()
            .sign_prehash(hash)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;

        let (r_bytes, s_bytes) = sig.split_bytes();
        Ok(Signature {
            r: r_bytes.into(),
            s: s_bytes.into(),
        }
        .normalize_s())
    }

    /// Verify against a 32-byte hash and public key.
    ///
    /// High-S signatures are accepted.
    pub fn verify(&self, hash: &[u8; 32], pub_key: &PublicKey) -> bool {
        let low = self.normalize_s();
        let sig = match ecdsa::Signature::from_scalars(
            k256::FieldBytes::from(low.r),
            k256::FieldBytes::from(low.s),
        ) {
            Ok(sig) => sig,
            Err(_) => return false,
        };
        pub_key.verifying_key().verify_prehash(hash, &sig).is_ok()
    }
}

fn malformed(reason: String) -> PrimitivesError {
    PrimitivesError::InvalidSignature(format!("malformed DER signature: {}", reason))
}

/// Split one `0x02 <len> <bytes>` integer off the front of `data`.
fn der_integer<'a>(data: &'a [u8], name: &str) -> Result<(&'a [u8], &'a [u8]), PrimitivesError> {
    match data {
        [0x02, len, rest @ ..] => {
            let len = *len as usize;
            if len == 0 || len > rest.len() {
                return Err(malformed(format!("bogus {} length", name)));
            }
            let (value, rest) = rest.split_at(len);
            if value[0] & 0x80 != 0 {
                return Err(malformed(format!("{} is negative", name)));
            }
            if len > 1 && value[0] == 0 && value[1] & 0x80 == 0 {
                return Err(malformed(format!("{} has excess padding", name)));
            }
            Ok((value, rest))
        }
        _ => Err(malformed(format!("no integer marker for {}", name))),
    }
}

/// Minimal big-endian DER integer: leading zeros stripped, 0x00 prefix if
/// the high bit is set.
fn canonicalize_int(val: &[u8; 32]) -> Vec<u8> {
    let start = val.iter().position(|&b| b != 0).unwrap_or(31);
    let trimmed = &val[start..];
    let mut out = Vec::with_capacity(trimmed.len() + 1);
    if trimmed[0] & 0x80 != 0 {
        out.push(0x00);
    }
    out.extend_from_slice(trimmed);
    out
}

fn to_32_bytes(bytes: &[u8]) -> Result<[u8; 32], PrimitivesError> {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    let trimmed = &bytes[start..];
    if trimmed.len() > 32 {
        return Err(malformed("integer wider than 32 bytes".into()));
    }
    let mut out = [0u8; 32];
    out[32 - trimmed.len()..].copy_from_slice(trimmed);
    Ok(out)
}

/// N - val.
fn subtract_from_order(val: &[u8; 32]) -> [u8; 32] {
    let mut result = [0u8; 32];
    let mut borrow = 0i16;
    for i in (0..32).rev() {
        let mut diff = CURVE_ORDER[i] as i16 - val[i] as i16 - borrow;
        borrow = 0;
        if diff < 0 {
            diff += 256;
            borrow = 1;
        }
        result[i] = diff as u8;
    }
    result
}
