/// Script byte type.
///
/// Scripts sit in transaction inputs (unlocking) and outputs (locking). The
/// `Script` wraps a `Vec<u8>` and provides construction, classification,
/// hex/ASM rendering and serde as a hex string.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::chunk::{decode_script, push_data_prefix, ScriptChunk};
use crate::opcodes::*;
use crate::ScriptError;

/// Standard output classes, named as a node's `scriptPubKey.type` reports
/// them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptType {
    #[serde(rename = "pubkeyhash")]
    PubKeyHash,
    #[serde(rename = "pubkey")]
    PubKey,
    #[serde(rename = "scripthash")]
    ScriptHash,
    #[serde(rename = "nulldata")]
    NullData,
    #[serde(rename = "nonstandard")]
    NonStandard,
}

impl ScriptType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptType::PubKeyHash => "pubkeyhash",
            ScriptType::PubKey => "pubkey",
            ScriptType::ScriptHash => "scripthash",
            ScriptType::NullData => "nulldata",
            ScriptType::NonStandard => "nonstandard",
        }
    }

    /// Signatures needed to spend, where the class defines it.
    pub fn required_sigs(&self) -> Option<u32> {
        match self {
            ScriptType::PubKeyHash | ScriptType::PubKey | ScriptType::ScriptHash => Some(1),
            ScriptType::NullData | ScriptType::NonStandard => None,
        }
    }
}

impl fmt::Display for ScriptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A script, represented as a byte vector newtype.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Script(Vec<u8>);

impl Script {
    pub fn new() -> Self {
        Script(Vec::new())
    }

    /// Create a script from a hex string such as `"76a914...88ac"`.
    ///
    /// # Returns
    /// The decoded `Script`, or `InvalidHex`.
    pub fn from_hex(hex_str: &str) -> Result<Self, ScriptError> {
        Ok(Script(hex::decode(hex_str)?))
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Script(bytes.to_vec())
    }

    /// Build a script from space-separated ASM.
    ///
    /// Tokens that name an opcode are emitted as that opcode; anything else
    /// must be hex and is pushed as data with a minimal prefix. An
    /// `OP_RETURN` followed by hex appends those bytes raw, matching how
    /// [`Script::to_asm`] renders a data output.
    ///
    /// # Arguments
    /// * `asm` - The ASM text.
    ///
    /// # Returns
    /// The assembled `Script`, or `InvalidAsmToken` for a token that is
    /// neither an opcode nor hex.
    pub fn from_asm(asm: &str) -> Result<Self, ScriptError> {
        let mut script = Script::new();
        let mut tokens = asm.split_whitespace();
        while let Some(token) = tokens.next() {
            if let Some(op) = string_to_opcode(token) {
                script.0.push(op);
                if op == OP_RETURN {
                    for rest in tokens.by_ref() {
                        let raw = hex::decode(rest)
                            .map_err(|_| ScriptError::InvalidAsmToken(rest.to_string()))?;
                        script.0.extend_from_slice(&raw);
                    }
                }
                continue;
            }
            let data = hex::decode(token)
                .map_err(|_| ScriptError::InvalidAsmToken(token.to_string()))?;
            script.append_push_data(&data)?;
        }
        Ok(script)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Render as ASM. Data pushes show as hex, opcodes by name.
    ///
    /// A script that fails to parse renders as an empty string.
    pub fn to_asm(&self) -> String {
        match self.chunks() {
            Ok(chunks) => chunks
                .iter()
                .map(ScriptChunk::to_asm_string)
                .collect::<Vec<_>>()
                .join(" "),
            Err(_) => String::new(),
        }
    }

    pub fn to_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    // -----------------------------------------------------------------------
    // Classification
    // -----------------------------------------------------------------------

    /// `OP_DUP OP_HASH160 <20 bytes> OP_EQUALVERIFY OP_CHECKSIG`.
    pub fn is_p2pkh(&self) -> bool {
        matches!(
            self.0.as_slice(),
            [OP_DUP, OP_HASH160, OP_DATA_20, .., OP_EQUALVERIFY, OP_CHECKSIG] if self.0.len() == 25
        )
    }

    /// `<pubkey> OP_CHECKSIG` with a 33-byte compressed or 65-byte
    /// uncompressed key.
    pub fn is_p2pk(&self) -> bool {
        match self.chunks() {
            Ok(chunks) => match chunks.as_slice() {
                [key, sig] if sig.op == OP_CHECKSIG => {
                    key.push_data().map_or(false, is_public_key_shape)
                }
                _ => false,
            },
            Err(_) => false,
        }
    }

    /// `OP_HASH160 <20 bytes> OP_EQUAL`.
    pub fn is_p2sh(&self) -> bool {
        matches!(
            self.0.as_slice(),
            [OP_HASH160, OP_DATA_20, .., OP_EQUAL] if self.0.len() == 23
        )
    }

    /// Starts with `OP_RETURN` or `OP_FALSE OP_RETURN`.
    pub fn is_data(&self) -> bool {
        matches!(self.0.as_slice(), [OP_RETURN, ..] | [OP_FALSE, OP_RETURN, ..])
    }

    /// Exactly two pushes: a signature with its sighash byte, then a
    /// 33- or 65-byte public key.
    pub fn is_p2pkh_unlocking(&self) -> bool {
        self.p2pkh_unlocking_parts().is_some()
    }

    /// Split a P2PKH unlocking script into `(signature || flag, public key)`.
    pub fn p2pkh_unlocking_parts(&self) -> Option<(Vec<u8>, Vec<u8>)> {
        let chunks = self.chunks().ok()?;
        match chunks.as_slice() {
            [sig, key] => {
                let sig = sig.push_data().filter(|s| !s.is_empty())?;
                let key = key.push_data().filter(|k| is_public_key_shape(k))?;
                Some((sig.to_vec(), key.to_vec()))
            }
            _ => None,
        }
    }

    pub fn script_type(&self) -> ScriptType {
        if self.is_p2pkh() {
            ScriptType::PubKeyHash
        } else if self.is_p2pk() {
            ScriptType::PubKey
        } else if self.is_p2sh() {
            ScriptType::ScriptHash
        } else if self.is_data() {
            ScriptType::NullData
        } else {
            ScriptType::NonStandard
        }
    }

    /// The 20-byte hash from a P2PKH locking script.
    ///
    /// # Returns
    /// The hash, `EmptyScript` for an empty script or `NotP2PKH` otherwise.
    pub fn public_key_hash(&self) -> Result<[u8; 20], ScriptError> {
        if self.0.is_empty() {
            return Err(ScriptError::EmptyScript);
        }
        if !self.is_p2pkh() {
            return Err(ScriptError::NotP2PKH);
        }
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&self.0[3..23]);
        Ok(hash)
    }

    pub fn chunks(&self) -> Result<Vec<ScriptChunk>, ScriptError> {
        decode_script(&self.0)
    }

    // -----------------------------------------------------------------------
    // Building
    // -----------------------------------------------------------------------

    /// Push `data` with the minimal prefix.
    pub fn append_push_data(&mut self, data: &[u8]) -> Result<(), ScriptError> {
        let prefix = push_data_prefix(data.len())?;
        self.0.extend_from_slice(&prefix);
        self.0.extend_from_slice(data);
        Ok(())
    }

    /// Append non-push opcodes.
    ///
    /// # Returns
    /// `InvalidOpcodeType` if any byte is a push opcode (`OP_DATA_1` to
    /// `OP_PUSHDATA4`); nothing is appended in that case.
    pub fn append_opcodes(&mut self, opcodes: &[u8]) -> Result<(), ScriptError> {
        if let Some(&op) = opcodes
            .iter()
            .find(|&&op| (OP_DATA_1..=OP_PUSHDATA4).contains(&op))
        {
            return Err(ScriptError::InvalidOpcodeType(opcode_to_string(op)));
        }
        self.0.extend_from_slice(opcodes);
        Ok(())
    }
}

fn is_public_key_shape(key: &[u8]) -> bool {
    matches!(
        (key.first(), key.len()),
        (Some(0x02 | 0x03), 33) | (Some(0x04 | 0x06 | 0x07), 65)
    )
}

impl From<Vec<u8>> for Script {
    fn from(bytes: Vec<u8>) -> Self {
        Script(bytes)
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", self.to_hex())
    }
}

impl Serialize for Script {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Script {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Script::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
