//! Transaction output: a satoshi value and its locking script.

use txsign_primitives::util::{ByteReader, ByteWriter, VarInt};
use txsign_script::Script;

use crate::input::field_error;
use crate::TransactionError;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionOutput {
    pub satoshis: u64,

    pub locking_script: Script,

    /// Set on outputs created by change calculation. Not serialized.
    pub change: bool,
}

impl TransactionOutput {
    pub fn new(satoshis: u64, locking_script: Script) -> Self {
        TransactionOutput {
            satoshis,
            locking_script,
            change: false,
        }
    }

    /// Decode one output: 8-byte LE value, varint length, script.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let satoshis = reader
            .read_u64_le()
            .map_err(|e| field_error("satoshis", e))?;
        let script_len = reader
            .read_varint()
            .map_err(|e| field_error("script length", e))?;
        let script_bytes = reader
            .read_bytes(script_len.value() as usize)
            .map_err(|e| field_error("locking script", e))?;

        Ok(TransactionOutput::new(satoshis, Script::from_bytes(script_bytes)))
    }

    pub fn write_to(&self, writer: &mut ByteWriter) {
        writer.write_u64_le(self.satoshis);
        writer.write_var_bytes(self.locking_script.to_bytes());
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::with_capacity(self.size());
        self.write_to(&mut writer);
        writer.into_bytes()
    }

    pub fn size(&self) -> usize {
        let len = self.locking_script.len();
        8 + VarInt::from(len).length() + len
    }

    pub fn locking_script_hex(&self) -> String {
        self.locking_script.to_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_wire_form() {
        let script = Script::from_hex("76a91463ea0d776d45502d2226aed9ebdf5b676e232ca188ac").unwrap();
        let output = TransactionOutput::new(4_998_000_000, script);
        let bytes = output.to_bytes();
        assert_eq!(
            hex::encode(&bytes),
            "806de729010000001976a91463ea0d776d45502d2226aed9ebdf5b676e232ca188ac"
        );
        assert_eq!(output.size(), bytes.len());

        let back = TransactionOutput::read_from(&mut ByteReader::new(&bytes)).unwrap();
        assert_eq!(back, output);
    }

    #[test]
    fn test_truncated_output() {
        let bytes = hex::decode("806de729010000001976a914").unwrap();
        assert!(TransactionOutput::read_from(&mut ByteReader::new(&bytes)).is_err());
        assert!(TransactionOutput::read_from(&mut ByteReader::new(&[0u8; 7])).is_err());
    }
}
