//! Script chunk parsing and push encoding.
//!
//! A chunk is either a bare opcode or a data push together with its bytes.

use txsign_primitives::util::ByteReader;
use txsign_primitives::PrimitivesError;

use crate::opcodes::*;
use crate::ScriptError;

/// A single parsed element of a script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptChunk {
    /// The opcode byte. For direct pushes this is the data length.
    pub op: u8,
    /// Pushed bytes, or for a top-level OP_RETURN the unparsed remainder.
    pub data: Option<Vec<u8>>,
}

impl ScriptChunk {
    /// ASM token for this chunk: hex for pushed data, the opcode name
    /// otherwise. A top-level OP_RETURN with trailing bytes renders as
    /// `OP_RETURN <hex>`.
    pub fn to_asm_string(&self) -> String {
        match (&self.data, self.op) {
            (Some(data), OP_RETURN) if !data.is_empty() => {
                format!("OP_RETURN {}", hex::encode(data))
            }
            (Some(data), op) if op != OP_0 && is_push_op(op) => hex::encode(data),
            _ => opcode_to_string(self.op),
        }
    }

    /// Pushed bytes, if this is a push chunk.
    pub fn push_data(&self) -> Option<&[u8]> {
        if is_push_op(self.op) {
            self.data.as_deref()
        } else {
            None
        }
    }
}

fn eof(e: PrimitivesError) -> ScriptError {
    match e {
        PrimitivesError::UnexpectedEof => ScriptError::DataTooSmall,
        other => ScriptError::Primitives(other),
    }
}

/// Decode raw script bytes into chunks.
///
/// An OP_RETURN outside any conditional block ends parsing; the bytes after
/// it are kept as that chunk's data without further interpretation.
///
/// # Arguments
/// * `bytes` - Raw script bytes.
///
/// # Returns
/// The chunks in order, or `DataTooSmall` if a push runs past the end.
pub fn decode_script(bytes: &[u8]) -> Result<Vec<ScriptChunk>, ScriptError> {
    let mut reader = ByteReader::new(bytes);
    let mut chunks = Vec::new();
    let mut depth: usize = 0;

    while reader.remaining() > 0 {
        let op = reader.read_u8().map_err(eof)?;
        let len = match op {
            OP_DATA_1..=OP_DATA_75 => Some(op as usize),
            OP_PUSHDATA1 => Some(reader.read_u8().map_err(eof)? as usize),
            OP_PUSHDATA2 => Some(reader.read_u16_le().map_err(eof)? as usize),
            OP_PUSHDATA4 => Some(reader.read_u32_le().map_err(eof)? as usize),
            _ => None,
        };

        if let Some(len) = len {
            let data = reader.read_bytes(len).map_err(eof)?;
            chunks.push(ScriptChunk {
                op,
                data: Some(data.to_vec()),
            });
            continue;
        }

        match op {
            OP_IF | OP_NOTIF | OP_VERIF | OP_VERNOTIF => depth += 1,
            OP_ENDIF => depth = depth.saturating_sub(1),
            OP_RETURN if depth == 0 => {
                let rest = reader.read_bytes(reader.remaining()).map_err(eof)?;
                chunks.push(ScriptChunk {
                    op,
                    data: Some(rest.to_vec()),
                });
                break;
            }
            _ => {}
        }
        chunks.push(ScriptChunk { op, data: None });
    }

    Ok(chunks)
}

/// Minimal push prefix for `data_len` bytes.
///
/// # Returns
/// The prefix bytes, or `DataTooBig` above the OP_PUSHDATA4 limit.
pub fn push_data_prefix(data_len: usize) -> Result<Vec<u8>, ScriptError> {
    let prefix = match data_len {
        0..=0x4b => vec![data_len as u8],
        0x4c..=0xff => vec![OP_PUSHDATA1, data_len as u8],
        0x100..=0xffff => {
            let mut buf = vec![OP_PUSHDATA2];
            buf.extend_from_slice(&(data_len as u16).to_le_bytes());
            buf
        }
        _ => {
            let len = u32::try_from(data_len).map_err(|_| ScriptError::DataTooBig)?;
            let mut buf = vec![OP_PUSHDATA4];
            buf.extend_from_slice(&len.to_le_bytes());
            buf
        }
    };
    Ok(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_p2pkh_unlocking() {
        let script = hex::decode(
            "4730440220416154a5a117e89855397c6a7b2796d82107d20c1326bc917444e4ab84567b80022057de212dc0615ea1f4bbca817ed18be49acb96acff7760fc4d6447cbe772d1e8412103fc7c702eb7a03099ef01970b31ecbebe7ff77adc202d3749a8562ffc185a44a6",
        )
        .unwrap();
        let chunks = decode_script(&script).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].op, 0x47);
        assert_eq!(chunks[0].push_data().unwrap().len(), 71);
        assert_eq!(chunks[1].op, OP_DATA_33);
    }

    #[test]
    fn test_decode_opcodes_and_pushes() {
        let bytes = hex::decode("76a91403ececf2d12a7f614aef4c82ecf13c303bd9975d88ac").unwrap();
        let chunks = decode_script(&bytes).unwrap();
        let ops: Vec<u8> = chunks.iter().map(|c| c.op).collect();
        assert_eq!(ops, vec![OP_DUP, OP_HASH160, OP_DATA_20, OP_EQUALVERIFY, OP_CHECKSIG]);
        assert!(chunks[0].push_data().is_none());
    }

    #[test]
    fn test_decode_extended_pushes() {
        let mut bytes = vec![OP_PUSHDATA1, 3, 1, 2, 3, OP_PUSHDATA2, 2, 0, 9, 9];
        bytes.extend_from_slice(&[OP_PUSHDATA4, 1, 0, 0, 0, 7]);
        let chunks = decode_script(&bytes).unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].data.as_deref(), Some(&[1u8, 2, 3][..]));
        assert_eq!(chunks[1].data.as_deref(), Some(&[9u8, 9][..]));
        assert_eq!(chunks[2].data.as_deref(), Some(&[7u8][..]));
    }

    #[test]
    fn test_decode_truncated_pushes() {
        for bad in [
            vec![0x05, 0, 0, 0],
            vec![OP_PUSHDATA1],
            vec![OP_PUSHDATA1, 5, 0],
            vec![OP_PUSHDATA2, 1],
            vec![OP_PUSHDATA4, 1, 0, 0],
        ] {
            assert!(
                matches!(decode_script(&bad), Err(ScriptError::DataTooSmall)),
                "{:?}",
                bad
            );
        }
    }

    #[test]
    fn test_op_return_swallows_remainder() {
        // the 0x05 would be a truncated push if parsed
        let bytes = vec![OP_FALSE, OP_RETURN, 0x05, 0xaa];
        let chunks = decode_script(&bytes).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].data.as_deref(), Some(&[0x05u8, 0xaa][..]));
        assert_eq!(chunks[1].to_asm_string(), "OP_RETURN 05aa");
    }

    #[test]
    fn test_op_return_inside_conditional_is_plain() {
        let bytes = vec![OP_IF, OP_RETURN, OP_ENDIF, OP_1];
        let chunks = decode_script(&bytes).unwrap();
        assert_eq!(chunks.len(), 4);
        assert!(chunks[1].data.is_none());
    }

    #[test]
    fn test_push_data_prefix_boundaries() {
        assert_eq!(push_data_prefix(0).unwrap(), vec![0]);
        assert_eq!(push_data_prefix(75).unwrap(), vec![75]);
        assert_eq!(push_data_prefix(76).unwrap(), vec![OP_PUSHDATA1, 76]);
        assert_eq!(push_data_prefix(255).unwrap(), vec![OP_PUSHDATA1, 255]);
        assert_eq!(push_data_prefix(256).unwrap(), vec![OP_PUSHDATA2, 0x00, 0x01]);
        assert_eq!(push_data_prefix(65536).unwrap(), vec![OP_PUSHDATA4, 0, 0, 1, 0]);
    }

    #[test]
    fn test_asm_tokens() {
        let push = ScriptChunk { op: OP_DATA_20, data: Some(vec![0xab; 20]) };
        assert_eq!(push.to_asm_string(), "ab".repeat(20));
        let dup = ScriptChunk { op: OP_DUP, data: None };
        assert_eq!(dup.to_asm_string(), "OP_DUP");
    }
}
