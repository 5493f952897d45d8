//! Binary serialization helpers.
//!
//! `VarInt` is the Bitcoin compact-size integer; `ByteReader` and
//! `ByteWriter` read and write the little-endian wire format used by
//! transactions and signature preimages.

use crate::PrimitivesError;

/// A Bitcoin compact-size integer.
///
/// Values below 0xfd take one byte; larger values are prefixed with 0xfd,
/// 0xfe or 0xff followed by 2, 4 or 8 little-endian bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarInt(pub u64);

impl VarInt {
    /// Number of bytes this value occupies on the wire (1, 3, 5 or 9).
    pub fn length(&self) -> usize {
        match self.0 {
            0..=0xfc => 1,
            0xfd..=0xffff => 3,
            0x1_0000..=0xffff_ffff => 5,
            _ => 9,
        }
    }

    /// Encode into a fresh byte vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        let v = self.0;
        let mut out = Vec::with_capacity(self.length());
        match self.length() {
            1 => out.push(v as u8),
            3 => {
                out.push(0xfd);
                out.extend_from_slice(&(v as u16).to_le_bytes());
            }
            5 => {
                out.push(0xfe);
                out.extend_from_slice(&(v as u32).to_le_bytes());
            }
            _ => {
                out.push(0xff);
                out.extend_from_slice(&v.to_le_bytes());
            }
        }
        out
    }

    /// Extra bytes needed if this value were incremented by one.
    ///
    /// # Returns
    /// 0 when the encoding length would not change, 2 or 4 at a size-class
    /// boundary, and -1 at `u64::MAX` where no increment is possible.
    pub fn upper_limit_inc(&self) -> i32 {
        match self.0 {
            0xfc | 0xffff => 2,
            0xffff_ffff => 4,
            u64::MAX => -1,
            _ => 0,
        }
    }

    /// The integer value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for VarInt {
    fn from(v: u64) -> Self {
        VarInt(v)
    }
}

impl From<usize> for VarInt {
    fn from(v: usize) -> Self {
        VarInt(v as u64)
    }
}

/// A cursor over a byte slice for decoding wire-format data.
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Start reading at the beginning of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        ByteReader { data, pos: 0 }
    }

    /// Take the next `n` bytes.
    ///
    /// # Returns
    /// A borrowed slice of length `n`, or `UnexpectedEof` if fewer remain.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], PrimitivesError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or(PrimitivesError::UnexpectedEof)?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    /// Take the next `N` bytes as a fixed-size array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], PrimitivesError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, PrimitivesError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16_le(&mut self) -> Result<u16, PrimitivesError> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32_le(&mut self) -> Result<u32, PrimitivesError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64_le(&mut self) -> Result<u64, PrimitivesError> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    /// Read a compact-size integer.
    pub fn read_varint(&mut self) -> Result<VarInt, PrimitivesError> {
        let value = match self.read_u8()? {
            0xff => self.read_u64_le()?,
            0xfe => self.read_u32_le()? as u64,
            0xfd => self.read_u16_le()? as u64,
            b => b as u64,
        };
        Ok(VarInt(value))
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

/// An append-only buffer for encoding wire-format data.
#[derive(Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        ByteWriter { buf: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ByteWriter {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_u8(&mut self, val: u8) {
        self.buf.push(val);
    }

    pub fn write_u32_le(&mut self, val: u32) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    pub fn write_u64_le(&mut self, val: u64) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    pub fn write_varint(&mut self, val: VarInt) {
        self.buf.extend_from_slice(&val.to_bytes());
    }

    /// Write a compact-size length prefix followed by `bytes`.
    pub fn write_var_bytes(&mut self, bytes: &[u8]) {
        self.write_varint(VarInt::from(bytes.len()));
        self.write_bytes(bytes);
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varint_encoding_boundaries() {
        let cases: [(u64, &str); 7] = [
            (0, "00"),
            (0xfc, "fc"),
            (0xfd, "fdfd00"),
            (0xffff, "fdffff"),
            (0x1_0000, "fe00000100"),
            (0xffff_ffff, "feffffffff"),
            (0x1_0000_0000, "ff0000000001000000"),
        ];
        for (value, expected) in cases {
            let v = VarInt(value);
            assert_eq!(hex::encode(v.to_bytes()), expected, "value {}", value);
            assert_eq!(v.length(), expected.len() / 2);
        }
    }

    #[test]
    fn test_upper_limit_inc() {
        assert_eq!(VarInt(1).upper_limit_inc(), 0);
        assert_eq!(VarInt(0xfc).upper_limit_inc(), 2);
        assert_eq!(VarInt(0xffff).upper_limit_inc(), 2);
        assert_eq!(VarInt(0xffff_ffff).upper_limit_inc(), 4);
        assert_eq!(VarInt(u64::MAX).upper_limit_inc(), -1);
    }

    #[test]
    fn test_reader_reads_in_order() {
        let data = hex::decode("02000000fd0001ff").unwrap();
        let mut r = ByteReader::new(&data);
        assert_eq!(r.read_u32_le().unwrap(), 2);
        assert_eq!(r.read_varint().unwrap(), VarInt(256));
        assert_eq!(r.remaining(), 1);
        assert_eq!(r.read_u8().unwrap(), 0xff);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_reader_eof() {
        let mut r = ByteReader::new(&[0x01, 0x02]);
        assert!(matches!(r.read_u32_le(), Err(PrimitivesError::UnexpectedEof)));
        // a failed read does not consume anything
        assert_eq!(r.remaining(), 2);
        assert!(r.read_bytes(usize::MAX).is_err());
    }

    #[test]
    fn test_truncated_varint() {
        let mut r = ByteReader::new(&[0xfe, 0x01]);
        assert!(r.read_varint().is_err());
    }

    #[test]
    fn test_writer_var_bytes() {
        let mut w = ByteWriter::new();
        w.write_u32_le(1);
        w.write_var_bytes(&[0xaa, 0xbb]);
        w.write_u64_le(5);
        assert_eq!(hex::encode(w.as_bytes()), "0100000002aabb0500000000000000");
    }
}
