//! Binary Cursor Codec
//!
//! Little-endian sequential reader and writer used by both the raw import
//! format and the asset file format. Strings and blobs carry a `u32` length
//! prefix; a zero length is a valid empty value.

use crate::{AssetError, AssetResult};

/// Sequential reader over a borrowed byte buffer
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BinaryReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Current offset from the start of the buffer
    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes left to read
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    pub fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }

    /// Read the next `len` bytes without copying
    pub fn read_bytes(&mut self, len: usize) -> AssetResult<&'a [u8]> {
        if len > self.remaining() {
            return Err(AssetError::TruncatedData {
                needed: len,
                remaining: self.remaining(),
            });
        }
        let bytes = &self.data[self.position..self.position + len];
        self.position += len;
        Ok(bytes)
    }

    /// Move forward by `len` bytes
    pub fn skip(&mut self, len: usize) -> AssetResult<()> {
        self.read_bytes(len).map(|_| ())
    }

    fn read_array<const N: usize>(&mut self) -> AssetResult<[u8; N]> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.read_bytes(N)?);
        Ok(array)
    }

    pub fn read_u8(&mut self) -> AssetResult<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Read a one-byte bool; any non-zero value is true
    pub fn read_bool(&mut self) -> AssetResult<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_u16(&mut self) -> AssetResult<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> AssetResult<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> AssetResult<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i64(&mut self) -> AssetResult<i64> {
        Ok(i64::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> AssetResult<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    /// Read a `u32` length prefix followed by that many bytes
    pub fn read_blob(&mut self) -> AssetResult<&'a [u8]> {
        let len = self.read_u32()? as usize;
        self.read_bytes(len)
    }

    /// Read a length-prefixed UTF-8 string
    pub fn read_string(&mut self) -> AssetResult<String> {
        let bytes = self.read_blob()?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| AssetError::MalformedStructure(format!("invalid UTF-8 string: {e}")))
    }

    /// Read an `i32` that must be zero or positive
    pub fn read_len(&mut self, what: &str) -> AssetResult<usize> {
        let value = self.read_i32()?;
        usize::try_from(value)
            .map_err(|_| AssetError::MalformedStructure(format!("negative {what}: {value}")))
    }
}

/// Sequential writer into a growable buffer
#[derive(Debug, Clone, Default)]
pub struct BinaryWriter {
    buffer: Vec<u8>,
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current length of the written data
    pub fn position(&self) -> usize {
        self.buffer.len()
    }

    /// Everything written so far
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(u8::from(value));
    }

    pub fn write_u16(&mut self, value: u16) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_i64(&mut self, value: i64) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Write a `u32` length prefix followed by the bytes
    pub fn write_blob(&mut self, bytes: &[u8]) -> AssetResult<()> {
        let len = u32::try_from(bytes.len()).map_err(|_| {
            AssetError::MalformedStructure(format!("blob of {} bytes is too large", bytes.len()))
        })?;
        self.write_u32(len);
        self.write_bytes(bytes);
        Ok(())
    }

    /// Write a length-prefixed UTF-8 string
    pub fn write_string(&mut self, value: &str) -> AssetResult<()> {
        self.write_blob(value.as_bytes())
    }

    /// Write a count or size as an `i32`
    pub fn write_len(&mut self, value: usize) -> AssetResult<()> {
        let value = i32::try_from(value)
            .map_err(|_| AssetError::MalformedStructure(format!("length {value} overflows i32")))?;
        self.write_i32(value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitives() {
        let mut writer = BinaryWriter::new();
        writer.write_i32(-7);
        writer.write_u16(0xBEEF);
        writer.write_u32(42);
        writer.write_i64(1_700_000_000_000);
        writer.write_f32(1.5);
        writer.write_bool(true);
        let bytes = writer.into_bytes();
        assert_eq!(bytes.len(), 4 + 2 + 4 + 8 + 4 + 1);

        let mut reader = BinaryReader::new(&bytes);
        assert_eq!(reader.read_i32().unwrap(), -7);
        assert_eq!(reader.read_u16().unwrap(), 0xBEEF);
        assert_eq!(reader.read_u32().unwrap(), 42);
        assert_eq!(reader.read_i64().unwrap(), 1_700_000_000_000);
        assert_eq!(reader.read_f32().unwrap(), 1.5);
        assert!(reader.read_bool().unwrap());
        assert!(reader.is_at_end());
    }

    #[test]
    fn test_little_endian_layout() {
        let mut writer = BinaryWriter::new();
        writer.write_u32(0x0102_0304);
        assert_eq!(writer.as_bytes(), &[0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn test_strings() {
        let mut writer = BinaryWriter::new();
        writer.write_string("lod_0").unwrap();
        writer.write_string("").unwrap();
        let bytes = writer.into_bytes();
        assert_eq!(&bytes[..4], &[5, 0, 0, 0]);

        let mut reader = BinaryReader::new(&bytes);
        assert_eq!(reader.read_string().unwrap(), "lod_0");
        assert_eq!(reader.read_string().unwrap(), "");
        assert_eq!(reader.position(), bytes.len());
    }

    #[test]
    fn test_truncated_read() {
        let mut reader = BinaryReader::new(&[1, 2, 3]);
        let err = reader.read_i32().unwrap_err();
        assert!(matches!(
            err,
            AssetError::TruncatedData {
                needed: 4,
                remaining: 3
            }
        ));
        // a failed read does not move the cursor
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_truncated_string_body() {
        let mut writer = BinaryWriter::new();
        writer.write_u32(10);
        writer.write_bytes(b"abc");
        let bytes = writer.into_bytes();
        let mut reader = BinaryReader::new(&bytes);
        assert!(matches!(
            reader.read_string(),
            Err(AssetError::TruncatedData { .. })
        ));
    }

    #[test]
    fn test_invalid_utf8() {
        let mut writer = BinaryWriter::new();
        writer.write_blob(&[0xFF, 0xFE]).unwrap();
        let bytes = writer.into_bytes();
        let mut reader = BinaryReader::new(&bytes);
        assert!(matches!(
            reader.read_string(),
            Err(AssetError::MalformedStructure(_))
        ));
    }

    #[test]
    fn test_negative_length() {
        let mut writer = BinaryWriter::new();
        writer.write_i32(-1);
        let bytes = writer.into_bytes();
        let mut reader = BinaryReader::new(&bytes);
        assert!(matches!(
            reader.read_len("mesh count"),
            Err(AssetError::MalformedStructure(_))
        ));
    }
}
