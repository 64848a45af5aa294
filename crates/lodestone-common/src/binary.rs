//! The binary container format shared by every serializable lodestone type.
//!
//! Every serialized record begins with a 1-byte format version tag. Strings
//! are stored as a u64 byte count followed by raw UTF-8. All numeric fields
//! are big-endian.

use byteorder::{BigEndian, ReadBytesExt};

use crate::error::{LodestoneError, Result};

/// Writes big-endian values into an owned byte buffer.
#[derive(Debug, Default)]
pub struct BinaryWriter {
    buffer: Vec<u8>,
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_u64(&mut self, value: u64) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_i8(&mut self, value: i8) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_i16(&mut self, value: i16) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_i64(&mut self, value: i64) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    /// Write a u64 byte count followed by the raw UTF-8 bytes.
    pub fn write_string(&mut self, value: &str) {
        self.write_u64(value.len() as u64);
        self.buffer.extend_from_slice(value.as_bytes());
    }

    /// Write a nested byte blob with a u64 length prefix.
    pub fn write_bytes(&mut self, value: &[u8]) {
        self.write_u64(value.len() as u64);
        self.buffer.extend_from_slice(value);
    }
}

/// Reads big-endian values out of a byte buffer, tracking its position.
pub struct BinaryReader<'a> {
    data: &'a [u8],
}

impl<'a> BinaryReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn has_more_data(&self) -> bool {
        !self.data.is_empty()
    }

    fn truncated() -> LodestoneError {
        LodestoneError::InvalidArgument("unexpected end of serialized data".to_string())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.data.read_u8().map_err(|_| Self::truncated())
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.data.read_u16::<BigEndian>().map_err(|_| Self::truncated())
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.data.read_u32::<BigEndian>().map_err(|_| Self::truncated())
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.data.read_u64::<BigEndian>().map_err(|_| Self::truncated())
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        self.data.read_i8().map_err(|_| Self::truncated())
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.data.read_i16::<BigEndian>().map_err(|_| Self::truncated())
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.data.read_i32::<BigEndian>().map_err(|_| Self::truncated())
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        self.data.read_i64::<BigEndian>().map_err(|_| Self::truncated())
    }

    pub fn read_string(&mut self) -> Result<String> {
        let bytes = self.read_raw_bytes()?;
        String::from_utf8(bytes)
            .map_err(|e| LodestoneError::InvalidArgument(format!("invalid UTF-8 string: {}", e)))
    }

    pub fn read_bytes(&mut self) -> Result<Vec<u8>> {
        self.read_raw_bytes()
    }

    fn read_raw_bytes(&mut self) -> Result<Vec<u8>> {
        let length = self.read_u64()? as usize;
        if self.data.len() < length {
            return Err(Self::truncated());
        }
        let (head, tail) = self.data.split_at(length);
        self.data = tail;
        Ok(head.to_vec())
    }
}

/// A record in the binary container format.
pub trait Serializable: Sized {
    fn write(&self, writer: &mut BinaryWriter);
    fn read(reader: &mut BinaryReader) -> Result<Self>;
}

/// Serialize a record to a standalone byte buffer.
pub fn to_bytes<T: Serializable>(value: &T) -> Vec<u8> {
    let mut writer = BinaryWriter::new();
    value.write(&mut writer);
    writer.into_bytes()
}

/// Deserialize a record from a standalone byte buffer.
pub fn from_bytes<T: Serializable>(data: &[u8]) -> Result<T> {
    let mut reader = BinaryReader::new(data);
    T::read(&mut reader)
}

/// Reject a format version tag that this build does not understand.
pub fn check_format_version(record: &str, version: u8, supported: u8) -> Result<()> {
    if version == supported {
        Ok(())
    } else {
        Err(LodestoneError::InvalidArgument(format!(
            "unsupported {} format version {}",
            record, version
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_numeric_round_trip() {
        let mut writer = BinaryWriter::new();
        writer.write_u8(0x12);
        writer.write_u16(0x1234);
        writer.write_u32(0x12345678);
        writer.write_u64(0x123456789abcdef0);
        writer.write_i64(-42);
        let bytes = writer.into_bytes();

        let mut reader = BinaryReader::new(&bytes);
        assert_eq!(reader.read_u8().unwrap(), 0x12);
        assert_eq!(reader.read_u16().unwrap(), 0x1234);
        assert_eq!(reader.read_u32().unwrap(), 0x12345678);
        assert_eq!(reader.read_u64().unwrap(), 0x123456789abcdef0);
        assert_eq!(reader.read_i64().unwrap(), -42);
        assert!(!reader.has_more_data());
    }

    #[test]
    fn test_big_endian_layout() {
        let mut writer = BinaryWriter::new();
        writer.write_u32(1);
        assert_eq!(writer.into_bytes(), vec![0, 0, 0, 1]);
    }

    #[test]
    fn test_string_round_trip() {
        let mut writer = BinaryWriter::new();
        writer.write_string("hello world");
        writer.write_string("");
        let bytes = writer.into_bytes();

        let mut reader = BinaryReader::new(&bytes);
        assert_eq!(reader.read_string().unwrap(), "hello world");
        assert_eq!(reader.read_string().unwrap(), "");
    }

    #[test]
    fn test_truncated_read_fails() {
        let mut reader = BinaryReader::new(&[0x00, 0x01]);
        assert_matches!(reader.read_u32(), Err(LodestoneError::InvalidArgument(_)));
    }

    #[test]
    fn test_truncated_string_fails() {
        // Length prefix claims 100 bytes but only 2 follow.
        let mut writer = BinaryWriter::new();
        writer.write_u64(100);
        writer.write_u16(0);
        let bytes = writer.into_bytes();
        let mut reader = BinaryReader::new(&bytes);
        assert_matches!(reader.read_string(), Err(LodestoneError::InvalidArgument(_)));
    }

    #[test]
    fn test_format_version_check() {
        assert!(check_format_version("Thing", 1, 1).is_ok());
        assert_matches!(
            check_format_version("Thing", 2, 1),
            Err(LodestoneError::InvalidArgument(_))
        );
    }
}
