use std::convert::TryInto;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReaderError {
    #[error("Not enough bytes to read")]
    InvalidSize,

    #[error("Invalid value encoding")]
    InvalidValue,

    #[error("Invalid UTF-8 string")]
    InvalidString,
}

/// Cursor over a byte slice for binary decodings.
pub struct Reader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Reader { bytes, position: 0 }
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8], ReaderError> {
        if self.position + count > self.bytes.len() {
            return Err(ReaderError::InvalidSize);
        }
        let slice = &self.bytes[self.position..self.position + count];
        self.position += count;
        Ok(slice)
    }

    pub fn read_bytes_32(&mut self) -> Result<[u8; 32], ReaderError> {
        let bytes = self.read_bytes(32)?;
        bytes.try_into().map_err(|_| ReaderError::InvalidSize)
    }

    pub fn read_u8(&mut self) -> Result<u8, ReaderError> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, ReaderError> {
        let bytes = self.read_bytes(2)?;
        let bytes = bytes.try_into().map_err(|_| ReaderError::InvalidSize)?;
        Ok(u16::from_be_bytes(bytes))
    }

    pub fn read_u32(&mut self) -> Result<u32, ReaderError> {
        let bytes = self.read_bytes(4)?;
        let bytes = bytes.try_into().map_err(|_| ReaderError::InvalidSize)?;
        Ok(u32::from_be_bytes(bytes))
    }

    pub fn read_u64(&mut self) -> Result<u64, ReaderError> {
        let bytes = self.read_bytes(8)?;
        let bytes = bytes.try_into().map_err(|_| ReaderError::InvalidSize)?;
        Ok(u64::from_be_bytes(bytes))
    }

    pub fn read_bool(&mut self) -> Result<bool, ReaderError> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(ReaderError::InvalidValue),
        }
    }

    pub fn read_string(&mut self) -> Result<String, ReaderError> {
        let len = self.read_u16()? as usize;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| ReaderError::InvalidString)
    }

    pub fn total_read(&self) -> usize {
        self.position
    }

    pub fn total_size(&self) -> usize {
        self.bytes.len()
    }
}
